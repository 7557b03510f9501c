//! OCR integration point.
//!
//! No recognizer ships with the crate. Callers plug one in through
//! [`OcrEngine`]; image regions then carry whatever text it returns.

use crate::error::Result;

/// An image XObject as stored in the PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Bits per color component, if declared
    pub bits_per_component: Option<u8>,
    /// Color space name (e.g. "DeviceRGB")
    pub color_space: Option<String>,
    /// Stream filter that remains applied to `data` (e.g. "DCTDecode" for JPEG)
    pub filter: Option<String>,
    /// Image bytes: raw samples, or encoded bytes when `filter` is set
    pub data: Vec<u8>,
}

impl ImageData {
    /// MIME type of `data` when it is a self-contained encoded image.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self.filter.as_deref() {
            Some("DCTDecode") => Some("image/jpeg"),
            Some("JPXDecode") => Some("image/jp2"),
            _ => None,
        }
    }
}

/// Recognizes text in an image.
pub trait OcrEngine: Send + Sync {
    /// Return the recognized text, or `None` when the image holds none.
    ///
    /// An error is logged and the image keeps its region without text.
    fn recognize(&self, image: &ImageData) -> Result<Option<String>>;
}

impl<F> OcrEngine for F
where
    F: Fn(&ImageData) -> Result<Option<String>> + Send + Sync,
{
    fn recognize(&self, image: &ImageData) -> Result<Option<String>> {
        self(image)
    }
}
