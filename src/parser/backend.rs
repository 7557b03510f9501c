//! PDF backend abstraction layer.
//!
//! Extraction code talks to [`PdfBackend`] only, so nothing outside this
//! file touches lopdf types.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};

use super::ocr::ImageData;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// US Letter, used when a page declares no usable MediaBox.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if the operand is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Numeric operand at `index`, or `default`.
    pub fn number(&self, index: usize, default: f32) -> f32 {
        self.operands
            .get(index)
            .and_then(PdfValue::as_number)
            .unwrap_or(default)
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the page's MediaBox as `[x0, y0, x1, y1]` in PDF units.
    fn media_box(&self, page: PageId) -> Result<[f32; 4]>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Resource names of the page's image XObjects.
    fn image_names(&self, page: PageId) -> Result<Vec<Vec<u8>>>;

    /// Load an image XObject by resource name.
    fn image_data(&self, page: PageId, name: &[u8]) -> Result<ImageData>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::checked(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::checked(doc)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        // lopdf decrypts documents with an empty user password on load;
        // anything else fails with Error::Encrypted before we get here.
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; extracted text may be incomplete");
        }
        Ok(Self { doc })
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Look up a page attribute, following the `Parent` chain for
    /// inheritable keys such as Resources and MediaBox.
    fn inherited(&self, page: PageId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        // Bounded walk; page trees are shallow and cycles are malformed input.
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    fn xobjects(&self, page: PageId) -> Option<&Dictionary> {
        let resources = self.resolve_dict(self.inherited(page, b"Resources")?)?;
        self.resolve_dict(resources.get(b"XObject").ok()?)
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(lopdf_fonts
            .iter()
            .map(|(name, font_dict)| BackendFontInfo {
                name: name.clone(),
                base_font: font_dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect())
    }

    fn media_box(&self, page: PageId) -> Result<[f32; 4]> {
        let Some(array) = self
            .inherited(page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
        else {
            return Ok(DEFAULT_MEDIA_BOX);
        };

        let values: Vec<f32> = array.iter().filter_map(|o| o.as_float().ok()).collect();
        match values.as_slice() {
            [a, b, c, d] => Ok([a.min(*c), b.min(*d), a.max(*c), b.max(*d)]),
            _ => Ok(DEFAULT_MEDIA_BOX),
        }
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        // A page without Contents is blank.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => stream_bytes(s),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            match stream_bytes(s) {
                                Ok(data) => {
                                    content.extend_from_slice(&data);
                                    content.push(b' ');
                                }
                                Err(e) => log::debug!("Skipping content part {:?}: {}", r, e),
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn image_names(&self, page: PageId) -> Result<Vec<Vec<u8>>> {
        let Some(xobjects) = self.xobjects(page) else {
            return Ok(Vec::new());
        };

        Ok(xobjects
            .iter()
            .filter(|(_, obj)| {
                obj.as_reference()
                    .ok()
                    .and_then(|r| self.doc.get_object(r).ok())
                    .and_then(|o| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|t| t.as_name_str().ok())
                    == Some("Image")
            })
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn image_data(&self, page: PageId, name: &[u8]) -> Result<ImageData> {
        let reference = self
            .xobjects(page)
            .and_then(|x| x.get(name).ok())
            .and_then(|o| o.as_reference().ok())
            .ok_or_else(|| {
                Error::ImageExtract(format!(
                    "No image XObject named {}",
                    String::from_utf8_lossy(name)
                ))
            })?;

        let stream = self
            .doc
            .get_object(reference)
            .and_then(|o| o.as_stream())
            .map_err(|e| Error::ImageExtract(e.to_string()))?;
        let dict = &stream.dict;

        let int = |key: &[u8]| dict.get(key).ok().and_then(|v| v.as_i64().ok());
        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
            Object::Array(arr) => arr
                .last()
                .and_then(|o| o.as_name_str().ok())
                .map(String::from),
            _ => None,
        });
        let color_space = dict.get(b"ColorSpace").ok().and_then(|cs| match cs {
            Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
            Object::Array(arr) => arr
                .first()
                .and_then(|o| o.as_name_str().ok())
                .map(String::from),
            _ => None,
        });

        // Encoded image formats are handed over as-is; everything else is
        // decompressed to raw samples.
        let (filter, data) = match filter.as_deref() {
            Some("DCTDecode") | Some("JPXDecode") => (filter, stream.content.clone()),
            _ => match stream_bytes(stream) {
                Ok(data) => (None, data),
                Err(_) => (filter, stream.content.clone()),
            },
        };

        Ok(ImageData {
            width: int(b"Width").unwrap_or(0).max(0) as u32,
            height: int(b"Height").unwrap_or(0).max(0) as u32,
            bits_per_component: int(b"BitsPerComponent").map(|b| b as u8),
            color_space,
            filter,
            data,
        })
    }
}

/// Stream bytes with filters applied; unfiltered streams are returned as stored.
fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(e.to_string()))
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}
