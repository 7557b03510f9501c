//! Error types for structpdf.

use std::io;
use thiserror::Error;

/// Result type alias for structpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or assembling a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A bounding box with non-finite or inverted edges reached the layout engine.
    #[error("Invalid geometry: ({x0}, {y0}, {x1}, {y1}) is not a well-formed box")]
    InvalidGeometry { x0: f32, y0: f32, x1: f32, y1: f32 },

    /// The extraction front-end skipped a page number.
    #[error("Page {0} is missing from the extracted page sequence")]
    MissingPage(u32),

    /// The extraction front-end produced the same page number twice.
    #[error("Page {0} appears more than once in the extracted page sequence")]
    DuplicatePage(u32),

    /// The extraction front-end produced a page number below 1.
    #[error("Invalid page number {0}: pages are numbered from 1")]
    InvalidPageNumber(u32),

    /// A primitive was filed under a page it does not belong to.
    #[error("Primitive for page {found} was supplied with page {expected}")]
    PageMismatch { expected: u32, found: u32 },

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error extracting text runs from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error detecting tables on a page.
    #[error("Table extraction error: {0}")]
    TableExtract(String),

    /// Error locating images on a page.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// The OCR engine failed on an image.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// An extraction dump could not be decoded.
    #[error("Invalid primitives: {0}")]
    InvalidPrimitives(String),

    /// Invalid layout or conversion configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPage(3);
        assert_eq!(
            err.to_string(),
            "Page 3 is missing from the extracted page sequence"
        );

        let err = Error::InvalidGeometry {
            x0: 10.0,
            y0: 5.0,
            x1: 2.0,
            y1: 8.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid geometry: (10, 5, 2, 8) is not a well-formed box"
        );
    }

    #[test]
    fn test_input_error_display() {
        assert_eq!(
            Error::InvalidPageNumber(0).to_string(),
            "Invalid page number 0: pages are numbered from 1"
        );
        assert_eq!(
            Error::InvalidPrimitives("expected value".into()).to_string(),
            "Invalid primitives: expected value"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
