//! PDF header detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// The PDF header marker.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers must accept a header anywhere in the first 1024 bytes.
const HEADER_WINDOW: usize = 1024;

/// Header information of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Declared version (e.g. "1.7")
    pub version: String,
    /// Bytes of junk before the header, usually 0
    pub header_offset: usize,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Detect the PDF header of a file.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut head = Vec::with_capacity(HEADER_WINDOW);
    File::open(path)?
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Detect the PDF header in a byte buffer.
///
/// Fails with [`Error::UnknownFormat`] when no `%PDF-` marker appears in the
/// first 1024 bytes and [`Error::UnsupportedVersion`] when the version is
/// not of the form `d.d`.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_bytes = window
        .get(offset + PDF_MAGIC.len()..offset + PDF_MAGIC.len() + 3)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    match version_bytes {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(PdfFormat {
            version,
            header_offset: offset,
        }),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Check if a file starts like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.header_offset, 0);
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_leading_junk() {
        let format = detect_format_from_bytes(b"\x00\x00junk%PDF-2.0\n").unwrap();
        assert_eq!(format.version, "2.0");
        assert_eq!(format.header_offset, 6);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_bad_version() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-x.y"),
            Err(Error::UnsupportedVersion(v)) if v == "x.y"
        ));
    }

    #[test]
    fn test_is_pdf_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        let txt = dir.path().join("a.txt");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();
        std::fs::write(&txt, b"hi").unwrap();

        assert!(is_pdf(&pdf));
        assert!(!is_pdf(&txt));
        assert!(!is_pdf(dir.path().join("missing.pdf")));
    }
}
