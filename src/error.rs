//! Error types for the mdexport library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mdexport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during an export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing the output document.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input Markdown file does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Error assembling the PDF document.
    #[error("PDF generation error: {0}")]
    Pdf(String),

    /// Error writing OOXML part content.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error writing the OOXML package archive.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error decoding an image that was about to be embedded.
    #[error("image error: {0}")]
    Image(String),

    /// Generic rendering failure.
    #[error("rendering error: {0}")]
    Render(String),
}

impl From<printpdf::Error> for Error {
    fn from(err: printpdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingInput(PathBuf::from("notes.md"));
        assert_eq!(err.to_string(), "input file not found: notes.md");

        let err = Error::Render("bad block".to_string());
        assert_eq!(err.to_string(), "rendering error: bad block");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
