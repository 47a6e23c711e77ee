//! Error types for the extraction library.
//!
//! The extraction engine itself never fails: malformed pages degrade to empty
//! candidate lists. Errors only surface at the edges, when span dumps or
//! configuration are loaded, or when a document cannot be routed.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading inputs for extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Layout data could not be interpreted as page spans
    #[error("Invalid span data: {0}")]
    InvalidSpans(String),

    /// Content type is neither an image nor a PDF
    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value, rendered for display
        value: String,
    },

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_spans_error() {
        let err = Error::InvalidSpans("page 2 has no spans array".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid span data"));
        assert!(msg.contains("page 2"));
    }

    #[test]
    fn test_unsupported_document_error() {
        let err = Error::UnsupportedDocument("text/html".to_string());
        assert_eq!(format!("{}", err), "Unsupported document type: text/html");
    }

    #[test]
    fn test_invalid_config_error() {
        let err = Error::InvalidConfig {
            field: "row_tolerance",
            value: "-1".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("row_tolerance"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(format!("{}", err).starts_with("JSON error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "spans.json");
        let err: Error = io_err.into();
        let msg = format!("{}", err);
        assert!(msg.contains("IO error"));
        assert!(msg.contains("spans.json"));
    }
}
