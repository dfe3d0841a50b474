/// Error types shared by the contract analysis crates.
///
/// Rule loading and text extraction failures live here. Transport-level errors
/// (multipart parsing, HTTP status mapping) belong to the server crate, which wraps
/// `CommonError` where it needs to.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("failed to read rules file {}: {source}", .path.display())]
    RuleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules from {origin}: {source}")]
    RuleParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("pdf is encrypted")]
    PdfEncrypted,

    #[error("extraction worker failed: {0}")]
    Worker(String),
}
