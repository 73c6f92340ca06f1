/// Errors produced while turning a source module into a test scaffold.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported extension: .{0}")]
    UnsupportedExtension(String),

    #[error("{filename}:{line}:{column}: parse failed")]
    ParseFailed {
        filename: String,
        line: usize,
        column: usize,
    },

    #[error("parser language: {0}")]
    Language(String),

    #[error("invalid pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("No matching files. Tried: {0}")]
    NoMatchingFiles(String),
}
