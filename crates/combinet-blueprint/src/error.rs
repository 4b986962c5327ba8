//! Errors raised while compiling, encoding or decoding blueprints.

use std::path::PathBuf;

use combinet_logic::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// zlib stream could not be written or read.
    #[error("zlib: {0}")]
    Compression(std::io::Error),

    #[error("blueprint json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("blueprint base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("blueprint string does not start with version byte '0'")]
    MissingVersionPrefix,

    #[error("config error in {file}: {detail}")]
    Config { file: PathBuf, detail: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
