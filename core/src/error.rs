use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document listed in the manifest is missing or unreadable.
    #[error("manifest entry {index} ({}) cannot be read: {source}", .path.display())]
    Document {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest entry lacks `path`, `url` or `title`.
    #[error("manifest entry {index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    /// Bytes that do not decode to an index file: truncated, corrupt, or written
    /// by an incompatible version.
    #[error("malformed index data: {reason}")]
    Decode { reason: String },

    #[error("failed to encode index data: {0}")]
    Encode(#[source] bincode::Error),

    #[error("invalid build metadata: {0}")]
    Meta(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn decode(reason: impl ToString) -> Self {
        Self::Decode { reason: reason.to_string() }
    }

    pub fn is_decode(&self) -> bool { matches!(self, Self::Decode { .. }) }

    pub fn is_config(&self) -> bool { matches!(self, Self::MissingField { .. } | Self::Document { .. } | Self::Manifest(_)) }
}

pub type Result<T> = std::result::Result<T, Error>;
