//! Document loading errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} declares no source descriptions", path.display())]
    MissingSourceDescription { path: PathBuf },

    #[error("source description '{name}' points at remote URL {url}; only local files are supported")]
    RemoteSource { name: String, url: String },
}

impl DocumentError {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::Io { .. } => "E-DOC-001",
            DocumentError::Yaml { .. } => "E-DOC-002",
            DocumentError::MissingSourceDescription { .. } => "E-DOC-003",
            DocumentError::RemoteSource { .. } => "E-DOC-004",
        }
    }
}
