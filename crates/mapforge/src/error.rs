use mapforge_config_build::ConfigError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// Error
///
/// Failures that stop a generation pass. Problems with individual mappings
/// are diagnostics, not errors.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] mapforge_schema::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
