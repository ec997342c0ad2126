//! Error types for infsync.
//!
//! Every variant is fatal: a run either completes every phase or stops
//! before anything is written to disk.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for infsync operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("--build-root was not provided and OPENSAL_BUILD_DIR is not set")]
    BuildRootNotProvided,

    #[error("Build root '{}' does not exist", path.display())]
    BuildRootMissing { path: PathBuf },

    #[error("setup.inf file '{}' does not exist", path.display())]
    ManifestMissing { path: PathBuf },

    #[error("Invalid layout configuration: {message}")]
    LayoutConfig { message: String },

    #[error(
        "No plugin payloads were found under '{}'. Make sure the Salamander solution \
         has been built before running infsync",
        build_root.display()
    )]
    NoPayload { build_root: PathBuf },

    #[error("Section [{section}] not found in setup.inf")]
    SectionNotFound { section: String },

    #[error("'{}' is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn layout(message: impl Into<String>) -> Self {
        Self::LayoutConfig {
            message: message.into(),
        }
    }
}
