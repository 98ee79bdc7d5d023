use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("couldn't open {what} {}", path.display())]
    OpenInput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't read {what} {}", path.display())]
    ReadInput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't open {what} {}", path.display())]
    OpenOutput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't write {what} {}", path.display())]
    WriteOutput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    /// Path of the file the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            BundleError::OpenInput { path, .. }
            | BundleError::ReadInput { path, .. }
            | BundleError::OpenOutput { path, .. }
            | BundleError::WriteOutput { path, .. } => path,
        }
    }
}
