use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::config::{HtmlInput, HtmlOutput};
use crate::error::BundleError;

pub const HTML_INPUT: &str = "HTML input";
pub const HTML_OUTPUT: &str = "HTML output";

/// Resolves `relative` under `htdocs`. A leading `/` is treated as the htdocs root, not
/// the file system root.
pub fn resolve(htdocs: &Path, relative: &str) -> PathBuf {
    htdocs.join(relative.trim_start_matches('/'))
}

/// A file that only replaces its destination once [`AtomicOutput::commit`] succeeds.
///
/// Content goes to a temporary file next to the destination. If the run fails before
/// commit, the temporary file is removed on drop and the destination is left as it was.
pub struct AtomicOutput {
    what: &'static str,
    path: PathBuf,
    file: NamedTempFile,
}

impl AtomicOutput {
    pub fn create(what: &'static str, path: PathBuf) -> Result<Self, BundleError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        match NamedTempFile::new_in(dir) {
            Ok(file) => Ok(Self { what, path, file }),
            Err(source) => Err(BundleError::OpenOutput { what, path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    pub fn write_error(&self, source: io::Error) -> BundleError {
        BundleError::WriteOutput {
            what: self.what,
            path: self.path.clone(),
            source,
        }
    }

    pub fn commit(self) -> Result<(), BundleError> {
        let AtomicOutput { what, path, file } = self;
        let permissions = match fs::metadata(&path) {
            Ok(existing) => Some(existing.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            if let Err(source) = file.as_file().set_permissions(permissions) {
                return Err(BundleError::WriteOutput { what, path, source });
            }
        }
        match file.persist(&path) {
            Ok(_) => Ok(()),
            Err(err) => Err(BundleError::WriteOutput {
                what,
                path,
                source: err.error,
            }),
        }
    }
}

// Temporary files are created owner-only; published outputs should be world-readable.
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

pub fn read_html(htdocs: &Path, input: &HtmlInput) -> Result<Vec<u8>, BundleError> {
    let mut html = Vec::new();
    match input {
        HtmlInput::Stdin => {
            info!("Reading HTML from stdin.");
            io::stdin()
                .lock()
                .read_to_end(&mut html)
                .map_err(|source| BundleError::ReadInput {
                    what: HTML_INPUT,
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
        }
        HtmlInput::File(relative) => {
            let path = resolve(htdocs, relative);
            let mut file = File::open(&path).map_err(|source| BundleError::OpenInput {
                what: HTML_INPUT,
                path: path.clone(),
                source,
            })?;
            info!("Reading HTML file {relative}.");
            file.read_to_end(&mut html)
                .map_err(|source| BundleError::ReadInput {
                    what: HTML_INPUT,
                    path,
                    source,
                })?;
        }
    }
    Ok(html)
}

pub fn write_html(htdocs: &Path, output: &HtmlOutput, html: &[u8]) -> Result<(), BundleError> {
    match output {
        HtmlOutput::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html)
                .and_then(|()| stdout.flush())
                .map_err(|source| BundleError::WriteOutput {
                    what: HTML_OUTPUT,
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
        HtmlOutput::File(relative) => {
            let mut out = AtomicOutput::create(HTML_OUTPUT, resolve(htdocs, relative))?;
            info!("Writing HTML output to {relative}.");
            if let Err(source) = out.file_mut().write_all(html) {
                return Err(out.write_error(source));
            }
            out.commit()
        }
    }
}
