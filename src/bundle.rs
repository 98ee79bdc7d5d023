use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use crate::error::BundleError;
use crate::output::{AtomicOutput, resolve};

pub const JS_SOURCE: &str = "JavaScript source";
pub const JS_OUTPUT: &str = "JavaScript output";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Concatenates `sources` into `js_output`, in order and without separators. All paths
/// are relative to `htdocs`.
///
/// The output is only replaced once every source has been copied, so a missing source
/// leaves any previous bundle untouched.
pub fn merge_js_sources(
    htdocs: &Path,
    js_output: &str,
    sources: &[String],
) -> Result<MergeSummary, BundleError> {
    info!("Merging JS sources...");
    let mut output = AtomicOutput::create(JS_OUTPUT, resolve(htdocs, js_output))?;
    info!("Writing JS output to {}", output.path().display());

    let mut summary = MergeSummary::default();
    let mut buf = Vec::new();
    for relative in sources {
        let path = resolve(htdocs, relative);
        let mut input = File::open(&path).map_err(|source| BundleError::OpenInput {
            what: JS_SOURCE,
            path: path.clone(),
            source,
        })?;
        info!("Merging {relative}");
        buf.clear();
        input
            .read_to_end(&mut buf)
            .map_err(|source| BundleError::ReadInput {
                what: JS_SOURCE,
                path,
                source,
            })?;
        if let Err(source) = output.file_mut().write_all(&buf) {
            return Err(output.write_error(source));
        }
        summary.bytes += buf.len() as u64;
        summary.files += 1;
    }

    output.commit()?;
    info!(
        files = summary.files,
        bytes = summary.bytes,
        "Finished with merging."
    );
    Ok(summary)
}
