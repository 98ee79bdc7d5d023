use anyhow::{Context, Result};
use tracing::info;

use crate::bundle::{MergeSummary, merge_js_sources};
use crate::config::Config;
use crate::output::{read_html, write_html};
use crate::rewrite::{RewriteOutcome, rewrite};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: Vec<String>,
    /// `None` when the document had no `</html>` and no bundle was written.
    pub merged: Option<MergeSummary>,
}

/// Rewrites the configured HTML document and writes the bundle it references.
pub fn run_once(config: &Config) -> Result<RunSummary> {
    let html = read_html(&config.htdocs, &config.html_in)?;

    let mut merged = None;
    let RewriteOutcome {
        html: rewritten,
        sources,
        ..
    } = rewrite(&html, &config.js_out, |sources| {
        merged = Some(merge_js_sources(&config.htdocs, &config.js_out, sources)?);
        Ok::<_, anyhow::Error>(())
    })
    .context("Couldn't merge JavaScript sources")?;

    write_html(&config.htdocs, &config.html_out, &rewritten)?;

    info!("Done.");
    Ok(RunSummary { sources, merged })
}
