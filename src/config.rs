use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser};

/// Stands for stdin or stdout in place of a file path.
pub const STD_STREAM: &str = "-";

#[derive(Debug, Parser)]
#[command(
    name = "bundlescript",
    version,
    about = "Replace local <script src> includes in an HTML file with one concatenated bundle."
)]
pub struct Cli {
    /// htdocs directory; every other path is relative to it.
    #[arg(long, env = "BUNDLESCRIPT_HTDOCS")]
    pub htdocs: PathBuf,

    /// HTML input file (relative to htdocs; if "-" then stdin will be used).
    #[arg(long = "htmlin", env = "BUNDLESCRIPT_HTML_IN")]
    pub html_in: String,

    /// HTML output file (relative to htdocs; if "-" then stdout will be used).
    #[arg(long = "htmlout", env = "BUNDLESCRIPT_HTML_OUT")]
    pub html_out: String,

    /// JavaScript output file (relative to htdocs).
    #[arg(long = "jsout", env = "BUNDLESCRIPT_JS_OUT")]
    pub js_out: String,

    /// Log what bundlescript is currently doing; repeat for per-tag detail.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlInput {
    Stdin,
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlOutput {
    Stdout,
    File(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub htdocs: PathBuf,
    pub html_in: HtmlInput,
    pub html_out: HtmlOutput,
    /// Bundle path relative to htdocs, also used verbatim as the injected `src`.
    pub js_out: String,
    pub verbosity: u8,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        Config::from_args(Cli::parse())
    }

    pub fn from_args(cli: Cli) -> Result<Self> {
        if !cli.htdocs.is_dir() {
            return Err(anyhow!(
                "htdocs directory {} does not exist",
                cli.htdocs.display()
            ));
        }

        if cli.js_out.is_empty() || cli.js_out == STD_STREAM {
            return Err(anyhow!("JavaScript output must be a file path"));
        }

        let html_in = match cli.html_in.as_str() {
            "" => return Err(anyhow!("HTML input must not be empty")),
            STD_STREAM => HtmlInput::Stdin,
            path => HtmlInput::File(path.to_owned()),
        };

        let html_out = match cli.html_out.as_str() {
            "" => return Err(anyhow!("HTML output must not be empty")),
            STD_STREAM => HtmlOutput::Stdout,
            path => HtmlOutput::File(path.to_owned()),
        };

        Ok(Self {
            htdocs: cli.htdocs,
            html_in,
            html_out,
            js_out: cli.js_out,
            verbosity: cli.verbose,
        })
    }
}
