pub mod bundle;
pub mod config;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod rewrite;
pub mod token;
pub mod tokenizer;

pub use config::Config;
pub use error::BundleError;
