use anyhow::Result;
use bundlescript::Config;
use bundlescript::logging;
use bundlescript::pipeline::run_once;

fn main() -> Result<()> {
    let config = Config::from_cli()?;
    logging::init(config.verbosity);
    run_once(&config)?;
    Ok(())
}
