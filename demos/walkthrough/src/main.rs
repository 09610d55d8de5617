use std::env;

use log::debug;

use crate::config::app::AppConfig;

mod config;
mod error;
mod scenarios;

pub use error::AppError;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()?.with_scenario(env::args().nth(1).as_deref())?;
    config::log::init(config.log_level)?;
    debug!("Effective configuration:\n{}", toml::to_string(&config)?);

    scenarios::run(&config)
}
