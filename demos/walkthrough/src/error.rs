use log::SetLoggerError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unable to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),
    #[error("Unknown scenario: {0}")]
    UnknownScenario(#[from] strum::ParseError),
    #[error("Unable to install logger: {0}")]
    Logger(#[from] SetLoggerError),
}
