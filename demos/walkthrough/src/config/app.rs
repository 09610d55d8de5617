use config::{Config, Environment, File, FileFormat};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use crate::AppError;

const DEFAULT_CONFIG: &str = include_str!("../../resources/config/default.toml");
const DEFAULT_CONFIG_PREFIX: &str = "WALKTHROUGH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Scenario {
    All,
    EntityMonitor,
    DualRole,
    Metrics,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    pub scenario: Scenario,
    /// Last value the entity scenarios drive their entity to.
    #[validate(range(min = 1, max = 1000))]
    pub target_value: i32,
    /// Initial values of the three dual-role entities.
    #[validate(length(equal = 3))]
    pub dual_role_values: Vec<i32>,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(
                Environment::with_prefix(DEFAULT_CONFIG_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("dual_role_values"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Applies a scenario given on the command line, if any.
    pub fn with_scenario(mut self, scenario: Option<&str>) -> Result<Self, AppError> {
        if let Some(scenario) = scenario {
            self.scenario = scenario.parse()?;
        }
        Ok(self)
    }
}
