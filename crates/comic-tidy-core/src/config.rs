use crate::models::{ArchiveType, Strategy};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_TEMP_DIR_NAME: &str = "converted_temp";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_type: ArchiveType,
    pub default_strategy: Strategy,
    pub ignore_patterns: Vec<String>,
    pub temp_dir_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_type: ArchiveType::default(),
            default_strategy: Strategy::default(),
            ignore_patterns: Vec::new(),
            temp_dir_name: DEFAULT_TEMP_DIR_NAME.to_string(),
        }
    }
}

/// Load `Config.*` from the working directory (optional), then
/// `COMIC_TIDY_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("COMIC_TIDY"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
