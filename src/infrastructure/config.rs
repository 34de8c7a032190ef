use crate::infrastructure::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

const CONFIG_JSON: &str = "pomodesk.json";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_WORK_MINUTES: u32 = 25;
const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Client configuration, persisted as a single JSON file next to the
/// host application. `schema` guards against stale files from other
/// versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub schema: u8,
    pub api_base_url: String,
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            schema: 1,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.schema != 1 {
            return Err(CoreError::InvalidInput(format!(
                "unsupported config schema {}",
                self.schema
            )));
        }
        if self.work_minutes == 0 {
            return Err(CoreError::InvalidInput(
                "work_minutes must be > 0".to_string(),
            ));
        }
        if self.break_minutes == 0 {
            return Err(CoreError::InvalidInput(
                "break_minutes must be > 0".to_string(),
            ));
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, CoreError> {
        Url::parse(self.api_base_url.trim())
            .map_err(|error| CoreError::InvalidInput(format!("invalid api_base_url: {error}")))
    }
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), CoreError> {
    let path = config_dir.join(CONFIG_JSON);
    if !path.exists() {
        fs::create_dir_all(config_dir)?;
        let formatted = serde_json::to_string_pretty(&ClientConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_config(config_dir: &Path) -> Result<ClientConfig, CoreError> {
    let raw = fs::read_to_string(config_dir.join(CONFIG_JSON))?;
    let config: ClientConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}
