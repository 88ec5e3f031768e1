// Configuration for skinstash.
// Account credentials, target game, storage location, and HTTP timeout.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheKey, data_dir, inventory_path};
use crate::error::{Result, StashError};

/// Steam app id for Counter-Strike.
pub const DEFAULT_APP_ID: u32 = 730;
/// Steam inventory context for tradable game items.
pub const DEFAULT_CONTEXT_ID: u32 = 2;
pub const DEFAULT_BASE_URL: &str = "https://api.skinmarket.example/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_ACCOUNT: &str = "SKINSTASH_ACCOUNT";
const ENV_API_KEY: &str = "SKINSTASH_API_KEY";
const ENV_APP_ID: &str = "SKINSTASH_APP_ID";
const ENV_CONTEXT_ID: &str = "SKINSTASH_CONTEXT_ID";
const ENV_DATA_DIR: &str = "SKINSTASH_DATA_DIR";
const ENV_API_BASE: &str = "SKINSTASH_API_BASE";
const ENV_TIMEOUT_SECS: &str = "SKINSTASH_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    /// Display label for the account; not used for anything else.
    pub account_name: Option<String>,
    pub api_key: String,
    pub app_id: u32,
    pub context_id: u32,
    /// Overrides the platform data directory when set.
    pub data_dir: Option<PathBuf>,
    pub base_url: String,
    /// Applied to every marketplace request.
    pub timeout: Duration,
}

impl Config {
    /// Create a configuration with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            account_name: None,
            api_key: api_key.into(),
            app_id: DEFAULT_APP_ID,
            context_id: DEFAULT_CONTEXT_ID,
            data_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from the environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY).ok_or(StashError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        config.account_name = lookup(ENV_ACCOUNT).filter(|name| !name.is_empty());
        if let Some(app_id) = lookup(ENV_APP_ID) {
            config.app_id = parse_var(ENV_APP_ID, &app_id)?;
        }
        if let Some(context_id) = lookup(ENV_CONTEXT_ID) {
            config.context_id = parse_var(ENV_CONTEXT_ID, &context_id)?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(base_url) = lookup(ENV_API_BASE) {
            config.base_url = base_url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_var(ENV_TIMEOUT_SECS, &secs)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_account_name(mut self, name: impl Into<String>) -> Self {
        self.account_name = Some(name.into());
        self
    }

    pub fn with_game(mut self, app_id: u32, context_id: u32) -> Self {
        self.app_id = app_id;
        self.context_id = context_id;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the required fields.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StashError::MissingApiKey);
        }
        if self.timeout.is_zero() {
            return Err(StashError::InvalidConfig("timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.api_key, self.app_id, self.context_id)
    }

    /// Location of the persisted inventory for this account and game.
    pub fn inventory_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => data_dir().ok_or_else(|| {
                StashError::InvalidConfig("could not resolve a data directory".to_string())
            })?,
        };
        Ok(inventory_path(&dir, &self.cache_key()))
    }

    /// Label for log output.
    pub fn account_label(&self) -> &str {
        self.account_name.as_deref().unwrap_or("default")
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StashError::InvalidConfig(format!("{}: cannot parse {:?}", name, value)))
}
