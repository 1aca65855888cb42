//! Credkit API configuration types and utilities.
use lazy_static::lazy_static;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable holding the path of the configuration file.
pub const CREDKIT_CONFIG: &str = "CREDKIT_CONFIG";

const DEFAULT_CONCURRENCY_LIMIT: usize = credkit_core::vp_validator::DEFAULT_CONCURRENCY_LIMIT;

/// Issuance configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoreConfig {
    /// Validity period applied to issued credentials that carry no expiration date.
    pub default_validity_days: Option<u32>,
}

/// Verifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifierConfig {
    /// Domain presentations must be bound to, unless overridden per call.
    pub domain: Option<String>,
    /// Number of embedded credentials verified at once.
    pub concurrency_limit: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            domain: None,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

/// Wrapper struct for parsing the `core` and `verifier` config tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
    pub verifier: VerifierConfig,
}

lazy_static! {
    /// Lazy static reference to the configuration loaded from the file at `CREDKIT_CONFIG`.
    pub static ref API_CONFIG: Config = load_config();
}

fn load_config() -> Config {
    let path = match std::env::var(CREDKIT_CONFIG) {
        Ok(path) => path,
        Err(_) => return Config::default(),
    };
    match fs::read_to_string(&path).map(|toml_str| parse_toml(&toml_str)) {
        Ok(Ok(config)) => config,
        Ok(Err(err)) => {
            warn!("Error parsing {path}, using default configuration: {err}");
            Config::default()
        }
        Err(err) => {
            warn!("Error reading {path}, using default configuration: {err}");
            Config::default()
        }
    }
}

/// Parses configuration, ignoring unrelated tables.
pub fn parse_toml(toml_str: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(toml_str)
}

/// Gets `credkit-api` configuration variables.
pub fn api_config() -> &'static Config {
    &API_CONFIG
}
