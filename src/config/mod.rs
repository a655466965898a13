// snapclone/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_DIR: &str = ".";

/// Provider environments a clone can be driven against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Prod,
    P0c0,
}

impl Environment {
    pub const ALLOWED: &'static [&'static str] = &["dev", "test", "prod", "p0c0"];

    /// Control-plane host for the environment. `prod` and `p0c0` share a host.
    pub fn host(&self) -> &'static str {
        match self {
            Environment::Dev => "https://api.dev.cloud.datastax.com",
            Environment::Test => "https://api.test.cloud.datastax.com",
            Environment::Prod | Environment::P0c0 => "https://api.astra.datastax.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
            Environment::P0c0 => "p0c0",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            "p0c0" => Ok(Environment::P0c0),
            other => Err(anyhow::anyhow!(
                "Invalid environment '{}'. Allowed values are: {}.",
                other,
                Environment::ALLOWED.join(", ")
            )),
        }
    }
}

// Unvalidated settings, as read from the environment or config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub environment: Option<String>,
    pub source_db_id: Option<String>,
    pub target_db_id: Option<String>,
    pub token: Option<String>,
    pub api_base_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
}

impl RawConfig {
    /// Reads the process environment, with values from `env_file` taking precedence.
    /// A missing `env_file` is not an error.
    pub fn from_env(env_file: &Path) -> Result<Self> {
        let file_vars = read_env_file(env_file)?;
        Self::from_lookup(|key| file_vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Builds the raw config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_secs = |key: &str| -> Result<Option<u64>> {
            get(key)
                .map(|v| {
                    v.parse::<u64>()
                        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, v))
                })
                .transpose()
        };

        Ok(RawConfig {
            environment: get("ENVIRONMENT"),
            source_db_id: get("SOURCE_DB_ID"),
            target_db_id: get("TARGET_DB_ID"),
            token: get("ASTRA_TOKEN"),
            api_base_url: get("ASTRA_API_URL"),
            poll_interval_secs: get_secs("POLL_INTERVAL_SECS")?,
            request_timeout_secs: get_secs("REQUEST_TIMEOUT_SECS")?,
            log_dir: get("CLONE_LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw: RawConfig = serde_json::from_str(&config_content).with_context(|| {
            format!(
                "Failed to parse JSON from config file at {}",
                config_path.display()
            )
        })?;
        Ok(raw.normalized())
    }

    /// Trims string values and drops the empty ones, so a blank value never overrides
    /// a real one in `merge` and counts as missing in validation.
    pub fn normalized(self) -> RawConfig {
        let text = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        RawConfig {
            environment: text(self.environment),
            source_db_id: text(self.source_db_id),
            target_db_id: text(self.target_db_id),
            token: text(self.token),
            api_base_url: text(self.api_base_url),
            poll_interval_secs: self.poll_interval_secs,
            request_timeout_secs: self.request_timeout_secs,
            log_dir: self.log_dir.filter(|dir| !dir.as_os_str().is_empty()),
        }
    }

    /// Field-by-field overlay: values present in `other` win.
    pub fn merge(self, other: RawConfig) -> RawConfig {
        RawConfig {
            environment: other.environment.or(self.environment),
            source_db_id: other.source_db_id.or(self.source_db_id),
            target_db_id: other.target_db_id.or(self.target_db_id),
            token: other.token.or(self.token),
            api_base_url: other.api_base_url.or(self.api_base_url),
            poll_interval_secs: other.poll_interval_secs.or(self.poll_interval_secs),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            log_dir: other.log_dir.or(self.log_dir),
        }
    }
}

fn read_env_file(env_file: &Path) -> Result<HashMap<String, String>> {
    if !env_file.exists() {
        tracing::debug!(path = %env_file.display(), "no env file, using process environment only");
        return Ok(HashMap::new());
    }
    dotenv::from_path_iter(env_file)
        .with_context(|| format!("Failed to open env file at {}", env_file.display()))?
        .map(|item| item.with_context(|| format!("Failed to parse env file at {}", env_file.display())))
        .collect()
}

#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub api_base_url: Url,
    pub source_db_id: String,
    pub target_db_id: String,
    pub token: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("source_db_id", &self.source_db_id)
            .field("target_db_id", &self.target_db_id)
            .field("token", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env`-backed environment settings, overlaid with the optional JSON file.
    pub fn load(env_file: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut raw = RawConfig::from_env(env_file).context("Failed to read configuration from the environment")?;
        if let Some(path) = config_path {
            raw = raw.merge(RawConfig::load_from_json(path)?);
        }
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let raw = raw.normalized();
        let missing: Vec<&str> = [
            ("ENVIRONMENT", raw.environment.is_none()),
            ("SOURCE_DB_ID", raw.source_db_id.is_none()),
            ("TARGET_DB_ID", raw.target_db_id.is_none()),
            ("ASTRA_TOKEN", raw.token.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required configuration: {}. Set them in .env, the environment, or the JSON config file.",
                missing.join(", ")
            );
        }

        let (Some(environment), Some(source_db_id), Some(target_db_id), Some(token)) =
            (raw.environment, raw.source_db_id, raw.target_db_id, raw.token)
        else {
            anyhow::bail!("Missing required configuration");
        };

        let environment: Environment = environment.parse()?;

        let base = raw.api_base_url.as_deref().unwrap_or(environment.host());
        let api_base_url =
            Url::parse(base).with_context(|| format!("Invalid control-plane API URL: {}", base))?;
        if api_base_url.cannot_be_a_base() {
            anyhow::bail!("Control-plane API URL cannot be used as a base: {}", base);
        }

        let poll_interval_secs = raw.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            anyhow::bail!("poll interval must be greater than zero seconds");
        }
        let request_timeout_secs = raw
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be greater than zero seconds");
        }

        Ok(AppConfig {
            environment,
            api_base_url,
            source_db_id,
            target_db_id,
            token,
            poll_interval: Duration::from_secs(poll_interval_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            log_dir: raw.log_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }
}
