//! Proxy configuration.
//!
//! Values are layered: built-in defaults, then the JSON config file
//! (`~/.chatproxy/config.json`), then `CHATPROXY_*` environment variables.
//! Callers may override any field afterwards through the `with_*` builders.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::logging::mask_token;

/// Default conversation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://chat.duti.tech/api/conversation";
/// Default backend model.
pub const DEFAULT_MODEL: &str = "text-davinci-002-render-sha";
/// Default overall deadline for one exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(600_000);
/// The backend rejects some browser-like agents; this one is known to work.
pub const DEFAULT_USER_AGENT: &str = "curl";

const CONFIG_DIR: &str = ".chatproxy";
const CONFIG_FILE: &str = "config.json";

pub const ENV_ENDPOINT: &str = "CHATPROXY_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "CHATPROXY_ACCESS_TOKEN";
/// Older variable name, read when `CHATPROXY_ACCESS_TOKEN` is unset
pub const ENV_ACCESS_TOKEN_FALLBACK: &str = "OPENAI_ACCESS_TOKEN";
pub const ENV_MODEL: &str = "CHATPROXY_MODEL";
pub const ENV_TIMEOUT_MS: &str = "CHATPROXY_TIMEOUT_MS";
pub const ENV_USER_AGENT: &str = "CHATPROXY_USER_AGENT";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no access token configured (set CHATPROXY_ACCESS_TOKEN or access_token in the config file)")]
    MissingAccessToken,

    #[error("endpoint must not be empty")]
    MissingEndpoint,

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk shape of the config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    endpoint: Option<String>,
    access_token: Option<String>,
    model: Option<String>,
    timeout_ms: Option<u64>,
    user_agent: Option<String>,
}

/// Settings shared by every call made through one `ChatProxy`.
///
/// # Example
///
/// ```ignore
/// use chatproxy::config::ProxyConfig;
///
/// let config = ProxyConfig::default()
///     .with_access_token("sk-...")
///     .with_timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Conversation endpoint; the lookup appends `/<conversation_id>`
    pub endpoint: String,
    /// Bearer credential
    pub access_token: String,
    pub model: String,
    /// Default deadline, used when a call does not set its own
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &mask_token(&self.access_token))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ProxyConfig {
    /// Create a new ProxyConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// `~/.chatproxy/config.json`, or `None` if the home directory cannot be
    /// determined.
    pub fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Overlay the values present in a JSON config file.
    pub fn merge_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: ConfigFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(endpoint) = parsed.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(token) = parsed.access_token {
            self.access_token = token;
        }
        if let Some(model) = parsed.model {
            self.model = model;
        }
        if let Some(ms) = parsed.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(user_agent) = parsed.user_agent {
            self.user_agent = user_agent;
        }
        Ok(self)
    }

    /// Load defaults plus a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::default().merge_file(path)
    }

    /// Overlay variables looked up through `var`. Empty values are ignored.
    pub fn apply_vars<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN).or_else(|| get(ENV_ACCESS_TOKEN_FALLBACK)) {
            self.access_token = token;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_MS.to_string(),
                value: raw.clone(),
            })?;
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(user_agent) = get(ENV_USER_AGENT) {
            self.user_agent = user_agent;
        }
        Ok(self)
    }

    /// Overlay the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Build the effective configuration.
    ///
    /// An explicit `path` must exist. Without one, the default file is read
    /// if present. Environment variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => Self::default(),
            },
        };
        config.apply_env()
    }

    /// Check that the configuration can be used to make requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "timeout".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// URL of the lookup for one conversation.
    pub fn conversation_url(&self, conversation_id: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), conversation_id)
    }
}
