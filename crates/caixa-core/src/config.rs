//! Runtime configuration.
//!
//! Resolution order, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>` or `CAIXA_CONFIG`)
//! 3. Environment variables
//!
//! | Variable | Fallback | Default |
//! |----------|----------|---------|
//! | `CAIXA_API_TOKEN` | `FLOW_API_TOKEN` | (none) |
//! | `CAIXA_API_BASE_URL` | - | `https://api.flow2.com.br` |
//! | `CAIXA_API_TIMEOUT_MS` | - | `30000` |
//! | `CAIXA_CACHE_TTL_SECS` | - | `600` |
//! | `CAIXA_MOVEMENTS_SINCE` | - | `2025-01-01` |
//! | `CAIXA_CEP_TIMEOUT_MS` | - | `5000` |

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use time::macros::date;
use time::Date;

use crate::cep::DEFAULT_CEP_TIMEOUT_MS;
use crate::domain::date::parse_iso_date;
use crate::domain::CepProviderId;
use crate::normalize::FieldMapping;
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.flow2.com.br";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_MOVEMENTS_SINCE: Date = date!(2025 - 01 - 01);

/// Paths of the financial API endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub movements: String,
    pub balances: String,
    pub receivables: String,
    pub clients: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            movements: String::from("/v1/movimentosBancarios"),
            balances: String::from("/v1/saldoBancos"),
            receivables: String::from("/v1/boletos"),
            clients: String::from("/v1/clientes"),
        }
    }
}

/// Financial API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_ms: u64,
    pub cache_ttl: Duration,
    pub movements_since: Date,
    pub max_retries: u32,
    pub endpoints: EndpointPaths,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            token: None,
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            movements_since: DEFAULT_MOVEMENTS_SINCE,
            max_retries: 3,
            endpoints: EndpointPaths::default(),
        }
    }
}

// The token stays out of debug output.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("cache_ttl", &self.cache_ttl)
            .field("movements_since", &self.movements_since)
            .field("max_retries", &self.max_retries)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Postal-code resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CepConfig {
    pub timeout_ms: u64,
    pub providers: Vec<CepProviderId>,
}

impl Default for CepConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_CEP_TIMEOUT_MS,
            providers: CepProviderId::DEFAULT_ORDER.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cep: CepConfig,
    pub fields: FieldMapping,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api: Option<RawApi>,
    cep: Option<RawCep>,
    fields: Option<FieldMapping>,
}

#[derive(Debug, Default, Deserialize)]
struct RawApi {
    base_url: Option<String>,
    token: Option<String>,
    timeout_ms: Option<u64>,
    cache_ttl_secs: Option<u64>,
    movements_since: Option<String>,
    max_retries: Option<u32>,
    endpoints: Option<EndpointPaths>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCep {
    timeout_ms: Option<u64>,
    providers: Option<Vec<String>>,
}

impl AppConfig {
    /// Loads configuration from an optional file and the process environment.
    ///
    /// Without an explicit path, `CAIXA_CONFIG` names the file; when neither
    /// is set only defaults and environment variables apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var("CAIXA_CONFIG").ok().map(PathBuf::from);
        let path = path.or(env_path.as_deref());
        Self::from_sources(path, |key| std::env::var(key).ok())
    }

    /// Assembles configuration from a file and an environment lookup.
    pub fn from_sources(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
            config.apply_file(raw)?;
        }
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_file(&mut self, raw: RawConfig) -> Result<(), ConfigError> {
        if let Some(api) = raw.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(token) = api.token {
                self.api.token = non_blank(token);
            }
            if let Some(timeout_ms) = api.timeout_ms {
                self.api.timeout_ms = timeout_ms;
            }
            if let Some(ttl) = api.cache_ttl_secs {
                self.api.cache_ttl = Duration::from_secs(ttl);
            }
            if let Some(since) = api.movements_since {
                self.api.movements_since = parse_iso_date(&since)?;
            }
            if let Some(max_retries) = api.max_retries {
                self.api.max_retries = max_retries;
            }
            if let Some(endpoints) = api.endpoints {
                self.api.endpoints = endpoints;
            }
        }

        if let Some(cep) = raw.cep {
            if let Some(timeout_ms) = cep.timeout_ms {
                self.cep.timeout_ms = timeout_ms;
            }
            if let Some(providers) = cep.providers {
                self.cep.providers = providers
                    .iter()
                    .map(|name| CepProviderId::from_str(name))
                    .collect::<Result<_, _>>()?;
            }
        }

        if let Some(fields) = raw.fields {
            self.fields = fields;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(token) = env("CAIXA_API_TOKEN").or_else(|| env("FLOW_API_TOKEN")) {
            if let Some(token) = non_blank(token) {
                self.api.token = Some(token);
            }
        }
        if let Some(base_url) = env("CAIXA_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Some(raw) = env("CAIXA_API_TIMEOUT_MS") {
            self.api.timeout_ms = parse_number("CAIXA_API_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = env("CAIXA_CACHE_TTL_SECS") {
            self.api.cache_ttl = Duration::from_secs(parse_number("CAIXA_CACHE_TTL_SECS", &raw)?);
        }
        if let Some(raw) = env("CAIXA_MOVEMENTS_SINCE") {
            self.api.movements_since = parse_iso_date(&raw)?;
        }
        if let Some(raw) = env("CAIXA_CEP_TIMEOUT_MS") {
            self.cep.timeout_ms = parse_number("CAIXA_CEP_TIMEOUT_MS", &raw)?;
        }
        Ok(())
    }

    /// Token for the financial API; only operations that call it need one.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.api.token.as_deref().ok_or(ConfigError::MissingToken)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
    })
}
