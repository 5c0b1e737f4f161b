//! Client for the financial REST API.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`FinanceClient::movements`] | `/v1/movimentosBancarios?DesabilitarPaginacao=true&DataMovimentoMaiorOuIgualA=YYYY-MM-DD` |
//! | [`FinanceClient::balances`] | `/v1/saldoBancos` |
//! | [`FinanceClient::receivables`] | `/v1/boletos?IdsReceber=0` |
//! | [`FinanceClient::clients`] | `/v1/clientes?DesabilitarPaginacao=true` |
//!
//! Bodies are cached per (URL, token digest). A 2xx response with an empty
//! body is a successful empty collection; non-2xx statuses, transport
//! failures and undecodable bodies are [`FetchError`]s.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use time::Date;
use tracing::{debug, warn};

use crate::cache::{cache_key, CacheMode, CacheStore};
use crate::config::{AppConfig, EndpointPaths, DEFAULT_API_TIMEOUT_MS};
use crate::domain::date::format_iso_date;
use crate::domain::{BankBalance, Client, ClientDirectory, Movement, Receivable};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::normalize::Normalizer;
use crate::retry::{RetryConfig, RetryingHttpClient};
use crate::{ConfigError, FetchError};

/// Receivables plus non-fatal problems met while assembling them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivablesSnapshot {
    pub rows: Vec<Receivable>,
    pub warnings: Vec<String>,
}

pub struct FinanceClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    token: String,
    timeout_ms: u64,
    cache: CacheStore,
    cache_mode: CacheMode,
    endpoints: EndpointPaths,
    normalizer: Normalizer,
}

impl FinanceClient {
    /// Client over `http_client` as given (no retry decoration).
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
            cache: CacheStore::default(),
            cache_mode: CacheMode::Use,
            endpoints: EndpointPaths::default(),
            normalizer: Normalizer::default(),
        }
    }

    /// Client wired from configuration, with 5xx/transport retry around
    /// `transport`. Fails with [`ConfigError::MissingToken`] when no token is
    /// configured.
    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn HttpClient>,
        cache: CacheStore,
    ) -> Result<Self, ConfigError> {
        let token = config.require_token()?;
        let retrying = RetryingHttpClient::new(
            transport,
            RetryConfig::exponential(config.api.max_retries),
        );

        Ok(Self::new(Arc::new(retrying), config.api.base_url.clone(), token)
            .with_timeout_ms(config.api.timeout_ms)
            .with_cache(cache)
            .with_endpoints(config.api.endpoints.clone())
            .with_normalizer(Normalizer::new(config.fields.clone())))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointPaths) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Fetches `path_and_query` and decodes it; empty bodies yield `Value::Null`.
    pub async fn fetch_json(&self, path_and_query: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let endpoint = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path)
            .to_owned();
        let key = cache_key(&url, &self.token);

        if self.cache_mode.reads() {
            if let Some(body) = self.cache.get(&key).await {
                debug!(endpoint = %endpoint, cache_hit = true, "financial fetch");
                return decode_body(&endpoint, &body);
            }
        }

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_auth(&HttpAuth::BearerToken(self.token.clone()))
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(endpoint = %endpoint, error = %error, "financial fetch failed");
            FetchError::Transport {
                endpoint: endpoint.clone(),
                message: error.message().to_owned(),
            }
        })?;

        if !response.is_success() {
            warn!(endpoint = %endpoint, status = response.status, "financial API error status");
            return Err(FetchError::Status {
                endpoint,
                status: response.status,
            });
        }

        debug!(
            endpoint = %endpoint,
            cache_hit = false,
            bytes = response.body.len(),
            "financial fetch"
        );
        let value = decode_body(&endpoint, &response.body)?;
        if self.cache_mode.writes() {
            self.cache.put(key, response.body, None).await;
        }
        Ok(value)
    }

    pub async fn movements(&self, since: Date) -> Result<Vec<Movement>, FetchError> {
        let path = format!(
            "{}?DesabilitarPaginacao=true&DataMovimentoMaiorOuIgualA={}",
            self.endpoints.movements,
            urlencoding::encode(&format_iso_date(since))
        );
        let raw = self.fetch_json(&path).await?;
        Ok(self.normalizer.movements(&raw))
    }

    pub async fn balances(&self) -> Result<Vec<BankBalance>, FetchError> {
        let raw = self.fetch_json(&self.endpoints.balances).await?;
        Ok(self.normalizer.balances(&raw))
    }

    pub async fn clients(&self) -> Result<Vec<Client>, FetchError> {
        let path = format!("{}?DesabilitarPaginacao=true", self.endpoints.clients);
        let raw = self.fetch_json(&path).await?;
        Ok(self.normalizer.clients(&raw))
    }

    /// Receivables with derived status as of `today`.
    ///
    /// Client names absent from the payload are joined from the clients
    /// endpoint; if that fetch fails the rows keep empty names and a warning
    /// is returned instead of an error.
    pub async fn receivables(&self, today: Date) -> Result<ReceivablesSnapshot, FetchError> {
        let path = format!("{}?IdsReceber=0", self.endpoints.receivables);
        let raw = self.fetch_json(&path).await?;

        let rows = self
            .normalizer
            .receivables(&raw, today, &ClientDirectory::default());
        let needs_join = rows
            .iter()
            .any(|row| row.client_name.is_empty() && !row.client_id.is_empty());
        if !needs_join {
            return Ok(ReceivablesSnapshot {
                rows,
                warnings: Vec::new(),
            });
        }

        match self.clients().await {
            Ok(clients) => Ok(ReceivablesSnapshot {
                rows: self
                    .normalizer
                    .receivables(&raw, today, &ClientDirectory::new(&clients)),
                warnings: Vec::new(),
            }),
            Err(error) => {
                warn!(error = %error, "client names unavailable for receivables");
                Ok(ReceivablesSnapshot {
                    rows,
                    warnings: vec![format!("client names unavailable: {error}")],
                })
            }
        }
    }
}

fn decode_body(endpoint: &str, body: &str) -> Result<Value, FetchError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|error| FetchError::Malformed {
        endpoint: endpoint.to_owned(),
        message: error.to_string(),
    })
}
