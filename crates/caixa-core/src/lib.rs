//! # Caixa Core
//!
//! Domain records, transport and reporting for the caixa financial
//! dashboard.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL cache for raw API bodies |
//! | [`cep`] | Postal-code resolver with provider fallback |
//! | [`config`] | Defaults, TOML file and environment configuration |
//! | [`dashboard`] | View-level operations (statement, balances, receivables) |
//! | [`domain`] | Canonical records (movements, balances, receivables, addresses) |
//! | [`error`] | Error types |
//! | [`finance`] | Financial REST API client |
//! | [`form`] | Registration form state and session store |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`money`] | BRL parsing and formatting |
//! | [`normalize`] | Raw JSON to canonical records |
//! | [`pdf`] | Registration form PDF export |
//! | [`report`] | Filters, statement grouping and KPIs |
//! | [`retry`] | Retry with exponential backoff |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  CLI / Web API  │────▶│ Report           │
//! └────────┬────────┘     └──────────────────┘
//!          │                       ▲
//!          ▼                       │
//! ┌─────────────────┐     ┌──────────────────┐
//! │ FinanceClient   │────▶│ Normalizer       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Retry + Cache   │────▶│ HTTP Client      │◀──── CepResolver
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod cache;
pub mod cep;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod finance;
pub mod form;
pub mod http_client;
pub mod money;
pub mod normalize;
pub mod pdf;
pub mod report;
pub mod retry;

pub use cache::{cache_key, CacheMode, CacheStore, DEFAULT_CACHE_TTL};
pub use cep::{
    CepLookup, CepResolver, ProviderFailure, ProviderFailureKind, ResolutionError,
    DEFAULT_CEP_TIMEOUT_MS,
};
pub use config::{ApiConfig, AppConfig, CepConfig, EndpointPaths};
pub use dashboard::{Dashboard, ReceivablesView};
pub use domain::{
    AddressRecord, BankBalance, Cep, CepProviderId, Client, ClientDirectory, Clock, DateRange,
    FixedClock, Movement, ProviderTier, Receivable, ReceivableStatus, SystemClock,
};
pub use error::{ConfigError, FetchError, ValidationError};
pub use finance::{FinanceClient, ReceivablesSnapshot};
pub use form::{RegistrationForm, SessionId, SessionStore};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
pub use money::{format_brl, format_brl_or_blank};
pub use normalize::{FieldMapping, Normalizer};
pub use pdf::{export_registration_pdf, render_registration_pdf, ExportedDocument};
pub use report::{
    bank_options, BalanceReport, MovementFilter, MovementReport, ReceivableFilter,
    ReceivableReport,
};
pub use retry::{Backoff, RetryConfig, RetryingHttpClient};
