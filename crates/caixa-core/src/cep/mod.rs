//! Postal-code (CEP) resolution with ordered provider fallback.
//!
//! | Tier | Provider | URL |
//! |------|----------|-----|
//! | Primary | ViaCEP | `https://viacep.com.br/ws/{cep}/json/` |
//! | Secondary | BrasilAPI | `https://brasilapi.com.br/api/cep/v1/{cep}` |
//! | Tertiary | AwesomeAPI | `https://cep.awesomeapi.com.br/json/{cep}` |
//!
//! Each provider gets one bounded-timeout attempt. Any failure moves on to the
//! next provider; the first mapped address wins.

mod providers;
mod resolver;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Cep, CepProviderId, ProviderAddress};
use crate::ValidationError;

pub use providers::{AwesomeApiProvider, BrasilApiProvider, ViaCepProvider};
pub use resolver::CepResolver;

/// Default per-provider timeout.
pub const DEFAULT_CEP_TIMEOUT_MS: u64 = 5_000;

/// Why a single provider did not produce an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFailureKind {
    /// Timeout, connection failure or non-2xx status.
    Unreachable,
    /// The provider answered but does not know the code.
    NotFound,
    /// The body could not be decoded.
    Malformed,
}

impl ProviderFailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::NotFound => "not found",
            Self::Malformed => "malformed response",
        }
    }
}

/// One failed provider attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: CepProviderId,
    pub kind: ProviderFailureKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn unreachable(provider: CepProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderFailureKind::Unreachable, message)
    }

    pub fn not_found(provider: CepProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderFailureKind::NotFound, message)
    }

    pub fn malformed(provider: CepProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderFailureKind::Malformed, message)
    }

    fn new(provider: CepProviderId, kind: ProviderFailureKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }
}

impl Display for ProviderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.provider, self.kind.as_str(), self.message)
    }
}

/// Failure of a whole resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Rejected before any provider was contacted.
    #[error(transparent)]
    InvalidFormat(#[from] ValidationError),

    /// Every provider failed; attempts are kept in chain order.
    #[error("could not resolve postal code {cep}: {}", last_reason(.attempts))]
    Exhausted {
        cep: Cep,
        attempts: Vec<ProviderFailure>,
    },
}

impl ResolutionError {
    pub fn attempts(&self) -> &[ProviderFailure] {
        match self {
            Self::InvalidFormat(_) => &[],
            Self::Exhausted { attempts, .. } => attempts,
        }
    }
}

fn last_reason(attempts: &[ProviderFailure]) -> String {
    attempts
        .last()
        .map(ToString::to_string)
        .unwrap_or_else(|| String::from("no postal providers configured"))
}

pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProviderAddress, ProviderFailure>> + Send + 'a>>;

/// Contract implemented by every postal-code provider.
pub trait CepLookup: Send + Sync {
    fn id(&self) -> CepProviderId;

    fn lookup<'a>(&'a self, cep: &'a Cep) -> LookupFuture<'a>;
}
