use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cep::providers::build_provider;
use crate::cep::{CepLookup, ProviderFailure, ResolutionError, DEFAULT_CEP_TIMEOUT_MS};
use crate::domain::{AddressRecord, Cep, CepProviderId, ProviderTier};
use crate::http_client::HttpClient;

/// Ordered chain of postal-code providers.
pub struct CepResolver {
    providers: Vec<Arc<dyn CepLookup>>,
}

impl CepResolver {
    pub fn new(providers: Vec<Arc<dyn CepLookup>>) -> Self {
        Self { providers }
    }

    /// Default chain (ViaCEP, BrasilAPI, AwesomeAPI) over one transport.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self::from_order(http_client, &CepProviderId::DEFAULT_ORDER, DEFAULT_CEP_TIMEOUT_MS)
    }

    /// Chain in the given order; duplicate ids are kept once.
    pub fn from_order(
        http_client: Arc<dyn HttpClient>,
        order: &[CepProviderId],
        timeout_ms: u64,
    ) -> Self {
        let mut seen = Vec::with_capacity(order.len());
        let providers = order
            .iter()
            .copied()
            .filter(|provider| {
                if seen.contains(provider) {
                    false
                } else {
                    seen.push(*provider);
                    true
                }
            })
            .map(|provider| build_provider(provider, Arc::clone(&http_client), timeout_ms))
            .collect();
        Self { providers }
    }

    pub fn provider_ids(&self) -> Vec<CepProviderId> {
        self.providers.iter().map(|provider| provider.id()).collect()
    }

    /// Resolves a raw postal code.
    ///
    /// Malformed input fails before any provider is contacted. Providers are
    /// tried in chain order and the first one that maps an address with a
    /// city wins.
    pub async fn resolve(&self, raw: &str) -> Result<AddressRecord, ResolutionError> {
        let cep = Cep::parse(raw)?;
        let started = Instant::now();
        let mut attempts: Vec<ProviderFailure> = Vec::with_capacity(self.providers.len());

        for (position, provider) in self.providers.iter().enumerate() {
            let provider_id = provider.id();
            debug!(provider = %provider_id, cep = %cep, "querying postal provider");

            let failure = match provider.lookup(&cep).await {
                Ok(address) if !address.city.trim().is_empty() => {
                    let tier = ProviderTier::from_position(position);
                    info!(
                        provider = %provider_id,
                        cep = %cep,
                        attempts = attempts.len() + 1,
                        latency_ms = started.elapsed().as_millis() as u64,
                        "postal code resolved"
                    );
                    return Ok(AddressRecord::from_provider(cep, address, tier, provider_id));
                }
                Ok(_) => ProviderFailure::not_found(provider_id, "payload has no city"),
                Err(failure) => failure,
            };

            warn!(
                provider = %provider_id,
                cep = %cep,
                kind = failure.kind.as_str(),
                reason = %failure.message,
                "postal provider failed, trying next"
            );
            attempts.push(failure);
        }

        Err(ResolutionError::Exhausted { cep, attempts })
    }
}
