use std::sync::Arc;

use serde_json::Value;

use crate::cep::{CepLookup, LookupFuture, ProviderFailure, DEFAULT_CEP_TIMEOUT_MS};
use crate::domain::{Cep, CepProviderId, ProviderAddress};
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest};

/// Issues the single GET a provider is allowed and decodes the JSON payload.
async fn fetch_payload(
    http_client: &dyn HttpClient,
    provider: CepProviderId,
    url: String,
    timeout_ms: u64,
) -> Result<Value, ProviderFailure> {
    let request = HttpRequest::get(url)
        .with_header("accept", "application/json")
        .with_timeout_ms(timeout_ms);

    let response = http_client.execute(request).await.map_err(|error| {
        let message = match error.kind() {
            HttpErrorKind::Timeout => format!("timed out: {}", error.message()),
            _ => error.message().to_owned(),
        };
        ProviderFailure::unreachable(provider, message)
    })?;

    if !response.is_success() {
        return Err(ProviderFailure::unreachable(
            provider,
            format!("HTTP {}", response.status),
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|error| ProviderFailure::malformed(provider, error.to_string()))
}

/// String field that tolerates numbers and nulls.
fn text(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(value)) => value.trim().to_owned(),
        Some(Value::Number(value)) => value.to_string(),
        _ => String::new(),
    }
}

fn expect_object(provider: CepProviderId, payload: &Value) -> Result<(), ProviderFailure> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(ProviderFailure::malformed(provider, "expected a JSON object"))
    }
}

macro_rules! provider_ctor {
    ($name:ident) => {
        impl $name {
            pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
                Self {
                    http_client,
                    timeout_ms: DEFAULT_CEP_TIMEOUT_MS,
                }
            }

            pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
                self.timeout_ms = timeout_ms;
                self
            }
        }
    };
}

/// ViaCEP adapter.
pub struct ViaCepProvider {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

provider_ctor!(ViaCepProvider);

impl ViaCepProvider {
    fn map(payload: &Value) -> Result<ProviderAddress, ProviderFailure> {
        let provider = CepProviderId::ViaCep;
        expect_object(provider, payload)?;

        let flagged = match payload.get("erro") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        };
        if flagged {
            return Err(ProviderFailure::not_found(provider, "payload flagged \"erro\""));
        }

        Ok(ProviderAddress {
            street: text(payload, "logradouro"),
            neighborhood: text(payload, "bairro"),
            city: text(payload, "localidade"),
            state: text(payload, "uf"),
        })
    }
}

impl CepLookup for ViaCepProvider {
    fn id(&self) -> CepProviderId {
        CepProviderId::ViaCep
    }

    fn lookup<'a>(&'a self, cep: &'a Cep) -> LookupFuture<'a> {
        Box::pin(async move {
            let url = format!("https://viacep.com.br/ws/{}/json/", cep.as_str());
            let payload =
                fetch_payload(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;
            Self::map(&payload)
        })
    }
}

/// BrasilAPI adapter.
pub struct BrasilApiProvider {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

provider_ctor!(BrasilApiProvider);

impl BrasilApiProvider {
    fn map(payload: &Value) -> Result<ProviderAddress, ProviderFailure> {
        let provider = CepProviderId::BrasilApi;
        expect_object(provider, payload)?;

        let city = text(payload, "city");
        let error_shaped = payload.get("errors").is_some() || payload.get("type").is_some();
        if error_shaped && city.is_empty() {
            let message = match text(payload, "message") {
                message if message.is_empty() => String::from("error payload"),
                message => message,
            };
            return Err(ProviderFailure::not_found(provider, message));
        }

        Ok(ProviderAddress {
            street: text(payload, "street"),
            neighborhood: text(payload, "neighborhood"),
            city,
            state: text(payload, "state"),
        })
    }
}

impl CepLookup for BrasilApiProvider {
    fn id(&self) -> CepProviderId {
        CepProviderId::BrasilApi
    }

    fn lookup<'a>(&'a self, cep: &'a Cep) -> LookupFuture<'a> {
        Box::pin(async move {
            let url = format!("https://brasilapi.com.br/api/cep/v1/{}", cep.as_str());
            let payload =
                fetch_payload(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;
            Self::map(&payload)
        })
    }
}

/// AwesomeAPI adapter.
pub struct AwesomeApiProvider {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

provider_ctor!(AwesomeApiProvider);

impl AwesomeApiProvider {
    fn map(payload: &Value) -> Result<ProviderAddress, ProviderFailure> {
        let provider = CepProviderId::AwesomeApi;
        expect_object(provider, payload)?;

        let code = text(payload, "code");
        if code == "not_found" || code == "invalid" {
            return Err(ProviderFailure::not_found(provider, format!("code {code}")));
        }
        let status = payload.get("status").and_then(|status| match status {
            Value::Number(number) => number.as_u64(),
            Value::String(raw) => raw.trim().parse::<u64>().ok(),
            _ => None,
        });
        if let Some(status) = status {
            if status >= 400 {
                return Err(ProviderFailure::not_found(provider, format!("status {status}")));
            }
        }

        Ok(ProviderAddress {
            street: text(payload, "address"),
            neighborhood: text(payload, "district"),
            city: text(payload, "city"),
            state: text(payload, "state"),
        })
    }
}

impl CepLookup for AwesomeApiProvider {
    fn id(&self) -> CepProviderId {
        CepProviderId::AwesomeApi
    }

    fn lookup<'a>(&'a self, cep: &'a Cep) -> LookupFuture<'a> {
        Box::pin(async move {
            let url = format!("https://cep.awesomeapi.com.br/json/{}", cep.as_str());
            let payload =
                fetch_payload(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;
            Self::map(&payload)
        })
    }
}

/// Builds the adapter for a provider id.
pub(crate) fn build_provider(
    provider: CepProviderId,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
) -> Arc<dyn CepLookup> {
    match provider {
        CepProviderId::ViaCep => {
            Arc::new(ViaCepProvider::new(http_client).with_timeout_ms(timeout_ms))
        }
        CepProviderId::BrasilApi => {
            Arc::new(BrasilApiProvider::new(http_client).with_timeout_ms(timeout_ms))
        }
        CepProviderId::AwesomeApi => {
            Arc::new(AwesomeApiProvider::new(http_client).with_timeout_ms(timeout_ms))
        }
    }
}
