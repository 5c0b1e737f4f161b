use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Cep;
use crate::ValidationError;

/// Concrete postal-code lookup services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CepProviderId {
    ViaCep,
    BrasilApi,
    AwesomeApi,
}

impl CepProviderId {
    pub const DEFAULT_ORDER: [Self; 3] = [Self::ViaCep, Self::BrasilApi, Self::AwesomeApi];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViaCep => "viacep",
            Self::BrasilApi => "brasilapi",
            Self::AwesomeApi => "awesomeapi",
        }
    }
}

impl Display for CepProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CepProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viacep" => Ok(Self::ViaCep),
            "brasilapi" => Ok(Self::BrasilApi),
            "awesomeapi" => Ok(Self::AwesomeApi),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

/// Position of the answering provider in the resolver chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderTier {
    Primary,
    Secondary,
    Tertiary,
}

impl ProviderTier {
    /// Tier for a zero-based chain position; positions past the third are
    /// reported as tertiary.
    pub const fn from_position(position: usize) -> Self {
        match position {
            0 => Self::Primary,
            1 => Self::Secondary,
            _ => Self::Tertiary,
        }
    }
}

/// Address fields as mapped out of one provider's payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderAddress {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Canonical result of postal-code resolution.
///
/// `city` is always populated; street, neighborhood and state may be empty
/// (single-CEP municipalities have no street data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub cep: Cep,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub source_provider: ProviderTier,
    pub provider: CepProviderId,
}

impl AddressRecord {
    pub fn from_provider(
        cep: Cep,
        address: ProviderAddress,
        tier: ProviderTier,
        provider: CepProviderId,
    ) -> Self {
        Self {
            cep,
            street: address.street.trim().to_owned(),
            neighborhood: address.neighborhood.trim().to_owned(),
            city: address.city.trim().to_owned(),
            state: address.state.trim().to_ascii_uppercase(),
            source_provider: tier,
            provider,
        }
    }
}
