use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// Brazilian postal code (CEP): exactly eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    pub const LEN: usize = 8;

    /// Strips separators (anything that is not alphanumeric) and validates the
    /// remainder. Letters are kept, so `"0100A000"` is rejected rather than
    /// silently shortened.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input
            .chars()
            .filter(|ch| ch.is_alphanumeric())
            .collect::<String>();

        if normalized.len() != Self::LEN || !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCep {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    /// The bare eight digits, as sent to lookup providers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `NNNNN-NNN` display form.
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl Display for Cep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl FromStr for Cep {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for Cep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.formatted())
    }
}

impl<'de> Deserialize<'de> for Cep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators() {
        assert_eq!(Cep::parse("01001-000").expect("valid").as_str(), "01001000");
        assert_eq!(Cep::parse(" 01.001-000 ").expect("valid").as_str(), "01001000");
        assert_eq!(Cep::parse("01001000").expect("valid").formatted(), "01001-000");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Cep::parse("123"),
            Err(ValidationError::InvalidCep { .. })
        ));
        assert!(Cep::parse("").is_err());
        assert!(Cep::parse("010010001").is_err());
    }

    #[test]
    fn rejects_letters_and_non_ascii_digits() {
        assert!(Cep::parse("0100A000").is_err());
        assert!(Cep::parse("０１００１０００").is_err());
    }
}
