use thiserror::Error;

/// Validation errors for user-supplied input exposed by `caixa-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("postal code must contain exactly 8 digits: '{value}'")]
    InvalidCep { value: String },

    #[error("date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("invalid status '{value}', expected one of settled, overdue, due_today, upcoming, no_due_date")]
    InvalidStatus { value: String },
    #[error("invalid postal provider '{value}', expected one of viacep, brasilapi, awesomeapi")]
    InvalidProvider { value: String },
}

/// Configuration errors raised while assembling [`crate::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API token not configured (set CAIXA_API_TOKEN or FLOW_API_TOKEN)")]
    MissingToken,

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure of a single financial API fetch.
///
/// An empty 2xx body is not an error; it normalizes to an empty table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{endpoint}: transport failure: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint}: upstream returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint}: malformed response body: {message}")]
    Malformed { endpoint: String, message: String },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Malformed { endpoint, .. } => endpoint,
        }
    }
}
