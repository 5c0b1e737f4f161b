use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] caixa_core::ValidationError),

    #[error(transparent)]
    Fetch(#[from] caixa_core::FetchError),

    #[error(transparent)]
    Resolution(#[from] caixa_core::ResolutionError),

    #[error(transparent)]
    Config(#[from] caixa_core::ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Fetch(_) | Self::Resolution(_) => 3,
            Self::Serialization(_) => 4,
            Self::Config(_) => 6,
            Self::Io(_) => 10,
            Self::Server(_) => 1,
        }
    }
}
