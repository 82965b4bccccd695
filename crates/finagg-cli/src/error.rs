use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] finagg_core::ValidationError),

    #[error(transparent)]
    Service(#[from] finagg_core::ServiceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Service(_) => 3,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
