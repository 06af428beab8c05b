use thiserror::Error;

/// Errors raised at the input and configuration boundary.
///
/// The reconciliation core itself never fails: malformed upstream data is absorbed
/// or filtered out. These variants only cover reading files, parsing documents and
/// loading configuration.
#[derive(Error, Debug)]
pub enum DeeployError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },
}

pub type Result<T> = std::result::Result<T, DeeployError>;

impl DeeployError {
    pub fn invalid_config(field: &str, reason: &str) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_document(reason: &str) -> Self {
        Self::InvalidDocument {
            reason: reason.to_string(),
        }
    }
}
