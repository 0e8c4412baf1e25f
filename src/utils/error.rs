use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Cloudflare returned HTTP {status} for '{endpoint}'")]
    GatewayError { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ApiError(_) | SyncError::GatewayError { .. } => ErrorCategory::Network,
            SyncError::IoError(_) => ErrorCategory::Io,
            SyncError::SerializationError(_) => ErrorCategory::Processing,
            SyncError::ConfigValidationError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Rate-limited or transient network failures resolve on the next scheduled run
            SyncError::GatewayError { status, .. } if *status == 429 => ErrorSeverity::Medium,
            SyncError::ApiError(_) => ErrorSeverity::Medium,
            SyncError::GatewayError { .. } => ErrorSeverity::High,
            SyncError::IoError(_) => ErrorSeverity::Critical,
            SyncError::SerializationError(_) => ErrorSeverity::High,
            SyncError::ConfigValidationError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            SyncError::ProcessingError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SyncError::ApiError(_) => {
                "Check network connectivity and the blocklist/Cloudflare URLs".to_string()
            }
            SyncError::GatewayError { status, .. } if *status == 429 => {
                "Cloudflare rate limit hit; wait 15 minutes before retrying".to_string()
            }
            SyncError::GatewayError { .. } => {
                "Verify CF_API_TOKEN has Zero Trust edit permissions and CF_IDENTIFIER is the account id"
                    .to_string()
            }
            SyncError::IoError(_) => {
                "Check file paths and permissions for the tmp directory".to_string()
            }
            SyncError::SerializationError(_) => {
                "The API response did not match the expected shape; re-run with --verbose".to_string()
            }
            SyncError::ConfigValidationError { field, .. }
            | SyncError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in config.toml", field)
            }
            SyncError::MissingConfigError { field } => {
                format!("Set '{}' in config.toml or the environment", field)
            }
            SyncError::ProcessingError { .. } => {
                "Inspect the downloaded lists under the tmp directory".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::ApiError(e) => format!("A network request failed: {}", e),
            SyncError::GatewayError { endpoint, status } if *status == 429 => format!(
                "Cloudflare rejected '{}' with 429 - most likely the rate limit",
                endpoint
            ),
            SyncError::GatewayError { endpoint, status } => {
                format!("Cloudflare rejected '{}' with HTTP {}", endpoint, status)
            }
            SyncError::IoError(e) => format!("A file operation failed: {}", e),
            SyncError::SerializationError(e) => format!("Could not decode an API response: {}", e),
            SyncError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            SyncError::MissingConfigError { field } => {
                format!("Required configuration '{}' is missing", field)
            }
            SyncError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for '{}': {}", value, field, reason),
            SyncError::ProcessingError { message } => format!("Processing failed: {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
