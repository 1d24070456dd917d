use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Failed to create contacts: {message}")]
    ProviderContactError { message: String },

    #[error("Failed to send email: {message}")]
    ProviderSendError { message: String },

    #[error("Sequence generation failed: {message}")]
    GeneratorError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// HTTP status a caller-facing handler reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            _ => 500,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ProviderSendError { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::GeneratorError { .. } => ErrorSeverity::Medium,
            Self::ValidationError { .. }
            | Self::ProviderContactError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Message safe to show to whoever submitted the request. Only validation and
    /// contact-stage failures carry detail; everything else is reported generically.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => message.clone(),
            Self::ProviderContactError { .. } => self.to_string(),
            Self::ProviderSendError { message } => message.clone(),
            _ => "Internal server error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => {
                "Check that sender name, sender email, campaign name and at least one recipient are provided"
            }
            Self::ProviderContactError { .. } => {
                "Verify the provider API key and that the contact list exists"
            }
            Self::ProviderSendError { .. } => "Inspect the failed send records and resend those slots",
            Self::ApiError(_) => "Check network connectivity and the configured base URLs",
            Self::GeneratorError { .. } => "Check the sequence generation backend logs",
            Self::CsvError(_) => "Make sure the CSV has an email column and one recipient per row",
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Review the configuration file and environment",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check file paths and that draft files are valid JSON"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
