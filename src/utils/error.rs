use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Inconsistent response: {message}")]
    InconsistentResponse { message: String },

    #[error("Invalid MOL block: {message}")]
    Molfile { message: String },

    #[error("Molecule toolkit failed: {message}")]
    Toolkit { message: String },

    #[error("Required tool not found: {0}")]
    MissingTool(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Database,
    Configuration,
    Data,
    Toolkit,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::DatabaseError(_) | EtlError::NotFound { .. } => ErrorCategory::Database,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::Parse { .. }
            | EtlError::InconsistentResponse { .. }
            | EtlError::Molfile { .. } => ErrorCategory::Data,
            EtlError::Toolkit { .. } | EtlError::MissingTool(_) => ErrorCategory::Toolkit,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重跑即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration | ErrorCategory::Toolkit => {
                ErrorSeverity::High
            }
            ErrorCategory::Database | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity and that the KEGG/BiGG endpoints are reachable, then run the command again",
            EtlError::DatabaseError(_) => "Verify the database URL and that the schema exists (run `metanetx-post init-db`)",
            EtlError::NotFound { .. } => "Make sure the database was populated from MetaNetX before enriching it",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Fix the configuration file or the command line flags",
            EtlError::Parse { .. } | EtlError::InconsistentResponse { .. } => {
                "The remote data format may have changed; inspect the raw response"
            }
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                "Inspect the raw response for unexpected content"
            }
            EtlError::Molfile { .. } => "The structure is malformed and can be skipped",
            EtlError::Toolkit { .. } => "Check the Open Babel installation and its version",
            EtlError::MissingTool(_) => "Install Open Babel and make sure `obabel` is on PATH",
            EtlError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote database: {}", self),
            ErrorCategory::Database => format!("Database problem: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Toolkit => format!("Cheminformatics toolkit problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = EtlError::Parse {
            message: "two NAME lines".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = EtlError::NotFound {
            entity: "namespace".to_string(),
            key: "bigg.reaction".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Database);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = EtlError::MissingTool("obabel".to_string());
        let message = err.user_friendly_message();
        assert!(message.contains("obabel"));
        assert!(err.recovery_suggestion().contains("Open Babel"));
    }
}
