use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Directory listing unavailable at {url}: {reason}")]
    DirectoryUnavailable { url: String, reason: String },

    #[error("No usable statistics for layer {layer_url}: {reason}")]
    ExtentUnavailable { layer_url: String, reason: String },

    #[error("Unparseable date value {value:?}: {reason}")]
    ExtentParseError { value: String, reason: String },

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

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

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
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScraperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScraperError::DirectoryUnavailable { .. }
            | ScraperError::ExtentUnavailable { .. }
            | ScraperError::ApiError(_) => ErrorCategory::Network,
            ScraperError::ExtentParseError { .. }
            | ScraperError::CsvError(_)
            | ScraperError::SerializationError(_)
            | ScraperError::ProcessingError { .. } => ErrorCategory::Data,
            ScraperError::ConfigError { .. }
            | ScraperError::ConfigValidationError { .. }
            | ScraperError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ScraperError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一圖層的日期範圍失敗只會降級為空範圍
            ScraperError::ExtentUnavailable { .. } | ScraperError::ExtentParseError { .. } => {
                ErrorSeverity::Low
            }
            ScraperError::ApiError(_) | ScraperError::ProcessingError { .. } => {
                ErrorSeverity::Medium
            }
            ScraperError::DirectoryUnavailable { .. }
            | ScraperError::CsvError(_)
            | ScraperError::SerializationError(_)
            | ScraperError::ConfigError { .. }
            | ScraperError::ConfigValidationError { .. }
            | ScraperError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ScraperError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the feature server is reachable and that base_url and folder are correct"
            }
            ErrorCategory::Data => {
                "The server returned data in an unexpected shape; inspect the layer's query endpoint"
            }
            ErrorCategory::Configuration => {
                "Review the configuration file or command line arguments"
            }
            ErrorCategory::System => "Check file permissions and free disk space for the output path",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScraperError::DirectoryUnavailable { url, .. } => {
                format!("Could not list services or layers at {}", url)
            }
            ScraperError::ExtentUnavailable { layer_url, .. } => {
                format!("Could not determine the date range of {}", layer_url)
            }
            ScraperError::ExtentParseError { value, .. } => {
                format!("Unexpected date format: {}", value)
            }
            ScraperError::ApiError(_) => "A request to the feature server failed".to_string(),
            ScraperError::IoError(_) => "Could not read or write output files".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
