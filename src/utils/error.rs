use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Input file '{path}' could not be parsed: {message}")]
    InputUnparseable { path: String, message: String },

    #[error("Required column '{column}' is missing (available: {available})")]
    MissingColumn { column: String, available: String },

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
    Input,
    Data,
    Configuration,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SalesError {
    pub fn processing(message: impl Into<String>) -> Self {
        SalesError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SalesError::InputNotFound { .. } | SalesError::InputUnparseable { .. } => {
                ErrorCategory::Input
            }
            SalesError::MissingColumn { .. }
            | SalesError::CsvError(_)
            | SalesError::ProcessingError { .. } => ErrorCategory::Data,
            SalesError::ConfigError { .. }
            | SalesError::ConfigValidationError { .. }
            | SalesError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SalesError::IoError(_) => ErrorCategory::Io,
            SalesError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SalesError::InputNotFound { path } => {
                format!("Place the sales CSV at '{}' or pass --data-path", path)
            }
            SalesError::InputUnparseable { .. } => {
                "Check that the file is a delimited text file with a header row and that the delimiter setting matches".to_string()
            }
            SalesError::MissingColumn { column, .. } => format!(
                "Add a '{}' column to the dataset or map the column name in the [columns] config section",
                column
            ),
            SalesError::CsvError(_) => "Check the CSV file for malformed rows".to_string(),
            SalesError::IoError(_) => {
                "Check file permissions and free disk space for the output directories".to_string()
            }
            SalesError::SerializationError(_) => {
                "Disable the json output format and rerun".to_string()
            }
            SalesError::ConfigError { .. }
            | SalesError::ConfigValidationError { .. }
            | SalesError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line arguments".to_string()
            }
            SalesError::ProcessingError { .. } => {
                "Inspect the dataset for columns without any observed values".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SalesError::InputNotFound { path } => format!("CSV file not found at {}", path),
            SalesError::InputUnparseable { path, message } => {
                format!("Error loading data from {}: {}", path, message)
            }
            SalesError::MissingColumn { column, .. } => {
                format!("The dataset has no '{}' column", column)
            }
            other => other.to_string(),
        }
    }

    /// 載入階段的錯誤：執行應在此停止
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            SalesError::InputNotFound { .. }
                | SalesError::InputUnparseable { .. }
                | SalesError::MissingColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SalesError>;
