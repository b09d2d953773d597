use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Cannot read {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema error in {path}: {message}")]
    SchemaError { path: String, message: String },

    #[error("Catalog {path} is not valid JSON: {source}")]
    MalformedCatalog {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write {path}: {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Schema,
    Output,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SourceUnavailable { .. } | EtlError::MalformedCatalog { .. } => {
                ErrorCategory::Input
            }
            EtlError::SchemaError { .. } => ErrorCategory::Schema,
            EtlError::WriteFailure { .. } => ErrorCategory::Output,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Schema => ErrorSeverity::High,
            ErrorCategory::Output | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for this error. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SourceUnavailable { path, .. } => {
                format!("Input file '{}' could not be read", path)
            }
            EtlError::SchemaError { path, message } => {
                format!("'{}' does not have the expected structure: {}", path, message)
            }
            EtlError::MalformedCatalog { path, source } => format!(
                "Catalog '{}' is not valid JSON (line {}, column {})",
                path,
                source.line(),
                source.column()
            ),
            EtlError::WriteFailure { path, .. } => {
                format!("Output file '{}' could not be written", path)
            }
            EtlError::SerializationError(e) => format!("Catalog could not be serialized: {}", e),
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::SourceUnavailable { .. } => {
                "Check that the path exists and is readable by the current user"
            }
            EtlError::SchemaError { .. } => {
                "The mapping file needs 'KBOB REF' and 'Hatching Pattern' columns and the catalog a top-level 'products' object"
            }
            EtlError::MalformedCatalog { .. } => "Validate the catalog with a JSON linter",
            EtlError::WriteFailure { .. } => {
                "Check that the output directory exists or can be created and is writable"
            }
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::MissingConfigError { .. } => {
                "Pass the value as a flag, an environment variable or in the --config file"
            }
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
