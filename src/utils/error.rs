use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Missing required upload: {input}")]
    MissingInputError { input: String },

    #[error("Could not read '{file}' as tabular data: {message}")]
    InputFormatError { file: String, message: String },

    #[error("Required column '{column}' not found in {table}")]
    MissingColumnError { column: String, table: String },

    #[error("Row {row}: column '{column}' value '{value}' does not match date format {expected}")]
    DateParseError {
        column: String,
        row: usize,
        value: String,
        expected: String,
    },

    #[error("Join key '{key}' not found in {table}")]
    JoinKeyError { key: String, table: String },

    #[error("Template rendering failed: {message}")]
    RenderError { message: String },

    #[error("Fixed-layout conversion of '{document}' failed: {message}")]
    ConversionError { document: String, message: String },

    #[error("Unknown workflow: {name}")]
    UnknownWorkflow { name: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Spreadsheet write error: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Output,
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

impl DocsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DocsError::MissingInputError { .. }
            | DocsError::InputFormatError { .. } => ErrorCategory::Input,
            DocsError::MissingColumnError { .. }
            | DocsError::DateParseError { .. }
            | DocsError::JoinKeyError { .. } => ErrorCategory::Data,
            DocsError::RenderError { .. }
            | DocsError::ConversionError { .. }
            | DocsError::ZipError(_)
            | DocsError::XlsxWriteError(_) => ErrorCategory::Output,
            DocsError::UnknownWorkflow { .. }
            | DocsError::ConfigValidationError { .. }
            | DocsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DocsError::IoError(_) | DocsError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // a missing upload is a warning, nothing was attempted
            DocsError::MissingInputError { .. } => ErrorSeverity::Low,
            DocsError::ConversionError { .. } => ErrorSeverity::Medium,
            DocsError::IoError(_) | DocsError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    /// Message shown to the operator. Never includes internal state beyond the
    /// failing file, column or value.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DocsError::MissingInputError { input } => {
                format!("Please upload the {} before generating.", input)
            }
            DocsError::InputFormatError { file, .. } => {
                format!("'{}' is not a readable spreadsheet.", file)
            }
            DocsError::MissingColumnError { column, table } => {
                format!("Error: '{}' column not found in {}.", column, table)
            }
            DocsError::JoinKeyError { key, table } => {
                format!("Error: '{}' column not found in {}.", key, table)
            }
            DocsError::UnknownWorkflow { name } => format!("'{}' is not a known module.", name),
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that every required file was supplied and is a valid .xlsx or .csv export.",
            ErrorCategory::Data => "Fix the spreadsheet columns or values named above and run again.",
            ErrorCategory::Output => "Check that the template placeholders match the module and that the converter is installed.",
            ErrorCategory::Configuration => "Review the configuration file and command line options.",
            ErrorCategory::System => "Check disk space and permissions of the output directory.",
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
