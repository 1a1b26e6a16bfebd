use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(mailcal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(mailcal::config))]
    Config(String),

    #[error("Extraction error: {0}")]
    #[diagnostic(code(mailcal::extraction))]
    Extraction(String),

    #[error("Extracted text is not a JSON array: {0}")]
    #[diagnostic(
        code(mailcal::extraction_parse),
        help("the whole batch is dropped, nothing is sent for this message")
    )]
    ExtractionParse(String),

    #[error("Invalid date/time field: {0}")]
    #[diagnostic(code(mailcal::field_format))]
    FieldFormat(String),

    #[error("Mail transport error: {0}")]
    #[diagnostic(code(mailcal::transport))]
    Transport(String),

    #[error(transparent)]
    #[diagnostic(code(mailcal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(mailcal::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(mailcal::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type MailcalResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create extraction errors
pub fn extraction_error(message: &str) -> Error {
    Error::Extraction(message.to_string())
}

/// Helper to create date/time field errors
pub fn field_format_error(message: &str) -> Error {
    Error::FieldFormat(message.to_string())
}

/// Helper to create transport errors
pub fn transport_error(message: &str) -> Error {
    Error::Transport(message.to_string())
}
