use thiserror::Error;

/// Main error type for transform operations
#[derive(Error, Debug)]
pub enum TransformError {
    /// A required value was absent at construction (entity type, entity value, field name)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the object's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Argument count or progress percentage outside its allowed range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Malformed field-pack segment, weight or matching rule token
    #[error("Format error: {0}")]
    Format(String),

    /// Response document is malformed or lacks a required element
    #[error("Structure error: {0}")]
    Structure(String),

    /// Low-level XML writer/reader errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O errors from the signal channel or the XML writer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoded output was not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Convenient Result type using TransformError
pub type Result<T> = std::result::Result<T, TransformError>;
