use thiserror::Error;

/// Errors raised while writing request bodies.
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Serialization error: {0}")]
    SerializeError(String),
}

impl From<quick_xml::Error> for RfcError {
    fn from(err: quick_xml::Error) -> Self {
        Self::SerializeError(err.to_string())
    }
}

// `Writer::write_event` reports I/O errors directly.
impl From<std::io::Error> for RfcError {
    fn from(err: std::io::Error) -> Self {
        Self::SerializeError(err.to_string())
    }
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
