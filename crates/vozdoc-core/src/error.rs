use thiserror::Error;

/// Top-level error type for the VozDoc system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates construct
/// the variant that matches their concern so that the `?` operator works
/// seamlessly across crate boundaries. Nothing in the event-driven core ever
/// propagates one of these across a recognizer-callback boundary; failures
/// there are logged or turned into user-facing notifications at the point of
/// detection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VozdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech capability error: {0}")]
    Speech(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Dictation error: {0}")]
    Dictation(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for VozdocError {
    fn from(err: toml::de::Error) -> Self {
        VozdocError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VozdocError {
    fn from(err: toml::ser::Error) -> Self {
        VozdocError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VozdocError {
    fn from(err: serde_json::Error) -> Self {
        VozdocError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for VozDoc operations.
pub type Result<T> = std::result::Result<T, VozdocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VozdocError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VozdocError = io_err.into();
        assert!(matches!(err, VozdocError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: VozdocError = parse.unwrap_err().into();
        assert!(matches!(err, VozdocError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parse: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: VozdocError = parse.unwrap_err().into();
        assert!(matches!(err, VozdocError::Config(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
