//! Recognizer handle and factory contracts.
//!
//! Exactly one recognizer instance exists per page, exclusively owned by its
//! mode manager; no other component may call `start`/`stop` on the raw
//! handle. The engine's stop/start lifecycle is asynchronous: `stop()` only
//! requests termination, and the session actually ends when the host pumps
//! an end event.

use thiserror::Error;

use vozdoc_core::error::{Result, VozdocError};

/// Options applied when constructing a recognizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognizerOptions {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            lang: "es-ES".to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Error raised by [`Recognizer::start`].
///
/// `AlreadyStarted` is an expected race under rapid mode switching (the
/// prior session's end has not been observed yet) and is swallowed by
/// callers; anything else is an engine fault worth logging.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("recognizer already started")]
    AlreadyStarted,

    #[error("recognition engine error: {0}")]
    Engine(String),
}

/// Handle to one underlying recognition engine instance.
///
/// `continuous` and `interim_results` are mutable session properties; the
/// mode manager rewrites them on every mode application before restarting.
pub trait Recognizer {
    fn set_continuous(&mut self, continuous: bool);
    fn set_interim_results(&mut self, interim_results: bool);

    /// Request a new recognition session. May fail with
    /// [`StartError::AlreadyStarted`] while a previous session is still
    /// winding down.
    fn start(&mut self) -> std::result::Result<(), StartError>;

    /// Request cooperative termination of the in-flight session. The
    /// session ends only when the engine's end event is delivered.
    fn stop(&mut self);
}

/// Constructs recognizer instances and probes host capability.
pub trait RecognitionFactory {
    /// Whether the host exposes a speech-recognition engine at all.
    fn is_supported(&self) -> bool;

    /// Build a recognizer configured with the given options.
    ///
    /// Fails with [`VozdocError::Speech`] when the host has no recognition
    /// capability; callers surface that as a blocking notice and disable
    /// the voice controls rather than crash.
    fn create(&self, options: RecognizerOptions) -> Result<Box<dyn Recognizer>>;
}

/// Factory for hosts without any recognition engine.
///
/// Lets pages run the capability-absence path (controls disabled, feature
/// degraded) without conditional wiring.
#[derive(Debug, Default)]
pub struct UnsupportedFactory;

impl RecognitionFactory for UnsupportedFactory {
    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self, _options: RecognizerOptions) -> Result<Box<dyn Recognizer>> {
        Err(VozdocError::Speech(
            "speech recognition is not available on this host".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RecognizerOptions::default();
        assert_eq!(options.lang, "es-ES");
        assert!(!options.continuous);
        assert!(!options.interim_results);
    }

    #[test]
    fn test_unsupported_factory() {
        let factory = UnsupportedFactory;
        assert!(!factory.is_supported());
        let err = match factory.create(RecognizerOptions::default()) {
            Err(err) => err,
            Ok(_) => panic!("expected create to fail"),
        };
        assert!(matches!(err, VozdocError::Speech(_)));
    }

    #[test]
    fn test_start_error_display() {
        assert_eq!(
            StartError::AlreadyStarted.to_string(),
            "recognizer already started"
        );
        assert!(StartError::Engine("boom".into()).to_string().contains("boom"));
    }
}
