//! Boundary traits for the host's speech capabilities.
//!
//! The recognition and synthesis engines are external, asynchronous event
//! sources; this crate defines the contracts the core components consume
//! (a recognizer handle, a factory with a capability probe, a fire-and-forget
//! synthesis adapter) and the feedback channel through which user-facing
//! notifications flow.

pub mod feedback;
pub mod recognizer;
pub mod synthesis;

pub use feedback::{FeedbackChannel, NullFeedback, ToastVariant};
pub use recognizer::{RecognitionFactory, Recognizer, RecognizerOptions, StartError, UnsupportedFactory};
pub use synthesis::{SpeechSynthesisAdapter, SynthesisEngine, Utterance};
