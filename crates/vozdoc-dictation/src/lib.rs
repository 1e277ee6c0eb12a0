//! Recognition-mode lifecycle and dictation transcript processing.
//!
//! The centerpiece is [`RecognitionModeManager`], an explicit state machine
//! over one exclusively-owned recognizer: pages register named modes and the
//! manager sequences mode switches, manual stops and automatic restarts off
//! the engine's asynchronous end events. Mode behavior hooks return effect
//! requests instead of calling back into the manager, which keeps every
//! transition decision in one place.
//!
//! On top of that sits the dictation engine: [`DictationBuffer`] holds the
//! composed text as a typed span list with an open-style stack and bounded
//! undo history, and [`DictationTranscriptProcessor`] turns raw recognition
//! events into buffer mutations, inline command effects and preview updates.

pub mod buffer;
pub mod manager;
pub mod mode;
pub mod transcript;

pub use buffer::{DictationBuffer, RenderStyle, Span, StyleTag};
pub use manager::RecognitionModeManager;
pub use mode::{ModeDescriptor, ModeHandler, ModeRequest};
pub use transcript::{
    Alignment, ControlOutcome, DictationContext, DictationOptions, DictationTranscriptProcessor,
    EditorSurface, LayoutControls, NoLayout, PassthroughCommand, ProcessOutcome,
};
