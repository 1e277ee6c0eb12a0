//! Fire-and-forget text-to-speech adapter.
//!
//! Newer speech always preempts older: `speak` cancels any pending
//! utterance synchronously before queueing the new one. Completion is never
//! awaited; the engine plays in the background.

use tracing::debug;

use vozdoc_core::error::{Result, VozdocError};

/// A queued utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
}

/// The host synthesis engine consumed by the adapter.
pub trait SynthesisEngine {
    /// Cancel whatever is queued or playing. Immediate and synchronous.
    fn cancel(&mut self);

    /// Queue an utterance for playback.
    fn enqueue(&mut self, utterance: Utterance);
}

/// Adapter over an optional host synthesis engine.
///
/// Built without an engine on hosts lacking synthesis capability; `speak`
/// then fails with a capability error the caller surfaces to the user.
pub struct SpeechSynthesisAdapter {
    lang: String,
    engine: Option<Box<dyn SynthesisEngine>>,
}

impl SpeechSynthesisAdapter {
    pub fn new(lang: impl Into<String>, engine: Box<dyn SynthesisEngine>) -> Self {
        Self {
            lang: lang.into(),
            engine: Some(engine),
        }
    }

    /// Adapter for hosts without synthesis capability.
    pub fn unsupported(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            engine: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Cancel any pending utterance and queue `text`.
    ///
    /// Empty text is a silent no-op. Fails when the host lacks synthesis
    /// capability.
    pub fn speak(&mut self, text: &str) -> Result<()> {
        let lang = self.lang.clone();
        let engine = self.engine.as_mut().ok_or_else(|| {
            VozdocError::Speech("speech synthesis is not available on this host".to_string())
        })?;

        if text.is_empty() {
            return Ok(());
        }

        debug!("queueing utterance of {} chars", text.len());
        engine.cancel();
        engine.enqueue(Utterance {
            text: text.to_string(),
            lang,
        });
        Ok(())
    }

    /// Cancel playback outright. No-op without an engine.
    pub fn stop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel();
        }
    }
}
