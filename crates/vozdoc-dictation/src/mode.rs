//! Mode descriptors and behavior hooks.

use std::fmt;
use std::rc::Rc;

use vozdoc_core::types::{RecognitionErrorEvent, SpeechResultEvent};

/// Effect a mode hook asks the manager to execute after the hook returns.
///
/// Hooks never call back into the manager; re-entrant transitions were the
/// main source of subtle ordering bugs this design removes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeRequest {
    /// Queue a switch to the named mode.
    SwitchTo(String),
    /// Stop listening; `manual` suppresses the automatic restart.
    Stop { manual: bool },
}

/// Behavior of one recognition mode.
///
/// Every hook has an empty default so simple modes implement only what they
/// observe. `on_result`, `on_error` and `on_end` may return a request; the
/// manager executes it once the hook is off the stack.
pub trait ModeHandler {
    /// The mode has been applied to the recognizer, before starting.
    fn on_enter(&self) {}

    /// A recognition session actually began.
    fn on_start(&self) {}

    /// A batch of interim/final results arrived.
    fn on_result(&self, _event: &SpeechResultEvent) -> Option<ModeRequest> {
        None
    }

    /// The engine reported an error. The session is still considered live
    /// until its end event arrives.
    fn on_error(&self, _event: &RecognitionErrorEvent) -> Option<ModeRequest> {
        None
    }

    /// The session ended without a pending switch or manual stop. A returned
    /// request overrides the automatic restart.
    fn on_end(&self) -> Option<ModeRequest> {
        None
    }

    /// The mode is being left, either for another mode or for silence.
    fn on_exit(&self) {}
}

/// Immutable description of a registered mode.
///
/// `continuous` and `interim_results` are copied onto the recognizer every
/// time the mode is applied.
#[derive(Clone)]
pub struct ModeDescriptor {
    pub name: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub handler: Rc<dyn ModeHandler>,
}

impl ModeDescriptor {
    pub fn new(
        name: impl Into<String>,
        continuous: bool,
        interim_results: bool,
        handler: Rc<dyn ModeHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            continuous,
            interim_results,
            handler,
        }
    }
}

impl fmt::Debug for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeDescriptor")
            .field("name", &self.name)
            .field("continuous", &self.continuous)
            .field("interim_results", &self.interim_results)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl ModeHandler for Silent {}

    #[test]
    fn test_default_hooks_return_no_request() {
        let handler = Silent;
        assert_eq!(handler.on_result(&SpeechResultEvent::single_final("hola")), None);
        assert_eq!(handler.on_end(), None);
    }

    #[test]
    fn test_descriptor_debug_omits_handler() {
        let mode = ModeDescriptor::new("command", false, false, Rc::new(Silent));
        let rendered = format!("{:?}", mode);
        assert!(rendered.contains("command"));
        assert!(!rendered.contains("handler"));
    }
}
