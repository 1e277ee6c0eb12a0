//! Recognition-mode lifecycle manager.
//!
//! One manager exclusively owns one recognizer. Pages register named modes
//! up front and then only ever ask for transitions by name; the manager is
//! the single writer of the recognizer's session lifecycle.
//!
//! The engine's stop is cooperative: a requested switch or stop completes
//! only when the end event arrives, so the interesting logic lives in
//! [`RecognitionModeManager::handle_end`], which resolves what that end
//! means in strict priority order (pending switch, then manual stop, then
//! unsolicited drop with optional automatic restart).

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use vozdoc_core::error::{Result, VozdocError};
use vozdoc_core::types::{RecognitionErrorEvent, SpeechResultEvent};
use vozdoc_speech::recognizer::{Recognizer, StartError};

use crate::mode::{ModeDescriptor, ModeRequest};

pub struct RecognitionModeManager<R: Recognizer> {
    recognizer: R,
    modes: HashMap<String, Rc<ModeDescriptor>>,
    current: Option<Rc<ModeDescriptor>>,
    pending: Option<Rc<ModeDescriptor>>,
    manual_stop: bool,
    is_active: bool,
    /// The current mode's enter hook fired without a matching exit yet.
    mode_engaged: bool,
    auto_restart: bool,
}

impl<R: Recognizer> RecognitionModeManager<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            modes: HashMap::new(),
            current: None,
            pending: None,
            manual_stop: false,
            is_active: false,
            mode_engaged: false,
            auto_restart: true,
        }
    }

    pub fn set_auto_restart(&mut self, auto_restart: bool) {
        self.auto_restart = auto_restart;
    }

    /// Register a mode under its name. An empty name is a programming error
    /// and is rejected up front; re-registering a name replaces the mode.
    pub fn register(&mut self, mode: ModeDescriptor) -> Result<()> {
        if mode.name.is_empty() {
            return Err(VozdocError::Config("mode name must not be empty".to_string()));
        }
        debug!("registering mode '{}'", mode.name);
        self.modes.insert(mode.name.clone(), Rc::new(mode));
        Ok(())
    }

    /// Apply the named mode and start listening.
    pub fn start(&mut self, name: &str) -> Result<()> {
        let mode = self.resolve(name)?;
        info!("starting mode '{}'", name);
        self.manual_stop = false;
        self.apply(mode);
        self.safe_start();
        Ok(())
    }

    /// Transition to the named mode.
    ///
    /// Idempotent when that exact mode is already running. When nothing is
    /// running this is just [`start`](Self::start). Otherwise the mode is
    /// parked as pending (a later call overwrites it) and the recognizer is
    /// asked to stop; the switch completes on the next end event.
    pub fn switch_to(&mut self, name: &str) -> Result<()> {
        if self.is_active && self.current.as_ref().is_some_and(|m| m.name == name) {
            debug!("mode '{}' already active, ignoring switch", name);
            return Ok(());
        }
        if !self.is_active {
            return self.start(name);
        }

        let mode = self.resolve(name)?;
        debug!("queueing switch to mode '{}'", name);
        self.pending = Some(mode);
        self.manual_stop = false;
        self.recognizer.stop();
        Ok(())
    }

    /// Stop listening. A manual stop suppresses the automatic restart; when
    /// no session is live there is no end event coming, so the current
    /// mode's exit hook fires right here.
    pub fn stop(&mut self, manual: bool) {
        debug!("stop requested (manual: {})", manual);
        self.manual_stop = manual;
        self.pending = None;
        if self.is_active {
            self.recognizer.stop();
        } else if manual {
            self.fire_exit();
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_active
    }

    pub fn is_mode_active(&self, name: &str) -> bool {
        self.is_active && self.current.as_ref().is_some_and(|m| m.name == name)
    }

    /// Name of the current mode. Retained across a manual stop, so a page
    /// can ask where it left off before restarting.
    pub fn active_mode_name(&self) -> Option<&str> {
        self.current.as_deref().map(|m| m.name.as_str())
    }

    // ------------------------------------------------------------------
    // Event intake. The host event pump calls these; they never fail,
    // they log.
    // ------------------------------------------------------------------

    /// A recognition session actually began.
    pub fn handle_start(&mut self) {
        self.is_active = true;
        if let Some(mode) = self.current.clone() {
            debug!("session started in mode '{}'", mode.name);
            mode.handler.on_start();
        }
    }

    /// Result batch from the engine.
    pub fn handle_result(&mut self, event: &SpeechResultEvent) {
        let request = self
            .current
            .clone()
            .and_then(|mode| mode.handler.on_result(event));
        if let Some(request) = request {
            self.execute(request);
        }
    }

    /// Engine error. The session stays live until its end event arrives, so
    /// the active flag is untouched here.
    pub fn handle_error(&mut self, event: &RecognitionErrorEvent) {
        warn!("recognition error: {:?}", event.kind);
        let request = self
            .current
            .clone()
            .and_then(|mode| mode.handler.on_error(event));
        if let Some(request) = request {
            self.execute(request);
        }
    }

    /// The session ended. Resolution order is a contract: a pending switch
    /// beats a manual stop beats the unsolicited-end handling, where the
    /// exit hook's returned request beats the automatic restart.
    pub fn handle_end(&mut self) {
        self.is_active = false;

        if let Some(next) = self.pending.take() {
            debug!("session ended, completing switch to '{}'", next.name);
            self.fire_exit();
            self.manual_stop = false;
            self.apply(next);
            self.safe_start();
            return;
        }

        if self.manual_stop {
            debug!("session ended after manual stop");
            self.manual_stop = false;
            // The mode stays current so the page can resume it later.
            self.fire_exit();
            return;
        }

        // Unsolicited end (silence timeout, engine hiccup). The mode stays
        // current; restart unless its hook asks for something else.
        let Some(mode) = self.current.clone() else {
            return;
        };
        debug!("session in mode '{}' ended unsolicited", mode.name);
        if let Some(request) = mode.handler.on_end() {
            self.execute(request);
        } else if self.auto_restart {
            self.safe_start();
        }
    }

    // ------------------------------------------------------------------

    fn resolve(&self, name: &str) -> Result<Rc<ModeDescriptor>> {
        self.modes
            .get(name)
            .cloned()
            .ok_or_else(|| VozdocError::Config(format!("unknown recognition mode '{name}'")))
    }

    fn apply(&mut self, mode: Rc<ModeDescriptor>) {
        self.recognizer.set_continuous(mode.continuous);
        self.recognizer.set_interim_results(mode.interim_results);
        self.current = Some(mode.clone());
        self.mode_engaged = true;
        mode.handler.on_enter();
    }

    /// Fire the current mode's exit hook at most once per enter.
    fn fire_exit(&mut self) {
        if !self.mode_engaged {
            return;
        }
        self.mode_engaged = false;
        if let Some(mode) = self.current.clone() {
            mode.handler.on_exit();
        }
    }

    fn execute(&mut self, request: ModeRequest) {
        match request {
            ModeRequest::SwitchTo(name) => {
                if let Err(err) = self.switch_to(&name) {
                    warn!("mode request failed: {err}");
                }
            }
            ModeRequest::Stop { manual } => self.stop(manual),
        }
    }

    /// Start the recognizer, tolerating the already-started race that rapid
    /// switching produces.
    fn safe_start(&mut self) {
        match self.recognizer.start() {
            Ok(()) => {}
            Err(StartError::AlreadyStarted) => {
                debug!("recognizer already started, ignoring");
            }
            Err(StartError::Engine(message)) => {
                warn!("recognizer failed to start: {message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use vozdoc_core::types::RecognitionErrorKind;

    use super::*;
    use crate::mode::ModeHandler;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct StubRecognizer {
        log: Log,
        fail_next_start: RefCell<Option<StartError>>,
    }

    impl StubRecognizer {
        fn with_log(log: Log) -> Self {
            Self {
                log,
                fail_next_start: RefCell::new(None),
            }
        }
    }

    impl Recognizer for StubRecognizer {
        fn set_continuous(&mut self, continuous: bool) {
            self.log.borrow_mut().push(format!("continuous={continuous}"));
        }

        fn set_interim_results(&mut self, interim_results: bool) {
            self.log.borrow_mut().push(format!("interim={interim_results}"));
        }

        fn start(&mut self) -> std::result::Result<(), StartError> {
            if let Some(err) = self.fail_next_start.borrow_mut().take() {
                self.log.borrow_mut().push("start-failed".to_string());
                return Err(err);
            }
            self.log.borrow_mut().push("start".to_string());
            Ok(())
        }

        fn stop(&mut self) {
            self.log.borrow_mut().push("stop".to_string());
        }
    }

    struct LoggingHandler {
        name: &'static str,
        log: Log,
        end_request: RefCell<Option<ModeRequest>>,
        error_request: RefCell<Option<ModeRequest>>,
    }

    impl LoggingHandler {
        fn new(name: &'static str, log: Log) -> Self {
            Self {
                name,
                log,
                end_request: RefCell::new(None),
                error_request: RefCell::new(None),
            }
        }
    }

    impl ModeHandler for LoggingHandler {
        fn on_enter(&self) {
            self.log.borrow_mut().push(format!("{}:enter", self.name));
        }
        fn on_start(&self) {
            self.log.borrow_mut().push(format!("{}:start", self.name));
        }
        fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
            let text = event
                .segments
                .first()
                .map(|s| s.transcript.clone())
                .unwrap_or_default();
            self.log.borrow_mut().push(format!("{}:result:{}", self.name, text));
            None
        }
        fn on_error(&self, _event: &RecognitionErrorEvent) -> Option<ModeRequest> {
            self.log.borrow_mut().push(format!("{}:error", self.name));
            self.error_request.borrow_mut().take()
        }
        fn on_end(&self) -> Option<ModeRequest> {
            self.log.borrow_mut().push(format!("{}:end", self.name));
            self.end_request.borrow_mut().take()
        }
        fn on_exit(&self) {
            self.log.borrow_mut().push(format!("{}:exit", self.name));
        }
    }

    fn manager_with_modes(
        log: &Log,
        handlers: Vec<(&'static str, Rc<LoggingHandler>)>,
    ) -> RecognitionModeManager<StubRecognizer> {
        let mut manager = RecognitionModeManager::new(StubRecognizer::with_log(log.clone()));
        for (name, handler) in handlers {
            manager
                .register(ModeDescriptor::new(name, name == "dictation", name == "dictation", handler))
                .unwrap();
        }
        manager
    }

    fn drain(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let log: Log = Rc::default();
        let mut manager = RecognitionModeManager::new(StubRecognizer::with_log(log.clone()));
        let handler = Rc::new(LoggingHandler::new("x", log));
        let err = manager
            .register(ModeDescriptor::new("", false, false, handler))
            .unwrap_err();
        assert!(matches!(err, VozdocError::Config(_)));
    }

    #[test]
    fn test_start_unknown_mode_fails() {
        let log: Log = Rc::default();
        let mut manager = manager_with_modes(&log, vec![]);
        assert!(manager.start("command").is_err());
    }

    #[test]
    fn test_start_applies_mode_and_starts() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        assert_eq!(
            drain(&log),
            vec!["continuous=false", "interim=false", "command:enter", "start"]
        );

        manager.handle_start();
        assert!(manager.is_running());
        assert!(manager.is_mode_active("command"));
        assert_eq!(drain(&log), vec!["command:start"]);
    }

    #[test]
    fn test_switch_when_inactive_behaves_like_start() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("dictation", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("dictation", handler)]);

        manager.switch_to("dictation").unwrap();
        assert_eq!(
            drain(&log),
            vec!["continuous=true", "interim=true", "dictation:enter", "start"]
        );
    }

    #[test]
    fn test_switch_of_running_mode_is_idempotent() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        manager.switch_to("command").unwrap();
        assert!(drain(&log).is_empty());
        assert!(manager.is_running());
    }

    #[test]
    fn test_switch_completes_on_end_with_single_exit() {
        let log: Log = Rc::default();
        let command = Rc::new(LoggingHandler::new("command", log.clone()));
        let dictation = Rc::new(LoggingHandler::new("dictation", log.clone()));
        let mut manager =
            manager_with_modes(&log, vec![("command", command), ("dictation", dictation)]);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        manager.switch_to("dictation").unwrap();
        assert_eq!(drain(&log), vec!["stop"]);
        assert!(manager.is_mode_active("command"));

        manager.handle_end();
        assert_eq!(
            drain(&log),
            vec![
                "command:exit",
                "continuous=true",
                "interim=true",
                "dictation:enter",
                "start"
            ]
        );
    }

    #[test]
    fn test_pending_switch_beats_manual_stop() {
        let log: Log = Rc::default();
        let command = Rc::new(LoggingHandler::new("command", log.clone()));
        let dictation = Rc::new(LoggingHandler::new("dictation", log.clone()));
        let mut manager =
            manager_with_modes(&log, vec![("command", command), ("dictation", dictation)]);

        manager.start("command").unwrap();
        manager.handle_start();
        manager.stop(true);
        manager.switch_to("dictation").unwrap();
        drain(&log);

        manager.handle_end();
        let events = drain(&log);
        assert!(events.contains(&"dictation:enter".to_string()));
        assert!(events.contains(&"start".to_string()));
    }

    #[test]
    fn test_manual_stop_suppresses_restart() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        manager.handle_start();
        manager.stop(true);
        drain(&log);

        manager.handle_end();
        assert_eq!(drain(&log), vec!["command:exit"]);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_manual_stop_retains_mode_without_double_exit() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        manager.handle_start();
        manager.stop(true);
        drain(&log);

        manager.handle_end();
        assert_eq!(drain(&log), vec!["command:exit"]);
        assert_eq!(manager.active_mode_name(), Some("command"));

        // A repeated stop finds the exit hook already fired.
        manager.stop(true);
        assert!(drain(&log).is_empty());
    }

    #[test]
    fn test_unsolicited_end_restarts_without_enter_or_exit() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        manager.handle_end();
        assert_eq!(drain(&log), vec!["command:end", "start"]);
    }

    #[test]
    fn test_auto_restart_disabled() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);
        manager.set_auto_restart(false);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        manager.handle_end();
        assert_eq!(drain(&log), vec!["command:end"]);
    }

    #[test]
    fn test_on_end_request_overrides_restart() {
        let log: Log = Rc::default();
        let command = Rc::new(LoggingHandler::new("command", log.clone()));
        let dictation = Rc::new(LoggingHandler::new("dictation", log.clone()));
        *command.end_request.borrow_mut() = Some(ModeRequest::SwitchTo("dictation".to_string()));
        let mut manager =
            manager_with_modes(&log, vec![("command", command), ("dictation", dictation)]);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        // Inactive at this point, so the switch applies immediately.
        manager.handle_end();
        let events = drain(&log);
        assert_eq!(events[0], "command:end");
        assert!(events.contains(&"dictation:enter".to_string()));
        assert_eq!(events.iter().filter(|e| *e == "start").count(), 1);
    }

    #[test]
    fn test_error_request_manual_stop_blocks_restart() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("listen", log.clone()));
        *handler.error_request.borrow_mut() = Some(ModeRequest::Stop { manual: true });
        let mut manager = manager_with_modes(&log, vec![("listen", handler)]);

        manager.start("listen").unwrap();
        manager.handle_start();
        drain(&log);

        let event = RecognitionErrorEvent {
            kind: RecognitionErrorKind::NotAllowed,
        };
        manager.handle_error(&event);
        assert_eq!(drain(&log), vec!["listen:error", "stop"]);

        manager.handle_end();
        assert_eq!(drain(&log), vec!["listen:exit"]);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_manual_stop_while_inactive_exits_immediately() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        drain(&log);

        // No session ever became active; the exit hook cannot wait for an
        // end event that will not come.
        manager.stop(true);
        assert_eq!(drain(&log), vec!["command:exit"]);
    }

    #[test]
    fn test_safe_start_swallows_already_started() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let recognizer = StubRecognizer::with_log(log.clone());
        *recognizer.fail_next_start.borrow_mut() = Some(StartError::AlreadyStarted);
        let mut manager = RecognitionModeManager::new(recognizer);
        manager
            .register(ModeDescriptor::new("command", false, false, handler))
            .unwrap();

        assert!(manager.start("command").is_ok());
        let events = drain(&log);
        assert!(events.contains(&"start-failed".to_string()));
    }

    #[test]
    fn test_result_forwarded_to_current_mode() {
        let log: Log = Rc::default();
        let handler = Rc::new(LoggingHandler::new("command", log.clone()));
        let mut manager = manager_with_modes(&log, vec![("command", handler)]);

        manager.start("command").unwrap();
        manager.handle_start();
        drain(&log);

        manager.handle_result(&SpeechResultEvent::single_final("crear documento"));
        assert_eq!(drain(&log), vec!["command:result:crear documento"]);
    }
}
