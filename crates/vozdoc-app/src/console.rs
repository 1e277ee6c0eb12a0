//! Console recognition backend and page runners.
//!
//! Stands in for a real speech engine: every stdin line is delivered as one
//! final recognition result, and session lifecycle transitions are queued
//! on a shared handle so the page loop can pump them into the manager in
//! order. The manager cannot tell it apart from a live engine.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::BufRead;
use std::rc::Rc;

use tracing::info;

use vozdoc_core::config::VozdocConfig;
use vozdoc_core::error::Result;
use vozdoc_core::types::{RecognitionErrorEvent, SpeechResultEvent};
use vozdoc_dictation::manager::RecognitionModeManager;
use vozdoc_dictation::mode::{ModeDescriptor, ModeHandler, ModeRequest};
use vozdoc_speech::feedback::FeedbackChannel;
use vozdoc_speech::recognizer::{Recognizer, StartError};
use vozdoc_speech::synthesis::SpeechSynthesisAdapter;
use vozdoc_storage::{DocumentStore, DraftStore};

use crate::controllers::{
    DashboardController, DocumentController, MailController, Page, MODE_COMMAND,
    MODE_DICTATE_RECIPIENT, MODE_DICTATE_SUBJECT, MODE_DICTATION, MODE_LISTENING,
};
use crate::export::WordFileExporter;
use crate::surfaces::TracingFeedback;

/// Session transition queued by the recognizer for the event pump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Started,
    Ended,
}

#[derive(Debug, Default)]
struct ConsoleState {
    continuous: bool,
    running: bool,
    transitions: VecDeque<Transition>,
}

/// Recognizer over shared state; clones observe the same session.
#[derive(Clone, Default)]
pub struct ConsoleRecognizer {
    state: Rc<RefCell<ConsoleState>>,
}

impl ConsoleRecognizer {
    /// Queued lifecycle transitions since the last call.
    pub fn take_transitions(&self) -> Vec<Transition> {
        self.state.borrow_mut().transitions.drain(..).collect()
    }

    pub fn is_continuous(&self) -> bool {
        self.state.borrow().continuous
    }

    /// Emulate the engine ending the session (silence timeout, or the end
    /// of a single-utterance session).
    pub fn end_session(&self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.running = false;
            state.transitions.push_back(Transition::Ended);
        }
    }
}

impl Recognizer for ConsoleRecognizer {
    fn set_continuous(&mut self, continuous: bool) {
        self.state.borrow_mut().continuous = continuous;
    }

    fn set_interim_results(&mut self, _interim_results: bool) {
        // The console only produces final results.
    }

    fn start(&mut self) -> std::result::Result<(), StartError> {
        let mut state = self.state.borrow_mut();
        if state.running {
            return Err(StartError::AlreadyStarted);
        }
        state.running = true;
        state.transitions.push_back(Transition::Started);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.running = false;
            state.transitions.push_back(Transition::Ended);
        }
    }
}

/// Deliver queued session transitions to the manager in order.
fn pump(manager: &mut RecognitionModeManager<ConsoleRecognizer>, handle: &ConsoleRecognizer) {
    for transition in handle.take_transitions() {
        match transition {
            Transition::Started => manager.handle_start(),
            Transition::Ended => manager.handle_end(),
        }
    }
}

/// Feed one line as a final utterance, ending the session afterwards for
/// non-continuous modes the way a single-shot engine would.
fn feed_line(
    manager: &mut RecognitionModeManager<ConsoleRecognizer>,
    handle: &ConsoleRecognizer,
    line: &str,
) {
    manager.handle_result(&SpeechResultEvent::single_final(line));
    if !handle.is_continuous() {
        handle.end_session();
    }
    pump(manager, handle);
}

fn final_transcript(event: &SpeechResultEvent) -> Option<String> {
    let text: String = event
        .new_segments()
        .iter()
        .filter(|s| s.is_final)
        .map(|s| s.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ----------------------------------------------------------------------
// Mode handler shims over the page controllers.
// ----------------------------------------------------------------------

struct DashboardMode<F: FeedbackChannel> {
    controller: Rc<RefCell<DashboardController<F>>>,
}

impl<F: FeedbackChannel> ModeHandler for DashboardMode<F> {
    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let utterance = final_transcript(event)?;
        self.controller.borrow_mut().handle_command(&utterance)
    }

    fn on_error(&self, event: &RecognitionErrorEvent) -> Option<ModeRequest> {
        self.controller.borrow_mut().handle_error(event)
    }
}

type SharedDocument = Rc<RefCell<DocumentController<TracingFeedback, WordFileExporter>>>;

struct DocumentCommandMode {
    controller: SharedDocument,
}

impl ModeHandler for DocumentCommandMode {
    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let utterance = final_transcript(event)?;
        self.controller.borrow_mut().handle_command(&utterance)
    }
}

struct DocumentDictationMode {
    controller: SharedDocument,
}

impl ModeHandler for DocumentDictationMode {
    fn on_enter(&self) {
        self.controller.borrow_mut().enter_dictation();
    }

    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        self.controller.borrow_mut().handle_dictation_event(event)
    }

    fn on_exit(&self) {
        self.controller.borrow_mut().exit_dictation();
    }
}

type SharedMail = Rc<RefCell<MailController<TracingFeedback>>>;

struct MailCommandMode {
    controller: SharedMail,
}

impl ModeHandler for MailCommandMode {
    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let utterance = final_transcript(event)?;
        self.controller.borrow_mut().handle_command(&utterance)
    }
}

struct MailDictationMode {
    controller: SharedMail,
}

impl ModeHandler for MailDictationMode {
    fn on_enter(&self) {
        self.controller.borrow_mut().enter_dictation();
    }

    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        self.controller.borrow_mut().handle_dictation_event(event)
    }

    fn on_exit(&self) {
        self.controller.borrow_mut().exit_dictation();
    }
}

/// Single-shot field capture: the first final result fills the field and
/// hands control back; a silent end gives up and returns too.
struct FieldCaptureMode {
    controller: SharedMail,
    subject: bool,
}

impl ModeHandler for FieldCaptureMode {
    fn on_result(&self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let utterance = final_transcript(event)?;
        let mut controller = self.controller.borrow_mut();
        if self.subject {
            controller.handle_subject(&utterance)
        } else {
            controller.handle_recipient(&utterance)
        }
    }

    fn on_end(&self) -> Option<ModeRequest> {
        Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()))
    }
}

// ----------------------------------------------------------------------
// Page loops.
// ----------------------------------------------------------------------

/// Run the dashboard until a workspace is chosen or input ends.
pub fn run_dashboard(
    input: &mut dyn BufRead,
    config: &VozdocConfig,
    drafts: DraftStore,
) -> Result<Option<Page>> {
    let recognizer = ConsoleRecognizer::default();
    let handle = recognizer.clone();
    let controller = Rc::new(RefCell::new(DashboardController::new(drafts, TracingFeedback)));

    let mut manager = RecognitionModeManager::new(recognizer);
    manager.set_auto_restart(config.recognition.auto_restart);
    manager.register(ModeDescriptor::new(
        MODE_LISTENING,
        true,
        false,
        Rc::new(DashboardMode {
            controller: Rc::clone(&controller),
        }),
    ))?;

    for draft in controller.borrow().recent_drafts()? {
        info!("borrador guardado: {} ({})", draft.subject, draft.to);
    }

    println!("Di \"crear documento\" o \"crear correo\" (\":salir\" termina):");
    manager.start(MODE_LISTENING)?;
    pump(&mut manager, &handle);

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            manager.stop(true);
            pump(&mut manager, &handle);
            return Ok(None);
        }
        let spoken = line.trim();
        if spoken == ":salir" {
            manager.stop(true);
            pump(&mut manager, &handle);
            return Ok(None);
        }
        if !spoken.is_empty() {
            feed_line(&mut manager, &handle, spoken);
        }
        if let Some(page) = controller.borrow().selected {
            return Ok(Some(page));
        }
    }
}

/// Run the document editor until the user navigates home or input ends.
pub fn run_document_editor(
    input: &mut dyn BufRead,
    config: &VozdocConfig,
    store: DocumentStore,
    exporter: WordFileExporter,
) -> Result<()> {
    let recognizer = ConsoleRecognizer::default();
    let handle = recognizer.clone();
    let synthesis = SpeechSynthesisAdapter::unsupported(&config.general.lang);
    let controller = Rc::new(RefCell::new(DocumentController::new(
        store,
        exporter,
        synthesis,
        TracingFeedback,
        config.dictation.undo_depth,
    )));

    let mut manager = RecognitionModeManager::new(recognizer);
    manager.set_auto_restart(config.recognition.auto_restart);
    manager.register(ModeDescriptor::new(
        MODE_COMMAND,
        false,
        false,
        Rc::new(DocumentCommandMode {
            controller: Rc::clone(&controller),
        }),
    ))?;
    manager.register(ModeDescriptor::new(
        MODE_DICTATION,
        true,
        true,
        Rc::new(DocumentDictationMode {
            controller: Rc::clone(&controller),
        }),
    ))?;

    println!("Editor de documentos. Comandos: \"comenzar redacción\", \"poner título ...\", \"guardar documento\", \"exportar\", \"volver al inicio\".");
    manager.start(MODE_COMMAND)?;
    pump(&mut manager, &handle);

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let spoken = line.trim();
        if spoken == ":salir" {
            break;
        }
        if spoken == ":fin" {
            // Silence: the engine drops the session; the manager restarts it.
            handle.end_session();
            pump(&mut manager, &handle);
            continue;
        }
        if !spoken.is_empty() {
            feed_line(&mut manager, &handle, spoken);
            println!("--- {}", controller.borrow().surface.display());
        }
        if controller.borrow().navigate_home {
            break;
        }
    }
    manager.stop(true);
    pump(&mut manager, &handle);
    Ok(())
}

/// Run the mail composer until the user navigates home or input ends.
pub fn run_mail_composer(
    input: &mut dyn BufRead,
    config: &VozdocConfig,
    store: DraftStore,
) -> Result<()> {
    let recognizer = ConsoleRecognizer::default();
    let handle = recognizer.clone();
    let synthesis = SpeechSynthesisAdapter::unsupported(&config.general.lang);
    let controller = Rc::new(RefCell::new(MailController::new(
        store,
        synthesis,
        TracingFeedback,
        config.dictation.undo_depth,
    )));

    let mut manager = RecognitionModeManager::new(recognizer);
    manager.set_auto_restart(config.recognition.auto_restart);
    manager.register(ModeDescriptor::new(
        MODE_COMMAND,
        false,
        false,
        Rc::new(MailCommandMode {
            controller: Rc::clone(&controller),
        }),
    ))?;
    manager.register(ModeDescriptor::new(
        MODE_DICTATION,
        true,
        true,
        Rc::new(MailDictationMode {
            controller: Rc::clone(&controller),
        }),
    ))?;
    manager.register(ModeDescriptor::new(
        MODE_DICTATE_RECIPIENT,
        false,
        false,
        Rc::new(FieldCaptureMode {
            controller: Rc::clone(&controller),
            subject: false,
        }),
    ))?;
    manager.register(ModeDescriptor::new(
        MODE_DICTATE_SUBJECT,
        false,
        false,
        Rc::new(FieldCaptureMode {
            controller: Rc::clone(&controller),
            subject: true,
        }),
    ))?;

    println!("Redacción de correo. Comandos: \"añadir destinatario\", \"añadir asunto\", \"comenzar redacción\", \"enviar correo\", \"volver al inicio\".");
    manager.start(MODE_COMMAND)?;
    pump(&mut manager, &handle);

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let spoken = line.trim();
        if spoken == ":salir" {
            break;
        }
        if spoken == ":fin" {
            handle.end_session();
            pump(&mut manager, &handle);
            continue;
        }
        if !spoken.is_empty() {
            feed_line(&mut manager, &handle, spoken);
            let controller = controller.borrow();
            println!(
                "--- Para: {} | Asunto: {}\n--- {}",
                controller.fields.to,
                controller.fields.subject,
                controller.body.display()
            );
            if let Some(link) = &controller.last_mailto {
                println!("--- {link}");
            }
        }
        if controller.borrow().navigate_home {
            break;
        }
    }
    manager.stop(true);
    pump(&mut manager, &handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_console_recognizer_lifecycle() {
        let mut recognizer = ConsoleRecognizer::default();
        let handle = recognizer.clone();

        recognizer.start().unwrap();
        assert!(matches!(recognizer.start(), Err(StartError::AlreadyStarted)));
        recognizer.stop();
        recognizer.stop();
        assert_eq!(
            handle.take_transitions(),
            vec![Transition::Started, Transition::Ended]
        );
    }

    #[test]
    fn test_end_session_only_when_running() {
        let recognizer = ConsoleRecognizer::default();
        recognizer.end_session();
        assert!(recognizer.take_transitions().is_empty());
    }

    #[test]
    fn test_dashboard_selects_document_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new("hola\ncrear documento\n");
        let config = VozdocConfig::default();
        let page = run_dashboard(&mut input, &config, DraftStore::open(dir.path(), 10)).unwrap();
        assert_eq!(page, Some(Page::DocumentEditor));
    }

    #[test]
    fn test_dashboard_exits_on_eof() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new("");
        let config = VozdocConfig::default();
        let page = run_dashboard(&mut input, &config, DraftStore::open(dir.path(), 10)).unwrap();
        assert_eq!(page, None);
    }

    #[test]
    fn test_document_editor_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(
            "poner título acta\ncomenzar redacción\nhola mundo\nterminar redacción\nguardar documento\nvolver al inicio\n",
        );
        let config = VozdocConfig::default();
        let store = DocumentStore::open(dir.path(), 20);
        run_document_editor(
            &mut input,
            &config,
            store,
            WordFileExporter::new(dir.path().join("exports")),
        )
        .unwrap();

        let saved = DocumentStore::open(dir.path(), 20).list().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Acta");
        assert_eq!(saved[0].content, "hola mundo");
    }

    #[test]
    fn test_mail_composer_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Cursor::new(
            "añadir destinatario\nana arroba correo punto es\nañadir asunto\nsaludo\ncomenzar redacción\nhola ana\nterminar redacción\nguardar borrador\nvolver al inicio\n",
        );
        let config = VozdocConfig::default();
        run_mail_composer(&mut input, &config, DraftStore::open(dir.path(), 10)).unwrap();

        let drafts = DraftStore::open(dir.path(), 10).list().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].to, "ana@correo.es");
        assert_eq!(drafts[0].subject, "Saludo");
        assert_eq!(drafts[0].body, "hola ana");
    }
}
