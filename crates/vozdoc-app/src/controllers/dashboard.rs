//! Dashboard page controller.
//!
//! The dashboard runs one continuous listening mode whose only job is to
//! open a workspace. Its error policy differs from the editor pages:
//! silence is routine (the mode just restarts), while a denied microphone
//! permission stops listening for good.

use vozdoc_command::dashboard::{DashboardAction, DashboardCommandInterpreter};
use vozdoc_core::types::{RecognitionErrorEvent, RecognitionErrorKind};
use vozdoc_dictation::mode::ModeRequest;
use vozdoc_speech::feedback::FeedbackChannel;
use vozdoc_storage::{DraftStore, MailDraft};

use vozdoc_core::error::Result;

/// Workspace the user asked to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    DocumentEditor,
    MailComposer,
}

pub struct DashboardController<F: FeedbackChannel> {
    interpreter: DashboardCommandInterpreter,
    feedback: F,
    drafts: DraftStore,
    pub selected: Option<Page>,
}

impl<F: FeedbackChannel> DashboardController<F> {
    pub fn new(drafts: DraftStore, feedback: F) -> Self {
        Self {
            interpreter: DashboardCommandInterpreter::new(),
            feedback,
            drafts,
            selected: None,
        }
    }

    /// One finalized utterance from the continuous listening mode.
    pub fn handle_command(&mut self, utterance: &str) -> Option<ModeRequest> {
        match self.interpreter.interpret(utterance) {
            DashboardAction::OpenDocumentEditor => {
                self.selected = Some(Page::DocumentEditor);
                Some(ModeRequest::Stop { manual: true })
            }
            DashboardAction::OpenMailComposer => {
                self.selected = Some(Page::MailComposer);
                Some(ModeRequest::Stop { manual: true })
            }
            // Keep listening; the dashboard never nags about stray speech.
            DashboardAction::Unrecognized => None,
        }
    }

    /// Error policy for the listening mode.
    pub fn handle_error(&mut self, event: &RecognitionErrorEvent) -> Option<ModeRequest> {
        match &event.kind {
            RecognitionErrorKind::NoSpeech => None,
            RecognitionErrorKind::NotAllowed => {
                self.feedback
                    .notify_error("Permiso de micrófono denegado. Actívalo para usar la voz");
                Some(ModeRequest::Stop { manual: true })
            }
            _ => {
                self.feedback.notify_error("Error de reconocimiento de voz");
                None
            }
        }
    }

    /// Saved drafts, newest first, for the resume list.
    pub fn recent_drafts(&self) -> Result<Vec<MailDraft>> {
        self.drafts.list()
    }
}
