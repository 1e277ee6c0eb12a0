//! Mail composer page controller.

use tracing::warn;
use uuid::Uuid;

use vozdoc_command::mail::{transform_spoken_email, MailAction, MailCommandInterpreter, MailTab};
use vozdoc_core::types::SpeechResultEvent;
use vozdoc_dictation::buffer::RenderStyle;
use vozdoc_dictation::mode::ModeRequest;
use vozdoc_dictation::transcript::{
    DictationContext, DictationOptions, DictationTranscriptProcessor, EditorSurface, NoLayout,
    PassthroughCommand,
};
use vozdoc_speech::feedback::FeedbackChannel;
use vozdoc_speech::synthesis::SpeechSynthesisAdapter;
use vozdoc_storage::{DraftStore, MailDraft};

use crate::surfaces::TextSurface;

use super::{capitalize, MODE_COMMAND, MODE_DICTATION};

/// Composer fields outside the body surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailFields {
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
}

/// Owns the mail page: fields, body surface, single-shot field capture,
/// draft persistence and the outgoing mailto link.
pub struct MailController<F: FeedbackChannel> {
    interpreter: MailCommandInterpreter,
    processor: DictationTranscriptProcessor,
    pub body: TextSurface,
    layout: NoLayout,
    feedback: F,
    synthesis: SpeechSynthesisAdapter,
    store: DraftStore,
    pub fields: MailFields,
    draft_id: Option<Uuid>,
    pub active_tab: MailTab,
    pub help_visible: bool,
    pub navigate_home: bool,
    /// Link for the host to open when the user sends the mail.
    pub last_mailto: Option<String>,
}

impl<F: FeedbackChannel> MailController<F> {
    pub fn new(
        store: DraftStore,
        synthesis: SpeechSynthesisAdapter,
        feedback: F,
        undo_depth: usize,
    ) -> Self {
        let options = DictationOptions {
            render: RenderStyle::Plain,
            formatting: false,
            layout_controls: false,
            undo_depth,
        };
        Self {
            interpreter: MailCommandInterpreter::new(),
            processor: DictationTranscriptProcessor::new(options),
            body: TextSurface::default(),
            layout: NoLayout,
            feedback,
            synthesis,
            store,
            fields: MailFields::default(),
            draft_id: None,
            active_tab: MailTab::Fields,
            help_visible: true,
            navigate_home: false,
            last_mailto: None,
        }
    }

    /// Load a saved draft into the composer.
    pub fn load_draft(&mut self, draft: &MailDraft) {
        self.draft_id = Some(draft.id);
        self.fields = MailFields {
            to: draft.to.clone(),
            cc: draft.cc.clone(),
            bcc: draft.bcc.clone(),
            subject: draft.subject.clone(),
        };
        self.body.commit_content(&draft.body);
    }

    /// One finalized utterance in command mode.
    pub fn handle_command(&mut self, utterance: &str) -> Option<ModeRequest> {
        match self.interpreter.interpret(utterance) {
            MailAction::CaptureRecipient => {
                self.feedback.notify_info("Dicta la dirección del destinatario");
                Some(ModeRequest::SwitchTo(super::MODE_DICTATE_RECIPIENT.to_string()))
            }
            MailAction::CaptureSubject => {
                self.feedback.notify_info("Dicta el asunto");
                Some(ModeRequest::SwitchTo(super::MODE_DICTATE_SUBJECT.to_string()))
            }
            MailAction::StartDictation => Some(ModeRequest::SwitchTo(MODE_DICTATION.to_string())),
            MailAction::ClearRecipient => {
                self.fields.to.clear();
                self.feedback.notify_success("Destinatario borrado");
                None
            }
            MailAction::ClearSubject => {
                self.fields.subject.clear();
                self.feedback.notify_success("Asunto borrado");
                None
            }
            MailAction::ReadMail => {
                self.read_aloud();
                None
            }
            MailAction::AttachFile => {
                self.feedback
                    .notify_info("Selecciona el archivo en el cuadro de diálogo");
                None
            }
            MailAction::DiscardMail => {
                self.discard();
                None
            }
            MailAction::SendMail => {
                self.send();
                None
            }
            MailAction::SaveDraft => {
                self.save_draft();
                None
            }
            MailAction::NavigateHome => {
                self.navigate_home = true;
                Some(ModeRequest::Stop { manual: true })
            }
            MailAction::HideHelp => {
                self.help_visible = false;
                None
            }
            MailAction::ShowHelp => {
                self.help_visible = true;
                None
            }
            MailAction::ResumeDictationHint => {
                self.feedback
                    .notify_info("Di \"comenzar redacción\" para seguir dictando el cuerpo");
                None
            }
            MailAction::ShowTab(tab) => {
                self.active_tab = tab;
                None
            }
            MailAction::Unrecognized => {
                self.feedback.notify_info("Comando no reconocido");
                None
            }
        }
    }

    /// Single-shot recipient capture result.
    pub fn handle_recipient(&mut self, transcript: &str) -> Option<ModeRequest> {
        let email = transform_spoken_email(transcript);
        if email.is_empty() {
            self.feedback.notify_error("No se entendió la dirección");
        } else {
            self.fields.to = email;
            self.feedback.notify_success("Destinatario actualizado");
        }
        Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()))
    }

    /// Single-shot subject capture result.
    pub fn handle_subject(&mut self, transcript: &str) -> Option<ModeRequest> {
        let subject = transcript.trim().trim_end_matches('.');
        if subject.is_empty() {
            self.feedback.notify_error("No se entendió el asunto");
        } else {
            self.fields.subject = capitalize(subject);
            self.feedback.notify_success("Asunto actualizado");
        }
        Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()))
    }

    pub fn enter_dictation(&mut self) {
        self.processor.enter(&self.body);
        self.feedback
            .notify_info("Dictado activo. Di \"terminar redacción\" para salir");
    }

    pub fn exit_dictation(&mut self) {
        self.processor.exit(&mut self.body);
    }

    /// One result event while dictating the body.
    pub fn handle_dictation_event(&mut self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let outcome = {
            let mut ctx = DictationContext {
                surface: &mut self.body,
                layout: &mut self.layout,
                feedback: &self.feedback,
            };
            self.processor.handle_event(event, &mut ctx)
        };

        if matches!(outcome.passthrough, Some(PassthroughCommand::SaveDocument)) {
            self.save_draft();
        }
        if outcome.stopped {
            return Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()));
        }
        None
    }

    /// Persist the composer as a draft, reusing the id once saved.
    pub fn save_draft(&mut self) {
        let mut draft = MailDraft::new(
            self.fields.to.clone(),
            self.fields.subject.clone(),
            self.body.content(),
        );
        draft.cc = self.fields.cc.clone();
        draft.bcc = self.fields.bcc.clone();
        if let Some(id) = self.draft_id {
            draft.id = id;
        }
        match self.store.save(&draft) {
            Ok(()) => {
                self.draft_id = Some(draft.id);
                self.feedback.notify_success("Borrador guardado");
            }
            Err(err) => {
                warn!("draft save failed: {err}");
                self.feedback.notify_error("No se pudo guardar el borrador");
            }
        }
    }

    /// Clear every field and drop the persisted draft if any.
    pub fn discard(&mut self) {
        self.fields = MailFields::default();
        self.body.clear();
        if let Some(id) = self.draft_id.take() {
            if let Err(err) = self.store.delete(id) {
                warn!("draft delete failed: {err}");
            }
        }
        self.feedback.notify_success("Correo descartado");
    }

    /// Build the outgoing mailto link and hand it to the host.
    pub fn send(&mut self) {
        if self.fields.to.trim().is_empty() {
            self.feedback
                .notify_error("Añade un destinatario antes de enviar");
            return;
        }
        let link = build_mailto(&self.fields, self.body.content());
        self.last_mailto = Some(link);
        self.feedback.notify_success("Abriendo tu aplicación de correo");
    }

    fn read_aloud(&mut self) {
        let to = if self.fields.to.is_empty() {
            "sin destinatario"
        } else {
            self.fields.to.as_str()
        };
        let subject = if self.fields.subject.is_empty() {
            "sin asunto"
        } else {
            self.fields.subject.as_str()
        };
        let text = format!("Para {to}. Asunto: {subject}. {}", self.body.content());
        if let Err(err) = self.synthesis.speak(&text) {
            warn!("read aloud failed: {err}");
            self.feedback
                .notify_error("La lectura en voz alta no está disponible");
        }
    }
}

/// Assemble a `mailto:` link with percent-encoded parameters.
pub fn build_mailto(fields: &MailFields, body: &str) -> String {
    let mut link = format!("mailto:{}", percent_encode(&fields.to));
    let mut params: Vec<String> = Vec::new();
    if !fields.cc.is_empty() {
        params.push(format!("cc={}", percent_encode(&fields.cc)));
    }
    if !fields.bcc.is_empty() {
        params.push(format!("bcc={}", percent_encode(&fields.bcc)));
    }
    if !fields.subject.is_empty() {
        params.push(format!("subject={}", percent_encode(&fields.subject)));
    }
    if !body.is_empty() {
        params.push(format!("body={}", percent_encode(body)));
    }
    if !params.is_empty() {
        link.push('?');
        link.push_str(&params.join("&"));
    }
    link
}

/// Percent-encode everything outside the unreserved URI set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use vozdoc_speech::feedback::NullFeedback;

    use super::*;

    fn controller(dir: &std::path::Path) -> MailController<NullFeedback> {
        MailController::new(
            DraftStore::open(dir, 10),
            SpeechSynthesisAdapter::unsupported("es-ES"),
            NullFeedback,
            20,
        )
    }

    #[test]
    fn test_capture_recipient_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        assert_eq!(
            controller.handle_command("añadir destinatario"),
            Some(ModeRequest::SwitchTo("dictate_recipient".to_string()))
        );
        assert_eq!(
            controller.handle_recipient("ana arroba correo punto es"),
            Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()))
        );
        assert_eq!(controller.fields.to, "ana@correo.es");
    }

    #[test]
    fn test_capture_subject_capitalizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        controller.handle_subject("reunión del viernes.");
        assert_eq!(controller.fields.subject, "Reunión del viernes");
    }

    #[test]
    fn test_body_dictation_is_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        controller.enter_dictation();
        controller.handle_dictation_event(&SpeechResultEvent::single_final("hola ana"));
        controller.handle_dictation_event(&SpeechResultEvent::single_final("nuevo párrafo"));
        controller.handle_dictation_event(&SpeechResultEvent::single_final("saludos"));
        let request =
            controller.handle_dictation_event(&SpeechResultEvent::single_final("detener dictado"));
        assert_eq!(request, Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string())));
        controller.exit_dictation();
        assert_eq!(controller.body.content(), "hola ana \n\nsaludos");
    }

    #[test]
    fn test_save_and_discard_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        controller.fields.to = "ana@correo.es".to_string();
        controller.fields.subject = "Hola".to_string();
        controller.save_draft();
        controller.save_draft();
        assert_eq!(controller.store.list().unwrap().len(), 1);

        controller.discard();
        assert!(controller.store.list().unwrap().is_empty());
        assert_eq!(controller.fields, MailFields::default());
    }

    #[test]
    fn test_send_requires_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        controller.send();
        assert!(controller.last_mailto.is_none());

        controller.fields.to = "ana@correo.es".to_string();
        controller.fields.subject = "Hola".to_string();
        controller.body.commit_content("¿qué tal?");
        controller.send();
        let link = controller.last_mailto.unwrap();
        assert!(link.starts_with("mailto:ana%40correo.es?"));
        assert!(link.contains("subject=Hola"));
        assert!(link.contains("body=%C2%BFqu%C3%A9%20tal%3F"));
    }

    #[test]
    fn test_load_draft_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        let mut draft = MailDraft::new("ana@correo.es", "Hola", "cuerpo");
        draft.cc = "luis@correo.es".to_string();
        controller.load_draft(&draft);
        assert_eq!(controller.fields.to, "ana@correo.es");
        assert_eq!(controller.body.content(), "cuerpo");

        controller.save_draft();
        let stored = controller.store.find(draft.id).unwrap().unwrap();
        assert_eq!(stored.cc, "luis@correo.es");
    }

    #[test]
    fn test_tabs_and_help() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path());
        controller.handle_command("ver acciones");
        assert_eq!(controller.active_tab, MailTab::Actions);
        controller.handle_command("ocultar ayuda");
        assert!(!controller.help_visible);
        controller.handle_command("mostrar ayuda");
        assert!(controller.help_visible);
    }
}
