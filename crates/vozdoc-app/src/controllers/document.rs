//! Document editor page controller.

use tracing::warn;
use uuid::Uuid;

use vozdoc_command::document::{DocumentAction, DocumentCommandInterpreter, ExportFormat};
use vozdoc_core::types::SpeechResultEvent;
use vozdoc_dictation::mode::ModeRequest;
use vozdoc_dictation::transcript::{
    DictationContext, DictationOptions, DictationTranscriptProcessor, PassthroughCommand,
};
use vozdoc_speech::feedback::FeedbackChannel;
use vozdoc_speech::synthesis::SpeechSynthesisAdapter;
use vozdoc_storage::{DocumentStore, StoredDocument};

use crate::export::{DocumentExporter, ExportData};
use crate::surfaces::{DocumentLayout, TextSurface};

use super::{strip_markup, MODE_COMMAND, MODE_DICTATION};

/// Owns the document page: title, rich surface, layout chrome, dictation
/// engine, persistence and export.
pub struct DocumentController<F: FeedbackChannel, E: DocumentExporter> {
    interpreter: DocumentCommandInterpreter,
    processor: DictationTranscriptProcessor,
    pub surface: TextSurface,
    pub layout: DocumentLayout,
    feedback: F,
    synthesis: SpeechSynthesisAdapter,
    store: DocumentStore,
    exporter: E,
    pub title: String,
    document_id: Option<Uuid>,
    pub navigate_home: bool,
}

impl<F: FeedbackChannel, E: DocumentExporter> DocumentController<F, E> {
    pub fn new(
        store: DocumentStore,
        exporter: E,
        synthesis: SpeechSynthesisAdapter,
        feedback: F,
        undo_depth: usize,
    ) -> Self {
        let options = DictationOptions {
            undo_depth,
            ..DictationOptions::default()
        };
        Self {
            interpreter: DocumentCommandInterpreter::new(),
            processor: DictationTranscriptProcessor::new(options),
            surface: TextSurface::default(),
            layout: DocumentLayout::default(),
            feedback,
            synthesis,
            store,
            exporter,
            title: String::new(),
            document_id: None,
            navigate_home: false,
        }
    }

    /// One finalized utterance in command mode.
    pub fn handle_command(&mut self, utterance: &str) -> Option<ModeRequest> {
        match self.interpreter.interpret(utterance) {
            DocumentAction::HighlightCommands => {
                self.layout.hints_highlighted = true;
                self.feedback
                    .notify_info("Los comandos disponibles están en el panel lateral");
                None
            }
            DocumentAction::HelpPanelPermanent => {
                self.feedback
                    .notify_info("El panel de comandos siempre está visible");
                None
            }
            DocumentAction::StartDictation => Some(ModeRequest::SwitchTo(MODE_DICTATION.to_string())),
            DocumentAction::SetTitle(title) => {
                self.title = title;
                self.feedback.notify_success("Título actualizado");
                None
            }
            DocumentAction::TitleMissing => {
                self.feedback
                    .notify_error("Di el título después de \"poner título\"");
                None
            }
            DocumentAction::ReadDocument => {
                self.read_aloud();
                None
            }
            DocumentAction::SaveDocument => {
                self.save();
                None
            }
            DocumentAction::Export(format) => {
                self.run_export(format);
                None
            }
            DocumentAction::PromptExportFormat => {
                self.prompt_export_format();
                None
            }
            DocumentAction::RemindExportFormat => {
                self.feedback
                    .notify_info("Di \"Word\" o \"PDF\", o \"cancelar\"");
                None
            }
            DocumentAction::CancelExport => {
                self.feedback.notify_info("Exportación cancelada");
                None
            }
            DocumentAction::NavigateHome => {
                self.navigate_home = true;
                Some(ModeRequest::Stop { manual: true })
            }
            DocumentAction::Unrecognized => {
                self.feedback.notify_info("Comando no reconocido");
                None
            }
        }
    }

    /// Dictation mode entered: seed the buffer from the surface.
    pub fn enter_dictation(&mut self) {
        self.interpreter.reset_export_prompt();
        self.processor.enter(&self.surface);
        self.feedback
            .notify_info("Dictado activo. Di \"terminar redacción\" para salir");
    }

    /// Dictation mode left: settle the buffer back onto the surface.
    pub fn exit_dictation(&mut self) {
        self.processor.exit(&mut self.surface);
    }

    /// One result event while dictating.
    pub fn handle_dictation_event(&mut self, event: &SpeechResultEvent) -> Option<ModeRequest> {
        let outcome = {
            let mut ctx = DictationContext {
                surface: &mut self.surface,
                layout: &mut self.layout,
                feedback: &self.feedback,
            };
            self.processor.handle_event(event, &mut ctx)
        };

        match outcome.passthrough {
            Some(PassthroughCommand::SaveDocument) => self.save(),
            Some(PassthroughCommand::Export) => {
                // Arm the format prompt so command mode resumes mid-flow.
                self.interpreter.interpret("exportar");
                self.prompt_export_format();
                return Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()));
            }
            None => {}
        }

        if outcome.stopped {
            return Some(ModeRequest::SwitchTo(MODE_COMMAND.to_string()));
        }
        None
    }

    /// Persist the current title and content.
    pub fn save(&mut self) {
        let mut document = StoredDocument::new(self.display_title(), self.surface.content());
        if let Some(id) = self.document_id {
            document.id = id;
        }
        match self.store.save(&document) {
            Ok(()) => {
                self.document_id = Some(document.id);
                self.feedback.notify_success("Documento guardado");
            }
            Err(err) => {
                warn!("document save failed: {err}");
                self.feedback.notify_error("No se pudo guardar el documento");
            }
        }
    }

    fn run_export(&mut self, format: ExportFormat) {
        let html = self.surface.content().to_string();
        let data = ExportData::new(&self.display_title(), &html, &strip_markup(&html));
        match self.exporter.export(&data, format) {
            Ok(path) => self.feedback.notify_success(&format!(
                "Documento exportado a {} en {}",
                format.label(),
                path.display()
            )),
            Err(err) => self.feedback.notify_error(&err.to_string()),
        }
    }

    fn prompt_export_format(&mut self) {
        let prompt = "¿En qué formato quieres exportar, Word o PDF?";
        // Without synthesis the toast alone carries the prompt.
        let _ = self.synthesis.speak(prompt);
        self.feedback.notify_info(prompt);
    }

    fn read_aloud(&mut self) {
        let body = strip_markup(self.surface.content());
        let text = if body.trim().is_empty() {
            "El documento está vacío".to_string()
        } else {
            format!("{}. {}", self.display_title(), body)
        };
        if let Err(err) = self.synthesis.speak(&text) {
            warn!("read aloud failed: {err}");
            self.feedback
                .notify_error("La lectura en voz alta no está disponible");
        }
    }

    fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            "Documento sin título".to_string()
        } else {
            self.title.clone()
        }
    }
}
