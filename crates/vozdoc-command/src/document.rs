//! Command interpreter for the document editor page.
//!
//! Maps one finalized utterance from the non-continuous command mode to
//! exactly one action. Mostly a stateless ordered dispatch table, with one
//! twist: after an export is requested without a format, the interpreter
//! waits for a format (or a cancellation) and re-prompts on anything else.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::phrases::{contains_phrase, normalize_key};

/// Export output formats the document editor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Word,
    Pdf,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Word => "Word",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Action resolved from one command-mode utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentAction {
    /// Highlight the command hints in the side panel.
    HighlightCommands,
    /// The command panel cannot be hidden; tell the user it is permanent.
    HelpPanelPermanent,
    /// Switch to the continuous dictation mode.
    StartDictation,
    /// Replace the document title (already trimmed and capitalized).
    SetTitle(String),
    /// "poner título" with nothing after it.
    TitleMissing,
    /// Read title and body aloud.
    ReadDocument,
    /// Persist the document.
    SaveDocument,
    /// Run an export in the given format.
    Export(ExportFormat),
    /// Ask the user which format to export in.
    PromptExportFormat,
    /// Format not understood while awaiting one; ask again.
    RemindExportFormat,
    /// Abandon the pending export prompt.
    CancelExport,
    /// Navigate back to the dashboard.
    NavigateHome,
    /// Nothing matched; command mode keeps listening.
    Unrecognized,
}

/// Two-state interpreter: normal dispatch, or awaiting an export format.
#[derive(Debug, Default)]
pub struct DocumentCommandInterpreter {
    awaiting_export_format: bool,
}

impl DocumentCommandInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_awaiting_export_format(&self) -> bool {
        self.awaiting_export_format
    }

    /// Abandon a pending export prompt without emitting an action, e.g.
    /// when the user toggles straight into dictation.
    pub fn reset_export_prompt(&mut self) {
        self.awaiting_export_format = false;
    }

    /// Resolve one utterance to an action. Dispatch order is a contract.
    pub fn interpret(&mut self, utterance: &str) -> DocumentAction {
        let command = utterance.to_lowercase().trim().to_string();
        let key = normalize_key(&command);

        if self.awaiting_export_format {
            debug!("resolving export format from '{}'", key);
            if contains_phrase(&key, "cancelar") || contains_phrase(&key, "anular") {
                self.awaiting_export_format = false;
                return DocumentAction::CancelExport;
            }
            return match detect_export_format(&key) {
                Some(format) => {
                    self.awaiting_export_format = false;
                    DocumentAction::Export(format)
                }
                None => DocumentAction::RemindExportFormat,
            };
        }

        if help_show_regex().is_match(&key) {
            return DocumentAction::HighlightCommands;
        }

        if help_hide_regex().is_match(&key) {
            return DocumentAction::HelpPanelPermanent;
        }

        if contains_phrase(&key, "comenzar redaccion") {
            return DocumentAction::StartDictation;
        }

        if key.starts_with("poner titulo") {
            return self.title_action(&command);
        }

        if contains_phrase(&key, "leer documento") {
            return DocumentAction::ReadDocument;
        }

        if contains_phrase(&key, "guardar documento") {
            return DocumentAction::SaveDocument;
        }

        if contains_phrase(&key, "exportar") {
            return match detect_export_format(&key) {
                Some(format) => DocumentAction::Export(format),
                None => {
                    self.awaiting_export_format = true;
                    DocumentAction::PromptExportFormat
                }
            };
        }

        if contains_phrase(&key, "volver al inicio") {
            return DocumentAction::NavigateHome;
        }

        debug!("unrecognized document utterance: '{}'", key);
        DocumentAction::Unrecognized
    }

    fn title_action(&self, command: &str) -> DocumentAction {
        // Strip the trigger from the raw (accented) command, then leading
        // punctuation the engine tends to insert after it.
        let after = match command.find("título") {
            Some(idx) => &command[idx + "título".len()..],
            None => match command.find("titulo") {
                Some(idx) => &command[idx + "titulo".len()..],
                None => "",
            },
        };
        let title = after.trim_start_matches([',', '.', ' ']).trim();
        if title.is_empty() {
            return DocumentAction::TitleMissing;
        }

        let mut chars = title.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        DocumentAction::SetTitle(capitalized)
    }
}

fn detect_export_format(key: &str) -> Option<ExportFormat> {
    if contains_phrase(key, "pdf") {
        return Some(ExportFormat::Pdf);
    }
    if contains_phrase(key, "word") || contains_phrase(key, "doc") || contains_phrase(key, "docx") {
        return Some(ExportFormat::Word);
    }
    None
}

fn help_show_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(mostrar|ver)\b.*\bcomandos?\b|\bmostrar\b.*\bayuda\b|\bayuda\b")
            .expect("invalid help-show regex")
    })
}

fn help_hide_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(ocultar|cerrar)\b.*\bcomandos?\b|\b(ocultar|cerrar)\b.*\bayuda\b")
            .expect("invalid help-hide regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_dictation() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(
            interp.interpret("Comenzar redacción"),
            DocumentAction::StartDictation
        );
    }

    #[test]
    fn test_set_title_strips_trigger_and_capitalizes() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(
            interp.interpret("poner título, informe anual"),
            DocumentAction::SetTitle("Informe anual".to_string())
        );
    }

    #[test]
    fn test_set_title_missing() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(interp.interpret("poner título"), DocumentAction::TitleMissing);
    }

    #[test]
    fn test_export_with_inline_format() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(
            interp.interpret("exportar en pdf"),
            DocumentAction::Export(ExportFormat::Pdf)
        );
        assert!(!interp.is_awaiting_export_format());
    }

    #[test]
    fn test_export_prompts_for_format() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(interp.interpret("exportar"), DocumentAction::PromptExportFormat);
        assert!(interp.is_awaiting_export_format());
    }

    #[test]
    fn test_awaiting_format_accepts_word() {
        let mut interp = DocumentCommandInterpreter::new();
        interp.interpret("exportar");
        assert_eq!(
            interp.interpret("en Word, por favor"),
            DocumentAction::Export(ExportFormat::Word)
        );
        assert!(!interp.is_awaiting_export_format());
    }

    #[test]
    fn test_awaiting_format_reprompts_on_noise() {
        let mut interp = DocumentCommandInterpreter::new();
        interp.interpret("exportar");
        assert_eq!(
            interp.interpret("guardar documento"),
            DocumentAction::RemindExportFormat
        );
        assert!(interp.is_awaiting_export_format());
    }

    #[test]
    fn test_awaiting_format_cancel() {
        let mut interp = DocumentCommandInterpreter::new();
        interp.interpret("exportar");
        assert_eq!(
            interp.interpret("cancelar la exportación"),
            DocumentAction::CancelExport
        );
        assert!(!interp.is_awaiting_export_format());
    }

    #[test]
    fn test_help_phrases() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(
            interp.interpret("mostrar comandos"),
            DocumentAction::HighlightCommands
        );
        assert_eq!(interp.interpret("ayuda"), DocumentAction::HighlightCommands);
        assert_eq!(
            interp.interpret("ocultar comandos"),
            DocumentAction::HelpPanelPermanent
        );
    }

    #[test]
    fn test_read_save_navigate() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(interp.interpret("leer documento"), DocumentAction::ReadDocument);
        assert_eq!(interp.interpret("guardar documento"), DocumentAction::SaveDocument);
        assert_eq!(interp.interpret("volver al inicio"), DocumentAction::NavigateHome);
    }

    #[test]
    fn test_unrecognized() {
        let mut interp = DocumentCommandInterpreter::new();
        assert_eq!(interp.interpret("hola qué tal"), DocumentAction::Unrecognized);
    }

    #[test]
    fn test_reset_export_prompt() {
        let mut interp = DocumentCommandInterpreter::new();
        interp.interpret("exportar");
        interp.reset_export_prompt();
        assert!(!interp.is_awaiting_export_format());
    }
}
