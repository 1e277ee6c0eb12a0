//! Command interpreter for the mail composer page.
//!
//! All matching happens on the accent-folded command key, so "añadir" and
//! "anadir" resolve identically. Field-capture commands switch the page into
//! a single-shot dictation mode for the recipient or subject; the spoken
//! value for the recipient field goes through [`transform_spoken_email`].

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::phrases::{contains_phrase, normalize_key};

/// Sidebar tab groups addressable by voice while in command mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MailTab {
    Fields,
    Actions,
    Help,
}

/// Action resolved from one command-mode utterance on the mail page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MailAction {
    /// Switch to single-shot capture of the recipient address.
    CaptureRecipient,
    /// Switch to single-shot capture of the subject line.
    CaptureSubject,
    /// Switch to continuous body dictation.
    StartDictation,
    ClearRecipient,
    ClearSubject,
    /// Read recipient, subject and body aloud.
    ReadMail,
    /// Open the attachment picker.
    AttachFile,
    /// Clear every field and drop the working draft.
    DiscardMail,
    SendMail,
    SaveDraft,
    NavigateHome,
    HideHelp,
    ShowHelp,
    /// "reanudar dictado" hint; dictation restarts only via its own phrase.
    ResumeDictationHint,
    ShowTab(MailTab),
    Unrecognized,
}

/// Stateless ordered dispatch over the normalized command key.
#[derive(Debug, Default)]
pub struct MailCommandInterpreter;

impl MailCommandInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Resolve one utterance to an action. Dispatch order is a contract;
    /// field-capture triggers are prefix matches, the rest are phrase
    /// containment.
    pub fn interpret(&self, utterance: &str) -> MailAction {
        let key = normalize_key(utterance);

        if starts_with_any(&key, &["anadir destinatario", "anade destinatario", "modificar destinatario", "agregar destinatario"]) {
            return MailAction::CaptureRecipient;
        }

        if starts_with_any(&key, &["anadir asunto", "anade asunto", "modificar asunto", "agregar asunto"]) {
            return MailAction::CaptureSubject;
        }

        if contains_phrase(&key, "comenzar redaccion")
            || contains_phrase(&key, "iniciar dictado")
            || contains_phrase(&key, "activar dictado")
        {
            return MailAction::StartDictation;
        }

        if contains_phrase(&key, "borrar destinatario") || contains_phrase(&key, "eliminar destinatario") {
            return MailAction::ClearRecipient;
        }

        if contains_phrase(&key, "borrar asunto") || contains_phrase(&key, "eliminar asunto") {
            return MailAction::ClearSubject;
        }

        if contains_phrase(&key, "leer correo") {
            return MailAction::ReadMail;
        }

        if contains_phrase(&key, "adjuntar archivo")
            || contains_phrase(&key, "agregar archivo")
            || contains_phrase(&key, "anadir archivo")
        {
            return MailAction::AttachFile;
        }

        if contains_phrase(&key, "descartar correo")
            || contains_phrase(&key, "eliminar correo")
            || contains_phrase(&key, "borrar correo")
        {
            return MailAction::DiscardMail;
        }

        if contains_phrase(&key, "enviar correo") {
            return MailAction::SendMail;
        }

        if contains_phrase(&key, "guardar borrador") {
            return MailAction::SaveDraft;
        }

        if contains_phrase(&key, "volver al inicio")
            || contains_phrase(&key, "ir al inicio")
            || contains_phrase(&key, "regresar al inicio")
        {
            return MailAction::NavigateHome;
        }

        if contains_phrase(&key, "ocultar ayuda")
            || contains_phrase(&key, "entendido")
            || contains_phrase(&key, "quitar ayuda")
            || contains_phrase(&key, "cerrar ayuda")
        {
            return MailAction::HideHelp;
        }

        if contains_phrase(&key, "mostrar ayuda") || contains_phrase(&key, "ver ayuda") {
            return MailAction::ShowHelp;
        }

        if contains_phrase(&key, "reanudar dictado") || contains_phrase(&key, "continuar dictado") {
            return MailAction::ResumeDictationHint;
        }

        if contains_phrase(&key, "campos") {
            return MailAction::ShowTab(MailTab::Fields);
        }

        if contains_phrase(&key, "acciones") {
            return MailAction::ShowTab(MailTab::Actions);
        }

        if contains_phrase(&key, "ayuda") {
            return MailAction::ShowTab(MailTab::Help);
        }

        debug!("unrecognized mail utterance: '{}'", key);
        MailAction::Unrecognized
    }
}

fn starts_with_any(key: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| key.starts_with(prefix))
}

/// Turn a spoken address into a plausible email: symbol words become
/// symbols ("arroba" → '@', "punto" → '.', "guion bajo" → '_',
/// "guion medio"/"guion" → '-', "más" → '+'), whitespace around symbols is
/// compacted and stray separators are dropped.
pub fn transform_spoken_email(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    static SYMBOLS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let symbols = SYMBOLS.get_or_init(|| {
        // Longer word sequences first so "guion bajo" is not eaten by "guion".
        vec![
            (Regex::new(r"\s?\barroba\b\s?").unwrap(), "@"),
            (Regex::new(r"\s?\bpunto\b\s?").unwrap(), "."),
            (Regex::new(r"\s?\bguion medio\b\s?").unwrap(), "-"),
            (Regex::new(r"\s?\bguion bajo\b\s?").unwrap(), "_"),
            (Regex::new(r"\s?\bguion\b\s?").unwrap(), "-"),
            (Regex::new(r"\s?\bmas\b\s?").unwrap(), "+"),
        ]
    });

    let mut value = normalize_key_for_email(raw);
    for (regex, symbol) in symbols {
        value = regex.replace_all(&value, *symbol).into_owned();
    }

    // Compact any remaining whitespace around symbols, then drop what's left.
    let value: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    value.chars().filter(|ch| *ch != ',' && *ch != ';').collect()
}

/// Email-specific normalization: lowercase and fold accents ("guión" →
/// "guion", "más" → "mas") but keep symbols the user may have spelled out.
fn normalize_key_for_email(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            other => other,
        })
        .collect()
}
