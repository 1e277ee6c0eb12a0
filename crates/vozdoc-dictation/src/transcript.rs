//! Dictation transcript processor.
//!
//! Consumes raw recognition result events while a dictation mode is live
//! and turns them into buffer mutations, layout effects and preview
//! updates. Final segments run through the inline command pipeline; interim
//! segments are only previewed. Saying a stop phrase anywhere in a segment
//! ends the session, keeping whatever was dictated before the phrase.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use vozdoc_command::phrases::{
    contains_phrase, contains_stop_phrase, excise_stop_phrases, normalize_key,
};
use vozdoc_core::types::SpeechResultEvent;
use vozdoc_speech::feedback::FeedbackChannel;

use crate::buffer::{DictationBuffer, RenderStyle, StyleTag};

/// Paragraph alignment options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
    Justify,
}

/// Result of asking the layout to apply a control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The control took effect.
    Applied,
    /// The control exists but the requested value does not (unknown font,
    /// size out of range).
    Unavailable,
    /// This surface has no such control; the utterance is not a command
    /// here and falls through to later interpretation.
    Unsupported,
}

/// Host surface the dictated text lands on.
pub trait EditorSurface {
    /// Current committed content, without any interim preview residue.
    fn capture_content(&self) -> String;

    /// Replace the committed content.
    fn commit_content(&mut self, content: &str);

    /// Show committed content plus a provisional interim tail.
    fn update_preview(&mut self, committed: &str, interim: &str);
}

/// Layout controls of the surrounding page (font, size, alignment).
pub trait LayoutControls {
    fn apply_font_size(&mut self, size: u32) -> ControlOutcome;
    fn apply_font_family(&mut self, family: &str) -> ControlOutcome;
    fn apply_alignment(&mut self, alignment: Alignment) -> ControlOutcome;

    /// Draw attention to the command hints panel.
    fn highlight_command_hints(&mut self);
}

/// Layout for surfaces with no layout chrome at all (mail body). Every
/// control reports [`ControlOutcome::Unsupported`].
#[derive(Debug, Default)]
pub struct NoLayout;

impl LayoutControls for NoLayout {
    fn apply_font_size(&mut self, _size: u32) -> ControlOutcome {
        ControlOutcome::Unsupported
    }

    fn apply_font_family(&mut self, _family: &str) -> ControlOutcome {
        ControlOutcome::Unsupported
    }

    fn apply_alignment(&mut self, _alignment: Alignment) -> ControlOutcome {
        ControlOutcome::Unsupported
    }

    fn highlight_command_hints(&mut self) {}
}

/// Commands the processor recognizes but does not execute itself; the page
/// controller picks them up from the outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassthroughCommand {
    SaveDocument,
    Export,
}

/// What one result event did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// A stop phrase was spoken; the controller should leave dictation.
    pub stopped: bool,
    /// The buffer content changed.
    pub changed: bool,
    /// A command deferred to the page controller.
    pub passthrough: Option<PassthroughCommand>,
}

/// Per-surface processor configuration.
#[derive(Clone, Copy, Debug)]
pub struct DictationOptions {
    pub render: RenderStyle,
    /// Whether the formatting toggles (bold/italic/underline) are live.
    pub formatting: bool,
    /// Whether font/size/alignment commands reach the layout.
    pub layout_controls: bool,
    pub undo_depth: usize,
}

impl Default for DictationOptions {
    fn default() -> Self {
        Self {
            render: RenderStyle::Markup,
            formatting: true,
            layout_controls: true,
            undo_depth: 20,
        }
    }
}

/// Collaborators injected per call; the processor owns none of them.
pub struct DictationContext<'a> {
    pub surface: &'a mut dyn EditorSurface,
    pub layout: &'a mut dyn LayoutControls,
    pub feedback: &'a dyn FeedbackChannel,
}

pub struct DictationTranscriptProcessor {
    buffer: DictationBuffer,
    options: DictationOptions,
}

impl DictationTranscriptProcessor {
    pub fn new(options: DictationOptions) -> Self {
        Self {
            buffer: DictationBuffer::new(options.render, options.undo_depth),
            options,
        }
    }

    /// Begin a dictation session over the surface's current content.
    pub fn enter(&mut self, surface: &dyn EditorSurface) {
        let content = surface.capture_content();
        debug!("entering dictation over {} existing chars", content.len());
        self.buffer.seed(&content);
    }

    /// End the session: close any open formatting, drop the interim
    /// preview and commit the settled text.
    pub fn exit(&mut self, surface: &mut dyn EditorSurface) {
        self.buffer.close_open_tags();
        let content = self.buffer.render();
        surface.commit_content(content.trim_end());
        surface.update_preview(content.trim_end(), "");
    }

    /// Process one recognition result event.
    pub fn handle_event(
        &mut self,
        event: &SpeechResultEvent,
        ctx: &mut DictationContext<'_>,
    ) -> ProcessOutcome {
        let mut outcome = ProcessOutcome::default();
        let mut interim = String::new();
        let mut stopping = false;

        for segment in event.new_segments() {
            if stopping {
                // Everything after the stop phrase in this event is noise.
                continue;
            }
            let transcript = segment.transcript.trim();
            if transcript.is_empty() {
                continue;
            }

            if contains_stop_phrase(transcript) {
                debug!("stop phrase detected in segment");
                stopping = true;
                if segment.is_final {
                    let remainder = excise_stop_phrases(transcript);
                    if !remainder.is_empty() {
                        self.process_final(&remainder, ctx, &mut outcome);
                    }
                }
                continue;
            }

            if segment.is_final {
                self.process_final(transcript, ctx, &mut outcome);
            } else {
                interim.push_str(transcript);
                interim.push(' ');
            }
        }

        outcome.stopped = stopping;
        let committed = self.buffer.render();
        let interim = if stopping { "" } else { interim.trim_end() };
        ctx.surface.update_preview(&committed, interim);
        outcome
    }

    pub fn rendered(&self) -> String {
        self.buffer.render()
    }

    /// Run one finalized utterance through the inline command pipeline.
    /// Category order is a contract; see the individual branches.
    fn process_final(
        &mut self,
        raw: &str,
        ctx: &mut DictationContext<'_>,
        outcome: &mut ProcessOutcome,
    ) {
        let mut working = raw.trim().to_lowercase();
        if working.is_empty() {
            return;
        }
        let key = normalize_key(&working);
        debug!("processing final utterance: '{}'", key);

        // Help phrases touch only the UI.
        if contains_phrase(&key, "mostrar comandos")
            || contains_phrase(&key, "ver comandos")
            || contains_phrase(&key, "ayuda")
        {
            ctx.layout.highlight_command_hints();
            return;
        }

        // Size and font captures, when this surface has layout chrome.
        if self.options.layout_controls {
            if let Some(size) = capture_font_size(&key) {
                match ctx.layout.apply_font_size(size) {
                    ControlOutcome::Applied => {
                        ctx.feedback.notify_success("Tamaño de letra actualizado");
                        return;
                    }
                    ControlOutcome::Unavailable => {
                        ctx.feedback.notify_error("Ese tamaño de letra no está disponible");
                        return;
                    }
                    ControlOutcome::Unsupported => {}
                }
            }
            if let Some(family) = capture_font_family(&key) {
                match ctx.layout.apply_font_family(&family) {
                    ControlOutcome::Applied => {
                        ctx.feedback.notify_success("Fuente actualizada");
                        return;
                    }
                    ControlOutcome::Unavailable => {
                        ctx.feedback.notify_error("Esa fuente no está disponible");
                        return;
                    }
                    ControlOutcome::Unsupported => {}
                }
            }
            if let Some(alignment) = detect_alignment(&key) {
                match ctx.layout.apply_alignment(alignment) {
                    ControlOutcome::Applied => {
                        ctx.feedback.notify_success("Alineación aplicada");
                        return;
                    }
                    ControlOutcome::Unavailable => {
                        ctx.feedback.notify_error("No se pudo alinear el texto");
                        return;
                    }
                    ControlOutcome::Unsupported => {}
                }
            }
        }

        // Structural punctuation: whole-utterance matches only, so a
        // sentence that merely mentions "punto" is not hijacked.
        match key.as_str() {
            "nuevo parrafo" | "punto y aparte" => {
                self.buffer.snapshot();
                self.buffer.paragraph_break();
                outcome.changed = true;
                return;
            }
            "nueva linea" => {
                self.buffer.snapshot();
                self.buffer.line_break();
                outcome.changed = true;
                return;
            }
            "coma" => {
                self.buffer.snapshot();
                self.buffer.append_punctuation(",");
                outcome.changed = true;
                return;
            }
            "punto" => {
                self.buffer.snapshot();
                self.buffer.append_punctuation(".");
                outcome.changed = true;
                return;
            }
            _ => {}
        }

        // Formatting toggles strip their phrase and let the remainder keep
        // flowing, so "activar negrita hola" both opens the tag and
        // dictates "hola".
        if self.options.formatting {
            let mut toggled = false;
            for (regex, tag, activate) in toggle_patterns() {
                if let Some(found) = regex.find(&working) {
                    if !toggled {
                        self.buffer.snapshot();
                        toggled = true;
                    }
                    let applied = if *activate {
                        self.buffer.open_style(*tag)
                    } else {
                        self.buffer.close_style(*tag)
                    };
                    if applied {
                        outcome.changed = true;
                    }
                    let mut stripped = String::with_capacity(working.len());
                    stripped.push_str(&working[..found.start()]);
                    stripped.push(' ');
                    stripped.push_str(&working[found.end()..]);
                    working = stripped.trim().to_string();
                }
            }
            if toggled {
                if working.is_empty() {
                    return;
                }
                self.append_literal(&working, false);
                outcome.changed = true;
                return;
            }
        }

        // Editing commands match by containment and consume the whole
        // utterance, so filler words around them do not turn the command
        // into dictated text.
        if contains_phrase(&key, "borrar ultima palabra")
            || contains_phrase(&key, "eliminar ultima palabra")
        {
            self.buffer.snapshot();
            self.buffer.remove_last_word();
            outcome.changed = true;
            return;
        }
        if contains_phrase(&key, "borrar oracion")
            || contains_phrase(&key, "eliminar oracion")
            || contains_phrase(&key, "borrar ultima oracion")
        {
            self.buffer.snapshot();
            self.buffer.remove_last_sentence();
            outcome.changed = true;
            return;
        }
        if contains_phrase(&key, "borrar ultimo parrafo")
            || contains_phrase(&key, "eliminar ultimo parrafo")
        {
            self.buffer.snapshot();
            self.buffer.remove_last_paragraph();
            outcome.changed = true;
            return;
        }
        if contains_phrase(&key, "deshacer") || contains_phrase(&key, "undo") {
            if self.buffer.undo() {
                outcome.changed = true;
            } else {
                ctx.feedback.notify_info("Nada que deshacer");
            }
            return;
        }

        // Commands the page controller owns; the buffer stays untouched.
        if contains_phrase(&key, "guardar documento") {
            outcome.passthrough = Some(PassthroughCommand::SaveDocument);
            return;
        }
        if contains_phrase(&key, "exportar") {
            outcome.passthrough = Some(PassthroughCommand::Export);
            return;
        }

        self.append_literal(&working, true);
        outcome.changed = true;
    }

    /// Append dictated words, stripping at most one trailing period the
    /// engine tends to add to finalized utterances.
    fn append_literal(&mut self, text: &str, snapshot: bool) {
        let text = text.strip_suffix('.').unwrap_or(text).trim_end();
        if text.is_empty() {
            return;
        }
        if snapshot {
            self.buffer.snapshot();
        }
        self.buffer.append_words(text);
    }
}

fn capture_font_size(key: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let regex = RE.get_or_init(|| {
        Regex::new(r"\bponer tamano\b(?:\s+a)?\s+(\d+)").expect("invalid font-size regex")
    });
    regex
        .captures(key)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn capture_font_family(key: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let regex = RE.get_or_init(|| {
        Regex::new(r"\bponer fuente\b\s+(.+)$").expect("invalid font-family regex")
    });
    regex
        .captures(key)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn detect_alignment(key: &str) -> Option<Alignment> {
    if contains_phrase(key, "justificar") {
        return Some(Alignment::Justify);
    }
    if contains_phrase(key, "alinear a la izquierda") {
        return Some(Alignment::Left);
    }
    if contains_phrase(key, "alinear a la derecha") {
        return Some(Alignment::Right);
    }
    if contains_phrase(key, "centrar texto") || contains_phrase(key, "alinear al centro") {
        return Some(Alignment::Center);
    }
    None
}

/// Toggle patterns in evaluation order: deactivation before activation per
/// style, bold before italic before underline. Patterns run over the raw
/// lowercased text so the match can be excised from it.
fn toggle_patterns() -> &'static [(Regex, StyleTag, bool)] {
    static PATTERNS: OnceLock<Vec<(Regex, StyleTag, bool)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let sep = r"[\s,.;:!?¡¿]+";
        let table: [(&str, &str, StyleTag, bool); 6] = [
            ("desactivar", "negrita", StyleTag::Bold, false),
            ("activar", "negrita", StyleTag::Bold, true),
            ("desactivar", "cursiva", StyleTag::Italic, false),
            ("activar", "cursiva", StyleTag::Italic, true),
            ("desactivar", "subrayado", StyleTag::Underline, false),
            ("activar", "subrayado", StyleTag::Underline, true),
        ];
        table.iter()
            .map(|(verb, style, tag, activate)| {
                let pattern = format!(r"\b{verb}{sep}{style}\b");
                (
                    Regex::new(&pattern).expect("invalid toggle regex"),
                    *tag,
                    *activate,
                )
            })
            .collect()
    })
}
