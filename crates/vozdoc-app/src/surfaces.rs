//! In-memory editing surfaces and page layout.
//!
//! These stand in for the host UI: the dictation engine talks to them
//! through the surface and layout traits and never notices the difference.

use tracing::{debug, info};

use vozdoc_dictation::transcript::{Alignment, ControlOutcome, EditorSurface, LayoutControls};
use vozdoc_speech::feedback::{FeedbackChannel, ToastVariant};

/// Editable text area holding committed content plus a provisional interim
/// tail. Capture returns only the committed part, so interim text never
/// leaks into the buffer seed.
#[derive(Debug, Default)]
pub struct TextSurface {
    committed: String,
    interim: String,
}

impl TextSurface {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            committed: content.into(),
            interim: String::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.committed
    }

    /// What the user currently sees: committed text plus the interim tail.
    pub fn display(&self) -> String {
        if self.interim.is_empty() {
            self.committed.clone()
        } else {
            format!("{}{}", self.committed, self.interim)
        }
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }
}

impl EditorSurface for TextSurface {
    fn capture_content(&self) -> String {
        self.committed.clone()
    }

    fn commit_content(&mut self, content: &str) {
        self.committed = content.to_string();
        self.interim.clear();
    }

    fn update_preview(&mut self, committed: &str, interim: &str) {
        self.committed = committed.to_string();
        self.interim = interim.to_string();
    }
}

/// Layout chrome of the document editor: font family, size, alignment.
#[derive(Debug)]
pub struct DocumentLayout {
    sizes: Vec<u32>,
    fonts: Vec<String>,
    pub font_size: u32,
    pub font_family: String,
    pub alignment: Alignment,
    pub hints_highlighted: bool,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            sizes: vec![12, 14, 16, 18, 20, 24, 28, 32],
            fonts: ["Arial", "Georgia", "Verdana", "Courier New", "Times New Roman"]
                .into_iter()
                .map(String::from)
                .collect(),
            font_size: 16,
            font_family: "Arial".to_string(),
            alignment: Alignment::Left,
            hints_highlighted: false,
        }
    }
}

impl LayoutControls for DocumentLayout {
    fn apply_font_size(&mut self, size: u32) -> ControlOutcome {
        if !self.sizes.contains(&size) {
            return ControlOutcome::Unavailable;
        }
        debug!("font size set to {size}");
        self.font_size = size;
        ControlOutcome::Applied
    }

    fn apply_font_family(&mut self, family: &str) -> ControlOutcome {
        match self
            .fonts
            .iter()
            .find(|f| f.eq_ignore_ascii_case(family.trim()))
        {
            Some(known) => {
                debug!("font family set to {known}");
                self.font_family = known.clone();
                ControlOutcome::Applied
            }
            None => ControlOutcome::Unavailable,
        }
    }

    fn apply_alignment(&mut self, alignment: Alignment) -> ControlOutcome {
        debug!("alignment set to {alignment:?}");
        self.alignment = alignment;
        ControlOutcome::Applied
    }

    fn highlight_command_hints(&mut self) {
        self.hints_highlighted = true;
    }
}

/// Feedback sink that renders cues and toasts into the log stream.
#[derive(Debug, Default)]
pub struct TracingFeedback;

impl FeedbackChannel for TracingFeedback {
    fn play_success(&self) {
        debug!("audio cue: success");
    }

    fn play_error(&self) {
        debug!("audio cue: error");
    }

    fn show_toast(&self, message: &str, variant: ToastVariant) {
        info!("[{variant:?}] {message}");
    }
}
