//! Rich-text dictation buffer.
//!
//! The composed text lives as a typed span list rather than a raw string,
//! so formatting tags can never be spliced apart: balance falls out of the
//! structure. Rendering flattens the spans to markup for a rich surface or
//! to plain text for a mail body.

use std::collections::VecDeque;

use tracing::debug;

/// Inline formatting styles the dictation understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleTag {
    Bold,
    Italic,
    Underline,
}

impl StyleTag {
    fn open_markup(self) -> &'static str {
        match self {
            StyleTag::Bold => "<b>",
            StyleTag::Italic => "<i>",
            StyleTag::Underline => "<u>",
        }
    }

    fn close_markup(self) -> &'static str {
        match self {
            StyleTag::Bold => "</b>",
            StyleTag::Italic => "</i>",
            StyleTag::Underline => "</u>",
        }
    }
}

/// One element of the composed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Span {
    Text(String),
    LineBreak,
    ParagraphBreak,
    Open(StyleTag),
    Close(StyleTag),
}

/// How [`DictationBuffer::render`] flattens the spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStyle {
    /// HTML-ish markup for rich surfaces: `<b>`, `<br>`, `<br><br>`.
    Markup,
    /// Plain text for mail bodies: newlines, formatting dropped.
    Plain,
}

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

pub struct DictationBuffer {
    spans: Vec<Span>,
    open_styles: Vec<StyleTag>,
    history: VecDeque<Vec<Span>>,
    undo_depth: usize,
    render_style: RenderStyle,
}

impl DictationBuffer {
    pub fn new(render_style: RenderStyle, undo_depth: usize) -> Self {
        Self {
            spans: Vec::new(),
            open_styles: Vec::new(),
            history: VecDeque::new(),
            undo_depth: undo_depth.max(1),
            render_style,
        }
    }

    /// Reset the buffer from the host surface's current content, so new
    /// dictation continues after what is already there. Existing content is
    /// opaque text; history and open styles start fresh.
    pub fn seed(&mut self, content: &str) {
        self.spans.clear();
        self.open_styles.clear();
        self.history.clear();
        let trimmed = content.trim_end();
        if !trimmed.is_empty() {
            self.spans.push(Span::Text(format!("{trimmed} ")));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Append dictated words followed by a single space.
    pub fn append_words(&mut self, words: &str) {
        let words = words.trim();
        if words.is_empty() {
            return;
        }
        self.spans.push(Span::Text(format!("{words} ")));
    }

    /// Append a punctuation mark glued to the preceding word, followed by a
    /// single space.
    pub fn append_punctuation(&mut self, mark: &str) {
        if let Some(Span::Text(text)) = self.spans.last_mut() {
            let trimmed = text.trim_end().to_string();
            *text = trimmed;
        }
        self.spans.push(Span::Text(format!("{mark} ")));
    }

    pub fn line_break(&mut self) {
        self.spans.push(Span::LineBreak);
    }

    pub fn paragraph_break(&mut self) {
        self.spans.push(Span::ParagraphBreak);
    }

    /// Open a style. Returns `false` without touching the buffer when the
    /// style is already active.
    pub fn open_style(&mut self, tag: StyleTag) -> bool {
        if self.is_style_active(tag) {
            return false;
        }
        debug!("opening style {:?}", tag);
        self.spans.push(Span::Open(tag));
        self.open_styles.push(tag);
        true
    }

    /// Close a style. Returns `false` when the style is not active.
    pub fn close_style(&mut self, tag: StyleTag) -> bool {
        if !self.is_style_active(tag) {
            return false;
        }
        debug!("closing style {:?}", tag);
        self.spans.push(Span::Close(tag));
        if let Some(pos) = self.open_styles.iter().rposition(|open| *open == tag) {
            self.open_styles.remove(pos);
        }
        true
    }

    pub fn is_style_active(&self, tag: StyleTag) -> bool {
        self.open_styles.contains(&tag)
    }

    /// Close every still-open style in reverse-open order, so the rendered
    /// markup nests properly no matter how dictation ended.
    pub fn close_open_tags(&mut self) {
        while let Some(tag) = self.open_styles.pop() {
            self.spans.push(Span::Close(tag));
        }
    }

    /// Delete the last dictated word.
    pub fn remove_last_word(&mut self) {
        loop {
            let replacement = match self.spans.last() {
                None => break,
                Some(Span::Text(text)) => {
                    let trimmed = text.trim_end();
                    if trimmed.is_empty() {
                        None
                    } else {
                        match trimmed.rfind(char::is_whitespace) {
                            Some(idx) if !trimmed[..idx].trim().is_empty() => {
                                Some(format!("{} ", trimmed[..idx].trim_end()))
                            }
                            _ => None,
                        }
                    }
                }
                // A trailing break or tag is not a word; drop it and keep
                // looking.
                Some(_) => {
                    self.spans.pop();
                    continue;
                }
            };
            let had_word = matches!(self.spans.last(), Some(Span::Text(t)) if !t.trim().is_empty());
            match replacement {
                Some(kept) => {
                    if let Some(Span::Text(text)) = self.spans.last_mut() {
                        *text = kept;
                    }
                    break;
                }
                None => {
                    self.spans.pop();
                    if had_word {
                        break;
                    }
                }
            }
        }
        self.rebuild_open_styles();
    }

    /// Delete back to the end of the previous sentence (the last `.`, `!`
    /// or `?` before the tail).
    pub fn remove_last_sentence(&mut self) {
        let mut at_tail = true;
        loop {
            let kept = match self.spans.last() {
                None => break,
                Some(Span::Text(text)) => {
                    let mut kept = text.trim_end().to_string();
                    if at_tail {
                        // A terminator at the very end belongs to the
                        // sentence being removed.
                        while kept.ends_with(SENTENCE_TERMINATORS) {
                            kept.pop();
                        }
                        kept = kept.trim_end().to_string();
                        at_tail = false;
                    }
                    kept
                }
                Some(_) => {
                    at_tail = false;
                    self.spans.pop();
                    continue;
                }
            };
            match kept.rfind(SENTENCE_TERMINATORS) {
                Some(idx) => {
                    if let Some(Span::Text(text)) = self.spans.last_mut() {
                        *text = format!("{} ", &kept[..=idx]);
                    }
                    break;
                }
                None => {
                    self.spans.pop();
                }
            }
        }
        self.rebuild_open_styles();
    }

    /// Delete back to the last paragraph break, or everything when the text
    /// is a single paragraph.
    pub fn remove_last_paragraph(&mut self) {
        while let Some(span) = self.spans.last() {
            if matches!(span, Span::ParagraphBreak) {
                break;
            }
            self.spans.pop();
        }
        // Drop the break itself too; a trailing empty paragraph is useless.
        if matches!(self.spans.last(), Some(Span::ParagraphBreak)) {
            self.spans.pop();
        }
        self.rebuild_open_styles();
    }

    /// Record the current state for a later [`undo`](Self::undo). History
    /// depth is bounded; the oldest snapshot falls off.
    pub fn snapshot(&mut self) {
        if self.history.len() == self.undo_depth {
            self.history.pop_front();
        }
        self.history.push_back(self.spans.clone());
    }

    /// Restore the most recent snapshot. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(spans) => {
                self.spans = spans;
                self.rebuild_open_styles();
                true
            }
            None => false,
        }
    }

    /// Flatten the spans to a string per the configured render style.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match (span, self.render_style) {
                (Span::Text(text), _) => out.push_str(text),
                (Span::LineBreak, RenderStyle::Markup) => out.push_str("<br>"),
                (Span::LineBreak, RenderStyle::Plain) => out.push('\n'),
                (Span::ParagraphBreak, RenderStyle::Markup) => out.push_str("<br><br>"),
                (Span::ParagraphBreak, RenderStyle::Plain) => out.push_str("\n\n"),
                (Span::Open(tag), RenderStyle::Markup) => out.push_str(tag.open_markup()),
                (Span::Close(tag), RenderStyle::Markup) => out.push_str(tag.close_markup()),
                (Span::Open(_), RenderStyle::Plain) | (Span::Close(_), RenderStyle::Plain) => {}
            }
        }
        out
    }

    /// Derive the open-style stack from the spans after a structural edit
    /// may have removed opens or closes.
    fn rebuild_open_styles(&mut self) {
        self.open_styles.clear();
        for span in &self.spans {
            match span {
                Span::Open(tag) => self.open_styles.push(*tag),
                Span::Close(tag) => {
                    if let Some(pos) = self.open_styles.iter().rposition(|open| open == tag) {
                        self.open_styles.remove(pos);
                    }
                }
                _ => {}
            }
        }
    }
}
