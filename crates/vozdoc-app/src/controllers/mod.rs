//! Page controllers.
//!
//! One controller per page owns that page's interpreters, surfaces and
//! stores, and translates interpreted actions into state changes and mode
//! requests. The recognition-mode handlers in the runtime layer are thin
//! shims over these controllers.

pub mod dashboard;
pub mod document;
pub mod mail;

pub use dashboard::{DashboardController, Page};
pub use document::DocumentController;
pub use mail::MailController;

/// Mode names shared by the pages.
pub const MODE_COMMAND: &str = "command";
pub const MODE_DICTATION: &str = "dictation";
pub const MODE_LISTENING: &str = "listening";
pub const MODE_DICTATE_RECIPIENT: &str = "dictate_recipient";
pub const MODE_DICTATE_SUBJECT: &str = "dictate_subject";

/// Drop markup tags and turn break tags into whitespace, for read-aloud
/// and plain-text export of rich content.
pub(crate) fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = &rest[start..start + end + 1];
                if tag.eq_ignore_ascii_case("<br>") {
                    out.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Uppercase the first character, leaving the rest untouched.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
