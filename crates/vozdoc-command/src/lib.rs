//! Spoken-command interpretation.
//!
//! One interpreter per page maps a single finalized utterance to exactly one
//! action via an ordered list of predicates evaluated top to bottom. The
//! order is a documented contract: reordering changes user-visible behavior.
//! Shared phrase utilities (normalization, stop-phrase detection and
//! excision) live in [`phrases`] and are also consumed by the dictation
//! transcript processor for its inline command detection.

pub mod dashboard;
pub mod document;
pub mod mail;
pub mod phrases;

pub use dashboard::{DashboardAction, DashboardCommandInterpreter};
pub use document::{DocumentAction, DocumentCommandInterpreter, ExportFormat};
pub use mail::{MailAction, MailCommandInterpreter, MailTab};
