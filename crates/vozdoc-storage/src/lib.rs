//! JSON-file persistence for mail drafts and documents.
//!
//! Records live in flat JSON array files, newest first, with a hard cap on
//! list length. Missing or empty files read as empty lists, so first-run
//! needs no setup step.

pub mod documents;
pub mod drafts;
pub mod store;

pub use documents::{DocumentStore, StoredDocument};
pub use drafts::{DraftStore, MailDraft};
pub use store::JsonListStore;
