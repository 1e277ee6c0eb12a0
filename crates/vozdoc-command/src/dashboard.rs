//! Command interpreter for the dashboard page.
//!
//! The dashboard listens continuously and only knows how to open the two
//! workspaces, so the dispatch is tiny compared to the editor pages.

use tracing::debug;

use crate::phrases::{contains_phrase, normalize_key};

/// Action resolved from one dashboard utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardAction {
    OpenDocumentEditor,
    OpenMailComposer,
    Unrecognized,
}

#[derive(Debug, Default)]
pub struct DashboardCommandInterpreter;

impl DashboardCommandInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn interpret(&self, utterance: &str) -> DashboardAction {
        let key = normalize_key(utterance);

        if contains_phrase(&key, "crear documento") {
            return DashboardAction::OpenDocumentEditor;
        }

        if contains_phrase(&key, "crear correo") {
            return DashboardAction::OpenMailComposer;
        }

        debug!("unrecognized dashboard utterance: '{}'", key);
        DashboardAction::Unrecognized
    }
}
