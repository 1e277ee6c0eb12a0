//! Saved document persistence.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vozdoc_core::error::Result;

use crate::store::JsonListStore;

const DOCUMENTS_FILE: &str = "documents.json";

/// One saved document (title plus rendered content).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Document list on disk; same newest-first capped contract as drafts.
pub struct DocumentStore {
    store: JsonListStore<StoredDocument>,
    limit: usize,
}

impl DocumentStore {
    pub fn open(data_dir: impl AsRef<Path>, limit: usize) -> Self {
        Self {
            store: JsonListStore::new(data_dir.as_ref().join(DOCUMENTS_FILE)),
            limit: limit.max(1),
        }
    }

    pub fn save(&self, document: &StoredDocument) -> Result<()> {
        let mut documents = self.store.load()?;
        let mut document = document.clone();
        document.updated_at = Utc::now();
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.insert(0, document),
        }
        documents.truncate(self.limit);
        info!("saved document, {} total", documents.len());
        self.store.save(&documents)
    }

    pub fn list(&self) -> Result<Vec<StoredDocument>> {
        self.store.load()
    }

    pub fn find(&self, id: Uuid) -> Result<Option<StoredDocument>> {
        Ok(self.store.load()?.into_iter().find(|d| d.id == id))
    }

    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut documents = self.store.load()?;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Ok(false);
        }
        self.store.save(&documents)?;
        Ok(true)
    }
}
