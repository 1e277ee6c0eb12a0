//! Mail draft persistence.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vozdoc_core::error::Result;

use crate::store::JsonListStore;

const DRAFTS_FILE: &str = "mail_drafts.json";

/// One saved mail draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailDraft {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default)]
    pub bcc: String,
    pub updated_at: DateTime<Utc>,
}

impl MailDraft {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            cc: String::new(),
            bcc: String::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Draft list on disk, newest first, capped.
pub struct DraftStore {
    store: JsonListStore<MailDraft>,
    limit: usize,
}

impl DraftStore {
    pub fn open(data_dir: impl AsRef<Path>, limit: usize) -> Self {
        Self {
            store: JsonListStore::new(data_dir.as_ref().join(DRAFTS_FILE)),
            limit: limit.max(1),
        }
    }

    /// Insert or update a draft. A known id is rewritten in place (keeping
    /// its list position); a new one goes to the front. The list is then
    /// truncated to the cap, dropping the oldest entries.
    pub fn save(&self, draft: &MailDraft) -> Result<()> {
        let mut drafts = self.store.load()?;
        let mut draft = draft.clone();
        draft.updated_at = Utc::now();
        match drafts.iter_mut().find(|d| d.id == draft.id) {
            Some(existing) => *existing = draft,
            None => drafts.insert(0, draft),
        }
        drafts.truncate(self.limit);
        info!("saved draft, {} total", drafts.len());
        self.store.save(&drafts)
    }

    /// All drafts, most recently created first.
    pub fn list(&self) -> Result<Vec<MailDraft>> {
        self.store.load()
    }

    pub fn find(&self, id: Uuid) -> Result<Option<MailDraft>> {
        Ok(self.store.load()?.into_iter().find(|d| d.id == id))
    }

    /// Remove a draft. Returns whether anything was deleted.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut drafts = self.store.load()?;
        let before = drafts.len();
        drafts.retain(|d| d.id != id);
        if drafts.len() == before {
            return Ok(false);
        }
        self.store.save(&drafts)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drafts_are_prepended() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::open(dir.path(), 10);
        store.save(&MailDraft::new("a@x.es", "primero", "")).unwrap();
        store.save(&MailDraft::new("b@x.es", "segundo", "")).unwrap();

        let drafts = store.list().unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].subject, "segundo");
        assert_eq!(drafts[1].subject, "primero");
    }

    #[test]
    fn test_save_updates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::open(dir.path(), 10);
        let mut draft = MailDraft::new("a@x.es", "asunto", "cuerpo");
        store.save(&draft).unwrap();
        store.save(&MailDraft::new("b@x.es", "otro", "")).unwrap();

        draft.body = "cuerpo revisado".to_string();
        store.save(&draft).unwrap();

        let drafts = store.list().unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].id, draft.id);
        assert_eq!(drafts[1].body, "cuerpo revisado");
    }

    #[test]
    fn test_cap_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::open(dir.path(), 3);
        for n in 0..5 {
            store
                .save(&MailDraft::new("a@x.es", format!("asunto {n}"), ""))
                .unwrap();
        }
        let drafts = store.list().unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].subject, "asunto 4");
        assert_eq!(drafts[2].subject, "asunto 2");
    }

    #[test]
    fn test_find_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::open(dir.path(), 10);
        let draft = MailDraft::new("a@x.es", "asunto", "");
        store.save(&draft).unwrap();

        assert!(store.find(draft.id).unwrap().is_some());
        assert!(store.delete(draft.id).unwrap());
        assert!(!store.delete(draft.id).unwrap());
        assert!(store.find(draft.id).unwrap().is_none());
    }
}
