use fennel_core::JournalMeta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::hash::{stored_form, HashError};

/// Read-side lookup into journal metadata persisted by earlier imports.
pub trait DuplicateIndex {
    /// Finds an `importHash` metadata entry whose stored data equals `json_hash`.
    fn find_journal_meta_by_hash(&self, json_hash: &str) -> Option<JournalMeta>;
}

impl<T: DuplicateIndex + ?Sized> DuplicateIndex for &T {
    fn find_journal_meta_by_hash(&self, json_hash: &str) -> Option<JournalMeta> {
        (**self).find_journal_meta_by_hash(json_hash)
    }
}

/// True when a journal carrying this row hash was already persisted.
pub fn already_imported<D: DuplicateIndex + ?Sized>(
    index: &D,
    hash: &str,
) -> Result<bool, HashError> {
    let json = stored_form(hash)?;
    Ok(index.find_journal_meta_by_hash(&json).is_some())
}

/// In-memory index over persisted `importHash` metadata.
#[derive(Debug, Clone, Default)]
pub struct StoredHashes {
    by_data: HashMap<String, JournalMeta>,
}

impl StoredHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metadata entry. Entries not named `importHash` are ignored.
    pub fn insert(&mut self, meta: JournalMeta) {
        if meta.is_import_hash() {
            self.by_data.entry(meta.data.clone()).or_insert(meta);
        }
    }

    /// Records `hash` as imported by journal `transaction_journal_id`.
    pub fn record(&mut self, transaction_journal_id: i64, hash: &str) -> Result<(), HashError> {
        let data = stored_form(hash)?;
        self.insert(JournalMeta::new(
            transaction_journal_id,
            JournalMeta::IMPORT_HASH,
            &data,
        ));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_data.is_empty()
    }
}

impl FromIterator<JournalMeta> for StoredHashes {
    fn from_iter<I: IntoIterator<Item = JournalMeta>>(iter: I) -> Self {
        let mut index = StoredHashes::new();
        for meta in iter {
            index.insert(meta);
        }
        index
    }
}

impl DuplicateIndex for StoredHashes {
    fn find_journal_meta_by_hash(&self, json_hash: &str) -> Option<JournalMeta> {
        self.by_data.get(json_hash).cloned()
    }
}

/// What the runner does with rows whose hash was already imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Report the duplicate, then build and emit the row anyway.
    #[default]
    Reimport,
    /// Report the duplicate and leave it out of the output.
    Skip,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reimport" => Ok(DuplicatePolicy::Reimport),
            "skip" => Ok(DuplicatePolicy::Skip),
            other => Err(format!("Unknown duplicate policy: '{other}'")),
        }
    }
}
