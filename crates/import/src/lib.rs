pub mod annotate;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod hash;
pub mod journal;
pub mod ofx;
pub mod progress;
pub mod row;
pub mod runner;

pub use annotate::{annotate, AnnotatedField, Role};
pub use config::{ConfigError, ConfigurationProvider, JobConfiguration};
pub use dedupe::{already_imported, DuplicateIndex, DuplicatePolicy, StoredHashes};
pub use error::ImportError;
pub use hash::{row_hash, HashError};
pub use journal::{JournalBuilder, PendingImportJournal};
pub use ofx::{OfxError, OfxStatement, OfxTransaction};
pub use progress::{ImportProgress, ProgressSink};
pub use row::{RawTransactionRow, RowField};
pub use runner::{ImportRunner, RunState};

pub mod import {
    use crate::*;
    use fennel_core::UserId;

    pub fn parse_ofx(data: &[u8]) -> Result<Vec<RawTransactionRow>, OfxError> {
        crate::ofx::parse(data)
    }

    /// One-shot import with a fresh in-memory progress tracker.
    pub fn import_ofx<D: DuplicateIndex, C: ConfigurationProvider>(
        data: &[u8],
        user: UserId,
        duplicates: D,
        config: C,
    ) -> Result<(Vec<PendingImportJournal>, ImportProgress), ImportError> {
        let mut runner = ImportRunner::new(user, ImportProgress::new(), duplicates, config);
        let journals = runner.run(data)?;
        Ok((journals, runner.into_progress()))
    }
}
