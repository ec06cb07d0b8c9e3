use fennel_core::UserId;
use std::collections::BTreeSet;

use crate::config::ConfigurationProvider;
use crate::dedupe::{already_imported, DuplicateIndex, DuplicatePolicy};
use crate::error::ImportError;
use crate::hash::row_hash;
use crate::journal::{JournalBuilder, PendingImportJournal};
use crate::ofx;
use crate::progress::ProgressSink;
use crate::row::RawTransactionRow;

/// Steps an already-imported row accounts for: the whole per-row pipeline.
pub const DUPLICATE_ROW_STEPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Parsing,
    RowProcessing,
    Done,
}

/// Orchestrates: parse → duplicate check → build one pending journal per row.
///
/// With the default [`DuplicatePolicy::Reimport`], rows that were imported
/// before are reported to the progress sink but still built and returned.
pub struct ImportRunner<P: ProgressSink, D: DuplicateIndex, C: ConfigurationProvider> {
    user: UserId,
    progress: P,
    duplicates: D,
    config: C,
    policy: Option<DuplicatePolicy>,
    state: RunState,
}

impl<P: ProgressSink, D: DuplicateIndex, C: ConfigurationProvider> ImportRunner<P, D, C> {
    pub fn new(user: UserId, progress: P, duplicates: D, config: C) -> Self {
        Self {
            user,
            progress,
            duplicates,
            config,
            policy: None,
            state: RunState::NotStarted,
        }
    }

    /// Overrides the `duplicate-policy` configuration value.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn into_progress(self) -> P {
        self.progress
    }

    /// Imports one OFX document. Journals come back in statement order.
    pub fn run(&mut self, content: &[u8]) -> Result<Vec<PendingImportJournal>, ImportError> {
        tracing::debug!("OFX import run started");
        let policy = match self.policy {
            Some(policy) => policy,
            None => self.config.duplicate_policy()?,
        };

        self.state = RunState::Parsing;
        let rows = ofx::parse(content)?;
        tracing::info!("Building importable objects from OFX file.");
        tracing::debug!(entries = rows.len(), "Number of entries");

        self.state = RunState::RowProcessing;
        let duplicates = self.report_duplicates(&rows)?;
        tracing::debug!(
            left = rows.len() - duplicates.len(),
            "Number of entries left"
        );

        let to_build = match policy {
            DuplicatePolicy::Reimport => rows.len(),
            DuplicatePolicy::Skip => rows.len() - duplicates.len(),
        };
        self.progress
            .set_total_steps(to_build + duplicates.len() * DUPLICATE_ROW_STEPS);

        let builder = JournalBuilder::new(self.user, &self.config);
        let journals = rows
            .iter()
            .enumerate()
            .filter(|(index, _)| policy == DuplicatePolicy::Reimport || !duplicates.contains(index))
            .try_fold(Vec::with_capacity(to_build), |mut journals, (index, row)| {
                journals.push(builder.build(index, row)?);
                self.progress.add_steps_done(1);
                Ok::<_, ImportError>(journals)
            })?;

        self.state = RunState::Done;
        tracing::info!(journals = journals.len(), ?policy, "OFX import finished");
        Ok(journals)
    }

    /// Reports every row whose hash is already stored. Returns their indices.
    fn report_duplicates(
        &mut self,
        rows: &[RawTransactionRow],
    ) -> Result<BTreeSet<usize>, ImportError> {
        let mut found = BTreeSet::new();
        for (index, row) in rows.iter().enumerate() {
            let hash = row_hash(row)?;
            if already_imported(&self.duplicates, &hash)? {
                let message = format!("Row #{index} has already been imported.");
                self.progress.add_error(index, &message);
                self.progress.add_steps_done(DUPLICATE_ROW_STEPS);
                tracing::info!("{message}");
                found.insert(index);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::Role;
    use crate::config::{ConfigError, JobConfiguration, DUPLICATE_POLICY, IMPORT_ACCOUNT};
    use crate::dedupe::StoredHashes;
    use crate::ofx::OfxError;
    use crate::progress::ImportProgress;
    use fennel_core::AccountId;

    #[derive(Debug, PartialEq)]
    enum Event {
        Error(usize, String),
        Steps(usize),
        Total(usize),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
    }

    impl RecordingSink {
        fn steps(&self) -> Vec<usize> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Steps(n) => Some(*n),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<(usize, &str)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Error(i, m) => Some((*i, m.as_str())),
                    _ => None,
                })
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn add_error(&mut self, index: usize, message: &str) {
            self.events.push(Event::Error(index, message.to_string()));
        }

        fn add_steps_done(&mut self, count: usize) {
            self.events.push(Event::Steps(count));
        }

        fn set_total_steps(&mut self, total: usize) {
            self.events.push(Event::Total(total));
        }
    }

    const THREE_TXN_OFX: &str = r#"
OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>USD
<BANKACCTFROM>
<BANKID>123456789
<ACCTID>000112345
<ACCTTYPE>CHECKING
</BANKACCTFROM>
<BANKTRANLIST>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240115
<TRNAMT>-49.99
<NAME>AMAZON MARKETPLACE
<MEMO>Online purchase
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240120
<TRNAMT>1500.00
<NAME>DIRECT DEPOSIT
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240125
<TRNAMT>-5.25
<NAME>STARBUCKS
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
"#;

    fn config() -> JobConfiguration {
        JobConfiguration::new().with(IMPORT_ACCOUNT, 2)
    }

    fn stored_hash_of_row(index: usize) -> StoredHashes {
        let rows = ofx::parse(THREE_TXN_OFX.as_bytes()).unwrap();
        let mut stored = StoredHashes::new();
        stored.record(99, &row_hash(&rows[index]).unwrap()).unwrap();
        stored
    }

    #[test]
    fn imports_every_row_when_nothing_stored() {
        let mut sink = RecordingSink::default();
        let stored = StoredHashes::new();
        let mut runner = ImportRunner::new(UserId(1), &mut sink, &stored, config());
        assert_eq!(runner.state(), RunState::NotStarted);

        let journals = runner.run(THREE_TXN_OFX.as_bytes()).unwrap();
        assert_eq!(runner.state(), RunState::Done);
        drop(runner);

        assert_eq!(journals.len(), 3);
        for journal in &journals {
            assert!(journal.has_role(Role::Amount));
            assert!(journal.has_role(Role::DateTransaction));
            assert_eq!(journal.asset_account(), AccountId(2));
            assert_eq!(journal.user(), UserId(1));
        }
        assert_eq!(sink.steps(), vec![1, 1, 1]);
        assert!(sink.errors().is_empty());
        assert_eq!(sink.events[0], Event::Total(3));
    }

    #[test]
    fn journals_keep_statement_order() {
        let stored = StoredHashes::new();
        let mut runner =
            ImportRunner::new(UserId(1), ImportProgress::new(), &stored, config());
        let journals = runner.run(THREE_TXN_OFX.as_bytes()).unwrap();
        let descriptions: Vec<_> = journals.iter().filter_map(|j| j.description()).collect();
        assert_eq!(
            descriptions,
            vec!["AMAZON MARKETPLACE", "DIRECT DEPOSIT", "STARBUCKS"]
        );
    }

    #[test]
    fn duplicate_is_reported_but_still_imported() {
        let mut sink = RecordingSink::default();
        let stored = stored_hash_of_row(1);
        let mut runner = ImportRunner::new(UserId(1), &mut sink, &stored, config());

        let journals = runner.run(THREE_TXN_OFX.as_bytes()).unwrap();
        drop(runner);

        assert_eq!(journals.len(), 3);
        assert_eq!(sink.errors(), vec![(1, "Row #1 has already been imported.")]);
        assert_eq!(sink.steps(), vec![DUPLICATE_ROW_STEPS, 1, 1, 1]);
    }

    #[test]
    fn skip_policy_leaves_duplicates_out() {
        let mut sink = RecordingSink::default();
        let stored = stored_hash_of_row(1);
        let mut runner = ImportRunner::new(UserId(1), &mut sink, &stored, config())
            .with_duplicate_policy(DuplicatePolicy::Skip);

        let journals = runner.run(THREE_TXN_OFX.as_bytes()).unwrap();
        drop(runner);

        let descriptions: Vec<_> = journals.iter().filter_map(|j| j.description()).collect();
        assert_eq!(descriptions, vec!["AMAZON MARKETPLACE", "STARBUCKS"]);
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(sink.steps(), vec![DUPLICATE_ROW_STEPS, 1, 1]);
        assert!(sink.events.contains(&Event::Total(2 + DUPLICATE_ROW_STEPS)));
    }

    #[test]
    fn skip_policy_from_configuration() {
        let stored = stored_hash_of_row(0);
        let config = config().with(DUPLICATE_POLICY, "skip");
        let mut runner = ImportRunner::new(UserId(1), ImportProgress::new(), &stored, config);
        assert_eq!(runner.run(THREE_TXN_OFX.as_bytes()).unwrap().len(), 2);

        let progress = runner.into_progress();
        assert_eq!(progress.errors_at(0), ["Row #0 has already been imported."]);
        assert_eq!(progress.steps_done(), DUPLICATE_ROW_STEPS + 2);
    }

    #[test]
    fn rerun_of_same_file_flags_every_row() {
        let stored = StoredHashes::new();
        let mut first = ImportRunner::new(UserId(1), ImportProgress::new(), &stored, config());
        let journals = first.run(THREE_TXN_OFX.as_bytes()).unwrap();

        let mut persisted = StoredHashes::new();
        for (id, journal) in journals.iter().enumerate() {
            persisted.record(id as i64, journal.hash()).unwrap();
        }

        let mut second =
            ImportRunner::new(UserId(1), ImportProgress::new(), &persisted, config());
        let again = second.run(THREE_TXN_OFX.as_bytes()).unwrap();
        assert_eq!(again.len(), 3);

        let progress = second.into_progress();
        assert_eq!(progress.error_count(), 3);
        assert_eq!(progress.steps_done(), 3 * DUPLICATE_ROW_STEPS + 3);
    }

    #[test]
    fn two_accounts_abort_without_progress() {
        let two = r#"
<OFX><BANKMSGSRSV1>
<STMTTRNRS><STMTRS><BANKACCTFROM><ACCTID>1</BANKACCTFROM>
<BANKTRANLIST><STMTTRN><DTPOSTED>20240101<TRNAMT>1</STMTTRN></BANKTRANLIST>
</STMTRS></STMTTRNRS>
<STMTTRNRS><STMTRS><BANKACCTFROM><ACCTID>2</BANKACCTFROM>
<BANKTRANLIST></BANKTRANLIST>
</STMTRS></STMTTRNRS>
</BANKMSGSRSV1></OFX>
"#;
        let mut sink = RecordingSink::default();
        let stored = StoredHashes::new();
        let mut runner = ImportRunner::new(UserId(1), &mut sink, &stored, config());

        let err = runner.run(two.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Format(OfxError::MultipleAccounts(2))));
        assert_eq!(runner.state(), RunState::Parsing);
        drop(runner);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn zero_accounts_is_an_empty_run() {
        let stored = StoredHashes::new();
        let mut runner = ImportRunner::new(UserId(1), ImportProgress::new(), &stored, config());
        let journals = runner.run(b"<OFX></OFX>").unwrap();
        assert!(journals.is_empty());
        assert_eq!(runner.state(), RunState::Done);
        assert_eq!(runner.into_progress().steps_done(), 0);
    }

    #[test]
    fn missing_import_account_aborts_run() {
        let mut sink = RecordingSink::default();
        let stored = StoredHashes::new();
        let mut runner =
            ImportRunner::new(UserId(1), &mut sink, &stored, JobConfiguration::new());

        let err = runner.run(THREE_TXN_OFX.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Configuration(ConfigError::Missing(_))
        ));
        drop(runner);
        assert!(sink.steps().is_empty());
    }
}
