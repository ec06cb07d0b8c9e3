use chrono::NaiveDate;
use fennel_core::{AccountId, Amount, UserId};
use serde::{Deserialize, Serialize};

use crate::annotate::{annotate_field, AnnotatedField, Role};
use crate::config::ConfigurationProvider;
use crate::error::ImportError;
use crate::hash::row_hash;
use crate::row::RawTransactionRow;

/// One imported row, annotated and waiting to be turned into a ledger journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingImportJournal {
    user: UserId,
    hash: String,
    fields: Vec<AnnotatedField>,
    asset_account: AccountId,
}

impl PendingImportJournal {
    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn fields(&self) -> &[AnnotatedField] {
        &self.fields
    }

    pub fn asset_account(&self) -> AccountId {
        self.asset_account
    }

    pub fn value(&self, role: Role) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.role == role)
            .map(|f| f.value.as_str())
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.value(role).is_some()
    }

    pub fn description(&self) -> Option<&str> {
        self.value(Role::Description)
    }

    pub fn amount(&self) -> Option<Amount> {
        self.value(Role::Amount)?.parse().ok()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.value(Role::DateTransaction)?, "%Y/%m/%d").ok()
    }
}

/// Turns raw rows into pending journals for one user and job configuration.
pub struct JournalBuilder<'a, C: ConfigurationProvider + ?Sized> {
    user: UserId,
    config: &'a C,
}

impl<'a, C: ConfigurationProvider + ?Sized> JournalBuilder<'a, C> {
    pub fn new(user: UserId, config: &'a C) -> Self {
        Self { user, config }
    }

    pub fn build(
        &self,
        index: usize,
        row: &RawTransactionRow,
    ) -> Result<PendingImportJournal, ImportError> {
        tracing::debug!(index, "Now at row");
        let hash = row_hash(row)?;

        let fields = row
            .iter()
            .filter_map(|(field, value)| annotate_field(field, value))
            .inspect(|a| tracing::debug!(role = %a.role, value = %a.value, "Annotated value"))
            .collect();

        let asset_account = self.config.import_account()?;

        Ok(PendingImportJournal {
            user: self.user,
            hash,
            fields,
            asset_account,
        })
    }
}
