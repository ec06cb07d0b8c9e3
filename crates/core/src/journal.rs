use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Amount;

/// A finalized transaction journal as the rule engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionJournal {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount of the journal's source side.
    pub amount: Amount,
    /// Amount booked on the destination side, when one was recorded.
    pub destination_amount: Option<Amount>,
}

impl TransactionJournal {
    pub fn new(id: i64, date: NaiveDate, description: &str, amount: Amount) -> Self {
        TransactionJournal {
            id,
            date,
            description: description.to_string(),
            amount,
            destination_amount: None,
        }
    }

    pub fn with_destination_amount(mut self, amount: Amount) -> Self {
        self.destination_amount = Some(amount);
        self
    }

    pub fn amount_positive(&self) -> Amount {
        self.amount.abs()
    }
}

/// A metadata entry stored against a persisted journal (`name = "importHash"` etc).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalMeta {
    pub transaction_journal_id: i64,
    pub name: String,
    /// JSON-encoded value, exactly as stored.
    pub data: String,
}

impl JournalMeta {
    pub const IMPORT_HASH: &'static str = "importHash";

    pub fn new(transaction_journal_id: i64, name: &str, data: &str) -> Self {
        JournalMeta {
            transaction_journal_id,
            name: name.to_string(),
            data: data.to_string(),
        }
    }

    pub fn is_import_hash(&self) -> bool {
        self.name == Self::IMPORT_HASH
    }
}
