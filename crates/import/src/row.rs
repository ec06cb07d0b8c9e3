use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fields extracted from each OFX transaction.
///
/// Declaration order is the canonical key order used when a row is encoded
/// for hashing, so do not reorder the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowField {
    Type,
    Amount,
    Date,
    Name,
    Memo,
}

impl RowField {
    pub const ALL: [RowField; 5] = [
        RowField::Type,
        RowField::Amount,
        RowField::Date,
        RowField::Name,
        RowField::Memo,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RowField::Type => "type",
            RowField::Amount => "amount",
            RowField::Date => "date",
            RowField::Name => "name",
            RowField::Memo => "memo",
        }
    }
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RowField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("Unknown row field: '{s}'"))
    }
}

/// One transaction as string values keyed by field, straight from the statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransactionRow {
    fields: BTreeMap<RowField, String>,
}

impl RawTransactionRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: RowField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: RowField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: RowField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RowField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
