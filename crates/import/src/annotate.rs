use serde::{Deserialize, Serialize};
use std::fmt;

use crate::row::RowField;

/// Meaning of a value to the stages that turn pending journals into ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Amount,
    DateTransaction,
    Description,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Amount => "amount",
            Role::DateTransaction => "date-transaction",
            Role::Description => "description",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field key → role. Keys missing here (`type`, `memo`, ...) are dropped.
pub const ROLE_MAP: &[(&str, Role)] = &[
    ("amount", Role::Amount),
    ("date", Role::DateTransaction),
    ("name", Role::Description),
];

pub fn role_for(key: &str) -> Option<Role> {
    ROLE_MAP
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, role)| *role)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedField {
    pub role: Role,
    pub value: String,
}

/// Characters stripped from both ends of a value. Non-breaking spaces are kept.
const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Trims `value` and attaches the role for `key`. Blank values and unmapped keys yield `None`.
pub fn annotate(key: &str, value: &str) -> Option<AnnotatedField> {
    let value = value.trim_matches(TRIMMED);
    if value.is_empty() {
        return None;
    }
    role_for(key).map(|role| AnnotatedField {
        role,
        value: value.to_string(),
    })
}

pub fn annotate_field(field: RowField, value: &str) -> Option<AnnotatedField> {
    annotate(field.key(), value)
}
