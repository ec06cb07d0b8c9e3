use fennel_core::TransactionJournal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount_less::AmountLess;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Unknown trigger type: '{0}'")]
    UnknownType(String),
    #[error("Trigger '{0}' would match every transaction")]
    MatchesEverything(String),
    #[error("Invalid value for trigger '{trigger}': {value}")]
    InvalidValue { trigger: String, value: String },
    #[error("Failed to parse TOML: {0}")]
    Parse(String),
}

/// A configurable predicate the rule engine evaluates against one finalized journal.
pub trait Trigger: Send + Sync {
    fn triggered(&self, journal: &TransactionJournal) -> bool;

    /// When true, later triggers of the same rule are not evaluated after this one fires.
    fn stop_processing(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    AmountLess,
}

impl TriggerType {
    pub fn key(self) -> &'static str {
        match self {
            TriggerType::AmountLess => "amount_less",
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amount_less" => Ok(TriggerType::AmountLess),
            other => Err(TriggerError::UnknownType(other.to_string())),
        }
    }
}

/// A trigger as a user defined it, before it is checked and built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub trigger_type: String,
    pub value: Option<String>,
    #[serde(default)]
    pub stop_processing: bool,
}

#[derive(Deserialize)]
struct TriggerFile {
    #[serde(default)]
    triggers: Vec<TriggerSpec>,
}

impl TriggerSpec {
    pub fn new(trigger_type: &str, value: Option<&str>) -> Self {
        TriggerSpec {
            trigger_type: trigger_type.to_string(),
            value: value.map(str::to_string),
            stop_processing: false,
        }
    }

    /// Reads a `[[triggers]]` array.
    pub fn from_toml(toml_content: &str) -> Result<Vec<TriggerSpec>, TriggerError> {
        let file: TriggerFile =
            toml::from_str(toml_content).map_err(|e| TriggerError::Parse(e.to_string()))?;
        Ok(file.triggers)
    }
}

/// Builds a trigger, refusing unknown types and triggers that would match everything.
pub fn make_trigger(spec: &TriggerSpec) -> Result<Box<dyn Trigger>, TriggerError> {
    let kind: TriggerType = spec.trigger_type.parse()?;
    let value = spec.value.as_deref();
    match kind {
        TriggerType::AmountLess => {
            if AmountLess::will_match_everything(value) {
                return Err(TriggerError::MatchesEverything(kind.key().to_string()));
            }
            let trigger = AmountLess::new(value.unwrap_or_default(), spec.stop_processing)?;
            Ok(Box::new(trigger))
        }
    }
}
