use fennel_core::AccountId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::dedupe::DuplicatePolicy;

/// Asset account every imported journal is booked against.
pub const IMPORT_ACCOUNT: &str = "import-account";
/// Optional; see [`DuplicatePolicy`].
pub const DUPLICATE_POLICY: &str = "duplicate-policy";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Read access to an import job's configuration.
pub trait ConfigurationProvider {
    fn value(&self, key: &str) -> Option<&Value>;

    /// `import-account` as an account id. Accepts integers and numeric strings.
    fn import_account(&self) -> Result<AccountId, ConfigError> {
        let value = self
            .value(IMPORT_ACCOUNT)
            .ok_or_else(|| ConfigError::Missing(IMPORT_ACCOUNT.to_string()))?;
        let invalid = || ConfigError::Invalid {
            key: IMPORT_ACCOUNT.to_string(),
            value: value.to_string(),
        };
        match value {
            Value::Number(n) => n.as_i64().map(AccountId).ok_or_else(invalid),
            Value::String(s) => s.parse().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    fn duplicate_policy(&self) -> Result<DuplicatePolicy, ConfigError> {
        match self.value(DUPLICATE_POLICY) {
            None | Some(Value::Null) => Ok(DuplicatePolicy::default()),
            Some(Value::String(s)) => s.parse().map_err(|_| ConfigError::Invalid {
                key: DUPLICATE_POLICY.to_string(),
                value: s.clone(),
            }),
            Some(other) => Err(ConfigError::Invalid {
                key: DUPLICATE_POLICY.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl<T: ConfigurationProvider + ?Sized> ConfigurationProvider for &T {
    fn value(&self, key: &str) -> Option<&Value> {
        (**self).value(key)
    }
}

/// Key/value configuration blob attached to an import job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfiguration(BTreeMap<String, Value>);

impl JobConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl ConfigurationProvider for JobConfiguration {
    fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
