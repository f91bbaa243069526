use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A stored setting. Hosts keep either text or integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

impl SettingValue {
    /// Integer reading; text is parsed after trimming.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            SettingValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            SettingValue::Int(i) => i.to_string(),
            SettingValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

/// Abstract interface for a hierarchical key-value settings store.
///
/// Keys are slash-separated paths (`Namespace/layer_id/attributes`); every
/// path prefix is a group.
pub trait SettingsStore {
    /// Read a value. Returns Ok(None) when the key is not set.
    fn value(&self, key: &str) -> Result<Option<SettingValue>>;

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<()>;

    /// Names of the groups directly below `group`.
    fn child_groups(&self, group: &str) -> Result<Vec<String>>;

    /// Remove a key and everything below it.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Flush pending writes to the backing storage.
    fn sync(&mut self) -> Result<()>;
}

/// Join path segments into a settings key.
pub fn key(segments: &[&str]) -> String {
    segments.join("/")
}
