use super::store::{SettingValue, SettingsStore};
use crate::error::{FvtError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory settings store.
#[derive(Debug, Default, Clone)]
pub struct MemSettings {
    values: BTreeMap<String, SettingValue>,
    simulate_write_error: bool,
}

impl MemSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: BTreeMap<String, SettingValue>) -> Self {
        Self {
            values,
            simulate_write_error: false,
        }
    }

    pub fn values(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error {
            return Err(FvtError::Settings("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl SettingsStore for MemSettings {
    fn value(&self, key: &str) -> Result<Option<SettingValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.check_writable()?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn child_groups(&self, group: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", group);
        let groups: BTreeSet<String> = self
            .values
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter_map(|rest| rest.split_once('/'))
            .map(|(child, _)| child.to_string())
            .collect();
        Ok(groups.into_iter().collect())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_writable()?;
        let prefix = format!("{}/", key);
        self.values
            .retain(|k, _| k != key && !k.starts_with(&prefix));
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_groups_lists_direct_children_only() {
        let mut store = MemSettings::new();
        store.set_value("NS/featureLimit", 5i64.into()).unwrap();
        store.set_value("NS/a/attributes", "x".into()).unwrap();
        store.set_value("NS/a/filters", "y".into()).unwrap();
        store.set_value("NS/b/deep/key", "z".into()).unwrap();
        store.set_value("Other/c/attributes", "w".into()).unwrap();

        assert_eq!(store.child_groups("NS").unwrap(), vec!["a", "b"]);
        assert_eq!(store.child_groups("NS/b").unwrap(), vec!["deep"]);
        assert!(store.child_groups("Missing").unwrap().is_empty());
    }

    #[test]
    fn remove_drops_whole_group() {
        let mut store = MemSettings::new();
        store.set_value("NS/a/attributes", "x".into()).unwrap();
        store.set_value("NS/ab/attributes", "keep".into()).unwrap();
        store.remove("NS/a").unwrap();

        assert_eq!(store.value("NS/a/attributes").unwrap(), None);
        assert!(store.value("NS/ab/attributes").unwrap().is_some());
    }

    #[test]
    fn simulated_write_error() {
        let mut store = MemSettings::new();
        store.set_simulate_write_error(true);
        assert!(store.set_value("k", 1i64.into()).is_err());
    }
}
