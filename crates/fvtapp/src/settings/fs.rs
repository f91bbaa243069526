use super::memory::MemSettings;
use super::store::{SettingValue, SettingsStore};
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings persisted as a flat JSON object of `key -> value`.
///
/// Reads are served from memory; writes mark the store dirty and are flushed
/// atomically by [`SettingsStore::sync`].
pub struct FileSettings {
    path: PathBuf,
    inner: MemSettings,
    dirty: bool,
}

impl FileSettings {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values: BTreeMap<String, SettingValue> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            inner: MemSettings::from_values(values),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn value(&self, key: &str) -> Result<Option<SettingValue>> {
        self.inner.value(key)
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.inner.set_value(key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn child_groups(&self, group: &str) -> Result<Vec<String>> {
        self.inner.child_groups(group)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.inner.remove(key)?;
        self.dirty = true;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(self.inner.values())?;
        let tmp = dir.join(format!(".settings-{}.tmp", std::process::id()));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}
