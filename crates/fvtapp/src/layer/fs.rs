use super::memory::{LayerData, MemLayer};
use super::VectorLayer;
use crate::error::{FvtError, Result};
use crate::model::{Feature, FeatureId, Field, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name suffix that marks a layer document.
pub const LAYER_SUFFIX: &str = ".layer.json";

/// On-disk shape of a layer.
///
/// ```json
/// {
///   "id": "cities_1",
///   "name": "Cities",
///   "fields": [{ "name": "name", "type": "text" }],
///   "features": [{ "id": 1, "attributes": { "name": "Jackson" } }],
///   "subset": ""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub subset: String,
}

/// A vector layer stored as a JSON document.
///
/// All editing happens in an inner [`MemLayer`]. A commit writes the pending
/// state to disk before applying it, and a filter change is undone when the
/// write fails, so the layer never holds state the document does not.
pub struct FileLayer {
    path: PathBuf,
    inner: MemLayer,
}

impl FileLayer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let doc: LayerDocument = serde_json::from_str(&content)?;
        let data = LayerData {
            fields: doc.fields,
            features: doc.features.into_iter().map(|f| (f.id, f)).collect(),
        };
        let inner = MemLayer::from_parts(doc.id, doc.name, data, &doc.subset)?;
        Ok(Self { path, inner })
    }

    /// Write `doc` to `path` and open it.
    pub fn create(path: impl AsRef<Path>, doc: &LayerDocument) -> Result<Self> {
        write_atomic(path.as_ref(), &serde_json::to_string_pretty(doc)?)?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn document(&self, data: &LayerData) -> LayerDocument {
        LayerDocument {
            id: self.inner.id().to_string(),
            name: self.inner.name().to_string(),
            fields: data.fields.clone(),
            features: data.features.values().cloned().collect(),
            subset: self.inner.subset_string().to_string(),
        }
    }

    fn persist(&self, data: &LayerData) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.document(data))?;
        write_atomic(&self.path, &content)?;
        debug!(path = %self.path.display(), "layer document written");
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FvtError::HostQuery(format!("Invalid layer path {}", path.display())))?;

    let tmp = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl VectorLayer for FileLayer {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fields(&self) -> Vec<Field> {
        self.inner.fields()
    }

    fn is_editable(&self) -> bool {
        self.inner.is_editable()
    }

    fn start_editing(&mut self) -> Result<()> {
        self.inner.start_editing()
    }

    fn commit_changes(&mut self) -> Result<()> {
        if let Some(pending) = self.inner.pending() {
            self.persist(pending)?;
        }
        self.inner.commit_changes()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }

    fn add_attribute(&mut self, field: Field) -> Result<()> {
        self.inner.add_attribute(field)
    }

    fn delete_attribute(&mut self, name: &str) -> Result<()> {
        self.inner.delete_attribute(name)
    }

    fn change_attribute_value(&mut self, id: FeatureId, name: &str, value: Value) -> Result<()> {
        self.inner.change_attribute_value(id, name, value)
    }

    fn feature(&self, id: FeatureId) -> Result<Option<Feature>> {
        self.inner.feature(id)
    }

    fn features(&self) -> Result<Vec<Feature>> {
        self.inner.features()
    }

    fn all_features(&self) -> Result<Vec<Feature>> {
        self.inner.all_features()
    }

    fn subset_string(&self) -> &str {
        self.inner.subset_string()
    }

    fn set_subset_string(&mut self, expr: &str) -> Result<()> {
        if self.inner.subset_string() == expr.trim() {
            return Ok(());
        }
        let previous = self.inner.subset_string().to_string();
        self.inner.set_subset_string(expr)?;
        if let Err(e) = self.persist(self.inner.data()) {
            self.inner.set_subset_string(&previous)?;
            return Err(e);
        }
        Ok(())
    }

    fn trigger_repaint(&mut self) {
        self.inner.trigger_repaint();
    }
}
