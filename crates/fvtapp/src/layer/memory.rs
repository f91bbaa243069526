use super::expr::SubsetExpr;
use super::VectorLayer;
use crate::error::{FvtError, Result};
use crate::model::{Feature, FeatureId, Field, Value};
use std::collections::BTreeMap;

/// Schema plus records: the part of a layer an edit transaction snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerData {
    pub fields: Vec<Field>,
    pub features: BTreeMap<FeatureId, Feature>,
}

/// In-memory vector layer.
///
/// Edits go to a pending copy of [`LayerData`] opened by `start_editing`;
/// `commit_changes` swaps it in and `rollback` drops it. Reads always see the
/// pending copy while a transaction is open, the way a host edit buffer does.
pub struct MemLayer {
    id: String,
    name: String,
    data: LayerData,
    pending: Option<LayerData>,
    subset: String,
    subset_expr: Option<SubsetExpr>,
    repaints: usize,
    reject_commit: bool,
    reject_add_field: bool,
}

impl MemLayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: LayerData::default(),
            pending: None,
            subset: String::new(),
            subset_expr: None,
            repaints: 0,
            reject_commit: false,
            reject_add_field: false,
        }
    }

    /// Rebuild a layer from stored parts, validating the subset string.
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        data: LayerData,
        subset: &str,
    ) -> Result<Self> {
        let mut layer = Self::new(id, name);
        layer.data = data;
        layer.set_subset_string(subset)?;
        Ok(layer)
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.data.fields.push(field);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.data.features.insert(feature.id, feature);
        self
    }

    /// Committed state, ignoring any open transaction.
    pub fn data(&self) -> &LayerData {
        &self.data
    }

    /// Uncommitted state of the open transaction, if any.
    pub fn pending(&self) -> Option<&LayerData> {
        self.pending.as_ref()
    }

    /// Make the next commits fail, for testing error handling.
    pub fn set_reject_commit(&mut self, reject: bool) {
        self.reject_commit = reject;
    }

    /// Make `add_attribute` fail, for testing error handling.
    pub fn set_reject_add_field(&mut self, reject: bool) {
        self.reject_add_field = reject;
    }

    /// How many times a redraw was requested.
    pub fn repaint_count(&self) -> usize {
        self.repaints
    }

    fn current(&self) -> &LayerData {
        self.pending.as_ref().unwrap_or(&self.data)
    }

    fn pending_mut(&mut self) -> Result<&mut LayerData> {
        match self.pending.as_mut() {
            Some(pending) => Ok(pending),
            None => Err(FvtError::HostQuery(format!(
                "Layer {} is not in edit mode",
                self.id
            ))),
        }
    }

    fn passes_filter(&self, feature: &Feature) -> bool {
        self.subset_expr
            .as_ref()
            .is_none_or(|expr| expr.matches(feature))
    }
}

impl VectorLayer for MemLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<Field> {
        self.current().fields.clone()
    }

    fn is_editable(&self) -> bool {
        self.pending.is_some()
    }

    fn start_editing(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Err(FvtError::EditConflict(self.id.clone()));
        }
        self.pending = Some(self.data.clone());
        Ok(())
    }

    fn commit_changes(&mut self) -> Result<()> {
        if self.reject_commit {
            return Err(FvtError::HostQuery(format!(
                "Commit rejected by layer {}",
                self.id
            )));
        }
        let pending = self.pending.take().ok_or_else(|| {
            FvtError::HostQuery("Nothing to commit: layer is not in edit mode".to_string())
        })?;
        self.data = pending;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.pending = None;
        Ok(())
    }

    fn add_attribute(&mut self, field: Field) -> Result<()> {
        if self.reject_add_field {
            return Err(FvtError::HostQuery(format!(
                "Layer {} does not accept new fields",
                self.id
            )));
        }
        let pending = self.pending_mut()?;
        if pending.fields.iter().any(|f| f.name == field.name) {
            return Err(FvtError::HostQuery(format!(
                "Field {} already exists",
                field.name
            )));
        }
        for feature in pending.features.values_mut() {
            feature.attributes.insert(field.name.clone(), Value::Null);
        }
        pending.fields.push(field);
        Ok(())
    }

    fn delete_attribute(&mut self, name: &str) -> Result<()> {
        let pending = self.pending_mut()?;
        let Some(pos) = pending.fields.iter().position(|f| f.name == name) else {
            return Err(FvtError::HostQuery(format!("Field {} does not exist", name)));
        };
        pending.fields.remove(pos);
        for feature in pending.features.values_mut() {
            feature.attributes.remove(name);
        }
        Ok(())
    }

    fn change_attribute_value(&mut self, id: FeatureId, name: &str, value: Value) -> Result<()> {
        let pending = self.pending_mut()?;
        if !pending.fields.iter().any(|f| f.name == name) {
            return Err(FvtError::HostQuery(format!("Field {} does not exist", name)));
        }
        let feature = pending
            .features
            .get_mut(&id)
            .ok_or_else(|| FvtError::HostQuery(format!("Feature {} does not exist", id)))?;
        feature.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn feature(&self, id: FeatureId) -> Result<Option<Feature>> {
        Ok(self.current().features.get(&id).cloned())
    }

    fn features(&self) -> Result<Vec<Feature>> {
        Ok(self
            .current()
            .features
            .values()
            .filter(|f| self.passes_filter(f))
            .cloned()
            .collect())
    }

    fn all_features(&self) -> Result<Vec<Feature>> {
        Ok(self.current().features.values().cloned().collect())
    }

    fn subset_string(&self) -> &str {
        &self.subset
    }

    fn set_subset_string(&mut self, expr: &str) -> Result<()> {
        let parsed = SubsetExpr::parse(expr)?;
        if let Some(SubsetExpr::FieldEquals { field, .. }) = &parsed {
            if !self.current().fields.iter().any(|f| &f.name == field) {
                return Err(FvtError::HostQuery(format!(
                    "Filter references unknown field {}",
                    field
                )));
            }
        }
        self.subset = expr.trim().to_string();
        self.subset_expr = parsed;
        Ok(())
    }

    fn trigger_repaint(&mut self) {
        self.repaints += 1;
    }
}
