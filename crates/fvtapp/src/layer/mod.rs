//! # Layer Abstraction
//!
//! This module defines the capability set the rest of the crate needs from a
//! host's vector layer. The [`VectorLayer`] trait is deliberately narrow:
//! field management, attribute read/write, an edit transaction, and the
//! layer-level row filter (the "subset string").
//!
//! ## Edit Transactions
//!
//! Schema and attribute changes are only accepted between
//! [`VectorLayer::start_editing`] and [`VectorLayer::commit_changes`] (or
//! [`VectorLayer::rollback`]). Callers never drive that sequence by hand;
//! they go through [`with_edit`], which:
//!
//! 1. refuses to start if the layer is already editable (`EditConflict`),
//! 2. runs the closure,
//! 3. commits on success and rolls back on any error.
//!
//! There is no queue: a layer that is mid-transaction is an error, not a
//! pending operation.
//!
//! ## Row Filter
//!
//! The subset string decides which records are *active*. Only two forms are
//! understood (see [`expr`]): the empty string and `"<field>" = <integer>`.
//! [`VectorLayer::features`] honors it, [`VectorLayer::all_features`] does not.
//!
//! ## Implementations
//!
//! - [`memory::MemLayer`]: in-memory layer, used by tests and as the engine
//!   behind the file adapter.
//! - [`fs::FileLayer`]: a layer persisted as a `*.layer.json` document.

use crate::error::{FvtError, Result};
use crate::model::{Feature, FeatureId, Field, Value};
use tracing::debug;

pub mod expr;
pub mod fs;
pub mod memory;

/// Abstract interface for a host vector layer.
pub trait VectorLayer {
    /// Stable identifier of the layer.
    fn id(&self) -> &str;

    /// Human-readable layer name.
    fn name(&self) -> &str;

    /// Ordered field schema.
    fn fields(&self) -> Vec<Field>;

    fn has_field(&self, name: &str) -> bool {
        self.fields().iter().any(|f| f.name == name)
    }

    // --- Edit transaction ---

    /// Whether an edit transaction is currently open.
    fn is_editable(&self) -> bool;

    fn start_editing(&mut self) -> Result<()>;

    /// Apply pending edits. On error, pending edits stay open so the caller
    /// can roll back.
    fn commit_changes(&mut self) -> Result<()>;

    /// Discard pending edits and close the transaction.
    fn rollback(&mut self) -> Result<()>;

    // --- Schema and attribute edits (only while editable) ---

    fn add_attribute(&mut self, field: Field) -> Result<()>;

    fn delete_attribute(&mut self, name: &str) -> Result<()>;

    fn change_attribute_value(&mut self, id: FeatureId, name: &str, value: Value) -> Result<()>;

    // --- Reads ---

    /// Look up a record by id, regardless of the row filter.
    fn feature(&self, id: FeatureId) -> Result<Option<Feature>>;

    /// Records that pass the current row filter.
    fn features(&self) -> Result<Vec<Feature>>;

    /// Every record, ignoring the row filter.
    fn all_features(&self) -> Result<Vec<Feature>>;

    /// Number of records that pass the current row filter.
    fn feature_count(&self) -> Result<usize> {
        Ok(self.features()?.len())
    }

    // --- Row filter ---

    fn subset_string(&self) -> &str;

    fn set_subset_string(&mut self, expr: &str) -> Result<()>;

    /// Ask the host to redraw the layer.
    fn trigger_repaint(&mut self);
}

/// Run `f` inside an edit transaction on `layer`.
///
/// Commits when `f` succeeds, rolls back when `f` or the commit fails.
pub fn with_edit<L, T, F>(layer: &mut L, f: F) -> Result<T>
where
    L: VectorLayer + ?Sized,
    F: FnOnce(&mut L) -> Result<T>,
{
    if layer.is_editable() {
        return Err(FvtError::EditConflict(layer.id().to_string()));
    }

    layer.start_editing()?;
    let outcome = f(layer).and_then(|value| layer.commit_changes().map(|_| value));

    match outcome {
        Ok(value) => {
            debug!(layer = layer.id(), "edit committed");
            Ok(value)
        }
        Err(e) => {
            debug!(layer = layer.id(), error = %e, "edit rolled back");
            if layer.is_editable() {
                layer.rollback()?;
            }
            Err(e)
        }
    }
}
