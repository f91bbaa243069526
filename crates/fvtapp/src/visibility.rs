//! # Visibility Flags
//!
//! Per-feature visibility is stored as data, not as a rendering rule: each
//! layer gets a reserved integer field, [`VIS_FIELD`], and a row filter
//! `"_fvt_vis" = 1`. Every consumer that honors the layer filter (map canvas,
//! statistics, exports) then excludes hidden features.
//!
//! | Stored value | Meaning |
//! |--------------|---------|
//! | `1`          | visible |
//! | `0`          | hidden  |
//! | null/absent  | visible |
//!
//! The stored attribute is the source of truth. [`VisibilityManager`] keeps a
//! mirror of the flags it has seen during the session; it only grows, is
//! refreshed on every read, and is rebuilt from the layer by
//! [`VisibilityManager::reconcile`] each time a layer is listed.
//!
//! All schema and value changes run through [`with_edit`], so a failure
//! leaves the layer as it was.

use crate::error::{FvtError, Result};
use crate::layer::expr::SubsetExpr;
use crate::layer::{with_edit, VectorLayer};
use crate::model::{Feature, FeatureId, Field, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Name of the reserved visibility attribute.
pub const VIS_FIELD: &str = "_fvt_vis";

/// The row filter that keeps visible features only.
pub fn visible_filter() -> String {
    SubsetExpr::field_equals(VIS_FIELD, 1).to_string()
}

/// Visibility recorded on a feature record.
pub fn flag_of(feature: &Feature) -> bool {
    feature.attribute(VIS_FIELD).is_none_or(|v| !v.is_zero())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyPresent,
}

/// Outcome of [`VisibilityManager::cleanup`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Layers whose filter was cleared and reserved field removed.
    pub cleaned: Vec<String>,
    /// Layers that could not be cleaned, with the reason.
    pub failed: Vec<(String, FvtError)>,
}

#[derive(Debug, Default)]
pub struct VisibilityManager {
    mirror: HashMap<String, HashMap<FeatureId, bool>>,
}

impl VisibilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the reserved field to `layer` if it is missing, marking every
    /// existing feature visible.
    pub fn ensure_flag_field<L>(&self, layer: &mut L) -> Result<EnsureOutcome>
    where
        L: VectorLayer + ?Sized,
    {
        if layer.has_field(VIS_FIELD) {
            return Ok(EnsureOutcome::AlreadyPresent);
        }

        let layer_id = layer.id().to_string();
        if layer.is_editable() {
            return Err(FvtError::FieldCreation {
                layer: layer_id,
                reason: "layer is already being edited".to_string(),
            });
        }

        with_edit(&mut *layer, |l| {
            l.add_attribute(Field::integer(VIS_FIELD))?;
            for feature in l.all_features()? {
                l.change_attribute_value(feature.id, VIS_FIELD, Value::Int(1))?;
            }
            Ok(())
        })
        .map_err(|e| FvtError::FieldCreation {
            layer: layer_id.clone(),
            reason: e.to_string(),
        })?;

        info!(layer = %layer_id, field = VIS_FIELD, "created visibility field");
        Ok(EnsureOutcome::Created)
    }

    /// Read the visibility of one feature. Missing field or null value reads
    /// as visible.
    pub fn get_flag<L>(&mut self, layer: &L, id: FeatureId) -> Result<bool>
    where
        L: VectorLayer + ?Sized,
    {
        let feature = layer.feature(id)?.ok_or_else(|| {
            FvtError::HostQuery(format!("Feature {} not found in layer {}", id, layer.id()))
        })?;
        Ok(self.observe(layer.id(), &feature))
    }

    /// Record the flag carried by an already-fetched feature and return it.
    pub fn observe(&mut self, layer_id: &str, feature: &Feature) -> bool {
        let visible = flag_of(feature);
        self.mirror
            .entry(layer_id.to_string())
            .or_default()
            .insert(feature.id, visible);
        visible
    }

    pub fn set_flag<L>(&mut self, layer: &mut L, id: FeatureId, visible: bool) -> Result<()>
    where
        L: VectorLayer + ?Sized,
    {
        self.set_flags(layer, &[id], visible)
    }

    /// Write the same visibility to several features in one transaction.
    pub fn set_flags<L>(&mut self, layer: &mut L, ids: &[FeatureId], visible: bool) -> Result<()>
    where
        L: VectorLayer + ?Sized,
    {
        if !layer.has_field(VIS_FIELD) {
            return Err(FvtError::FieldMissing(layer.id().to_string()));
        }

        let value = if visible { 1 } else { 0 };
        with_edit(&mut *layer, |l| {
            for id in ids {
                l.change_attribute_value(*id, VIS_FIELD, Value::Int(value))?;
            }
            Ok(())
        })?;

        let flags = self.mirror.entry(layer.id().to_string()).or_default();
        for id in ids {
            flags.insert(*id, visible);
        }
        debug!(layer = layer.id(), count = ids.len(), visible, "visibility written");
        Ok(())
    }

    /// Last flag seen for a feature in this session, if any.
    pub fn cached(&self, layer_id: &str, id: FeatureId) -> Option<bool> {
        self.mirror.get(layer_id).and_then(|flags| flags.get(&id)).copied()
    }

    /// Rebuild the mirror for `layer` from its stored flags. Returns how many
    /// features were read.
    pub fn reconcile<L>(&mut self, layer: &L) -> Result<usize>
    where
        L: VectorLayer + ?Sized,
    {
        let features = layer.all_features()?;
        let flags: HashMap<FeatureId, bool> =
            features.iter().map(|f| (f.id, flag_of(f))).collect();
        let count = flags.len();
        self.mirror.insert(layer.id().to_string(), flags);
        Ok(count)
    }

    /// Give every record without a stored flag an explicit 1, so the row
    /// filter agrees with [`get_flag`](Self::get_flag), then rebuild the
    /// mirror for the layer. Returns how many records were written.
    ///
    /// Records added by other tools after the field was created carry a null
    /// flag; without this they would read as visible but be filtered out.
    pub fn backfill_flags<L>(&mut self, layer: &mut L) -> Result<usize>
    where
        L: VectorLayer + ?Sized,
    {
        if !layer.has_field(VIS_FIELD) {
            return Ok(0);
        }

        let missing: Vec<FeatureId> = layer
            .all_features()?
            .iter()
            .filter(|f| f.attribute(VIS_FIELD).is_none_or(Value::is_null))
            .map(|f| f.id)
            .collect();
        if !missing.is_empty() {
            self.set_flags(&mut *layer, &missing, true)?;
            info!(layer = layer.id(), count = missing.len(), "filled missing visibility flags");
        }

        self.reconcile(&*layer)?;
        Ok(missing.len())
    }

    /// Point the layer filter at the reserved field, or clear it when the
    /// field does not exist, then request a redraw.
    pub fn recompute_layer_filter<L>(&self, layer: &mut L) -> Result<()>
    where
        L: VectorLayer + ?Sized,
    {
        if layer.has_field(VIS_FIELD) {
            layer.set_subset_string(&visible_filter())?;
        } else {
            layer.set_subset_string("")?;
        }
        layer.trigger_repaint();
        Ok(())
    }

    /// Remove the filter and reserved field from every layer that carries it.
    ///
    /// A layer that cannot be cleaned is logged and reported; the remaining
    /// layers are still processed.
    pub fn cleanup<'a, L, I>(&mut self, layers: I) -> CleanupReport
    where
        L: VectorLayer + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut L>,
    {
        let mut report = CleanupReport::default();

        for layer in layers {
            if !layer.has_field(VIS_FIELD) {
                continue;
            }
            let layer_id = layer.id().to_string();

            let outcome = layer
                .set_subset_string("")
                .and_then(|_| with_edit(&mut *layer, |l| l.delete_attribute(VIS_FIELD)));

            match outcome {
                Ok(()) => {
                    layer.trigger_repaint();
                    self.mirror.remove(&layer_id);
                    info!(layer = %layer_id, "removed visibility field");
                    report.cleaned.push(layer_id);
                }
                Err(e) => {
                    warn!(layer = %layer_id, error = %e, "could not remove visibility field");
                    report.failed.push((layer_id, e));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::memory::fixtures::cities;
    use crate::layer::memory::MemLayer;
    use std::collections::BTreeSet;

    fn prepared() -> (VisibilityManager, MemLayer) {
        let manager = VisibilityManager::new();
        let mut layer = cities();
        manager.ensure_flag_field(&mut layer).unwrap();
        (manager, layer)
    }

    #[test]
    fn ensure_creates_field_and_marks_all_visible() {
        let manager = VisibilityManager::new();
        let mut layer = cities();

        let outcome = manager.ensure_flag_field(&mut layer).unwrap();
        assert_eq!(outcome, EnsureOutcome::Created);
        assert!(layer.has_field(VIS_FIELD));
        for f in layer.all_features().unwrap() {
            assert_eq!(f.attribute(VIS_FIELD), Some(&Value::Int(1)));
        }
    }

    #[test]
    fn ensure_is_idempotent_and_keeps_flags() {
        let (mut manager, mut layer) = prepared();
        manager.set_flag(&mut layer, 2, false).unwrap();

        let outcome = manager.ensure_flag_field(&mut layer).unwrap();
        assert_eq!(outcome, EnsureOutcome::AlreadyPresent);

        let count = layer
            .fields()
            .iter()
            .filter(|f| f.name == VIS_FIELD)
            .count();
        assert_eq!(count, 1);
        assert!(!manager.get_flag(&layer, 2).unwrap());
    }

    #[test]
    fn ensure_fails_mid_transaction() {
        let manager = VisibilityManager::new();
        let mut layer = cities();
        layer.start_editing().unwrap();

        let err = manager.ensure_flag_field(&mut layer).unwrap_err();
        assert!(matches!(err, FvtError::FieldCreation { .. }));
    }

    #[test]
    fn ensure_rolls_back_when_host_rejects() {
        let manager = VisibilityManager::new();

        let mut rejecting_add = cities();
        rejecting_add.set_reject_add_field(true);
        let err = manager.ensure_flag_field(&mut rejecting_add).unwrap_err();
        assert!(matches!(err, FvtError::FieldCreation { .. }));
        assert!(!rejecting_add.has_field(VIS_FIELD));
        assert!(!rejecting_add.is_editable());

        let mut rejecting_commit = cities();
        rejecting_commit.set_reject_commit(true);
        let err = manager.ensure_flag_field(&mut rejecting_commit).unwrap_err();
        assert!(matches!(err, FvtError::FieldCreation { .. }));
        assert!(!rejecting_commit.has_field(VIS_FIELD));
    }

    #[test]
    fn missing_field_or_null_reads_visible() {
        let mut manager = VisibilityManager::new();
        let layer = cities();
        assert!(manager.get_flag(&layer, 1).unwrap());

        let with_null = MemLayer::new("l", "L")
            .with_field(Field::integer(VIS_FIELD))
            .with_feature(Feature::new(9).with_attr(VIS_FIELD, Value::Null));
        assert!(manager.get_flag(&with_null, 9).unwrap());
    }

    #[test]
    fn get_flag_on_unknown_feature_is_host_error() {
        let (mut manager, layer) = prepared();
        let err = manager.get_flag(&layer, 99).unwrap_err();
        assert!(matches!(err, FvtError::HostQuery(_)));
    }

    #[test]
    fn last_toggle_wins() {
        let (mut manager, mut layer) = prepared();
        let sequence = [false, true, true, false, true, false];

        for (step, visible) in sequence.iter().enumerate() {
            manager.set_flag(&mut layer, 3, *visible).unwrap();
            assert_eq!(manager.get_flag(&layer, 3).unwrap(), *visible, "step {}", step);
            assert_eq!(manager.cached("cities_1", 3), Some(*visible));
        }

        let stored = layer.feature(3).unwrap().unwrap();
        assert_eq!(stored.attribute(VIS_FIELD), Some(&Value::Int(0)));
    }

    #[test]
    fn set_flag_requires_field() {
        let mut manager = VisibilityManager::new();
        let mut layer = cities();
        let err = manager.set_flag(&mut layer, 1, false).unwrap_err();
        assert!(matches!(err, FvtError::FieldMissing(id) if id == "cities_1"));
    }

    #[test]
    fn set_flag_refuses_open_transaction() {
        let (mut manager, mut layer) = prepared();
        layer.start_editing().unwrap();
        let err = manager.set_flag(&mut layer, 1, false).unwrap_err();
        assert!(matches!(err, FvtError::EditConflict(_)));
        assert_eq!(manager.cached("cities_1", 1), None);
    }

    #[test]
    fn set_flag_on_unknown_feature_leaves_layer_untouched() {
        let (mut manager, mut layer) = prepared();
        let err = manager.set_flags(&mut layer, &[1, 42], false);
        assert!(err.is_err());
        assert!(manager.get_flag(&layer, 1).unwrap());
        assert!(!layer.is_editable());
    }

    #[test]
    fn filter_keeps_exactly_the_visible_features() {
        let (mut manager, mut layer) = prepared();
        manager.set_flags(&mut layer, &[2, 5], false).unwrap();
        manager.set_flag(&mut layer, 5, true).unwrap();
        manager.set_flag(&mut layer, 4, false).unwrap();
        manager.recompute_layer_filter(&mut layer).unwrap();

        assert_eq!(layer.subset_string(), "\"_fvt_vis\" = 1");
        let enumerated: BTreeSet<_> = layer.features().unwrap().iter().map(|f| f.id).collect();
        let mut expected = BTreeSet::new();
        for f in layer.all_features().unwrap() {
            if manager.get_flag(&layer, f.id).unwrap() {
                expected.insert(f.id);
            }
        }
        assert_eq!(enumerated, expected);
        assert_eq!(enumerated, BTreeSet::from([1, 3, 5]));
        assert_eq!(layer.repaint_count(), 1);
    }

    #[test]
    fn filter_is_cleared_without_field() {
        let manager = VisibilityManager::new();
        let mut layer = cities();
        manager.recompute_layer_filter(&mut layer).unwrap();
        assert_eq!(layer.subset_string(), "");
        assert_eq!(layer.features().unwrap().len(), 5);
    }

    #[test]
    fn reconcile_rebuilds_mirror_from_storage() {
        let (mut manager, mut layer) = prepared();
        manager.set_flag(&mut layer, 1, false).unwrap();

        let mut fresh = VisibilityManager::new();
        assert_eq!(fresh.cached("cities_1", 1), None);
        assert_eq!(fresh.reconcile(&layer).unwrap(), 5);
        assert_eq!(fresh.cached("cities_1", 1), Some(false));
        assert_eq!(fresh.cached("cities_1", 2), Some(true));
    }

    #[test]
    fn cleanup_removes_field_and_filter() {
        let (mut manager, mut layer) = prepared();
        manager.set_flag(&mut layer, 1, false).unwrap();
        manager.recompute_layer_filter(&mut layer).unwrap();

        let mut layers = vec![layer, MemLayer::new("plain", "Plain")];
        let report = manager.cleanup(layers.iter_mut());
        assert_eq!(report.cleaned, vec!["cities_1".to_string()]);
        assert!(report.failed.is_empty());

        let layer = &layers[0];
        assert!(!layer.has_field(VIS_FIELD));
        assert_eq!(layer.subset_string(), "");
        assert_eq!(layer.features().unwrap().len(), 5);
        assert_eq!(manager.cached("cities_1", 1), None);

        let second = manager.cleanup(layers.iter_mut());
        assert!(second.cleaned.is_empty());
        assert!(second.failed.is_empty());
    }

    #[test]
    fn cleanup_continues_past_busy_layer() {
        let mut manager = VisibilityManager::new();
        let mut busy = cities();
        manager.ensure_flag_field(&mut busy).unwrap();
        manager.recompute_layer_filter(&mut busy).unwrap();
        busy.start_editing().unwrap();

        let mut other = MemLayer::new("other", "Other").with_feature(Feature::new(1));
        manager.ensure_flag_field(&mut other).unwrap();

        let mut layers = vec![busy, other];
        let report = manager.cleanup(layers.iter_mut());

        assert_eq!(report.cleaned, vec!["other".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "cities_1");
        assert!(matches!(report.failed[0].1, FvtError::EditConflict(_)));
        assert_eq!(layers[0].subset_string(), "");
        assert!(!layers[1].has_field(VIS_FIELD));
    }

    #[test]
    fn backfill_makes_filter_agree_with_flags() {
        let mut manager = VisibilityManager::new();
        let mut layer = cities();
        manager.ensure_flag_field(&mut layer).unwrap();
        manager.set_flag(&mut layer, 2, false).unwrap();
        with_edit(&mut layer, |l| l.change_attribute_value(4, VIS_FIELD, Value::Null)).unwrap();
        manager.recompute_layer_filter(&mut layer).unwrap();
        assert_eq!(layer.features().unwrap().len(), 3);

        assert_eq!(manager.backfill_flags(&mut layer).unwrap(), 1);
        assert_eq!(manager.backfill_flags(&mut layer).unwrap(), 0);

        let enumerated: BTreeSet<_> = layer.features().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(enumerated, BTreeSet::from([1, 3, 4, 5]));
        assert_eq!(manager.cached("cities_1", 4), Some(true));
        assert_eq!(manager.cached("cities_1", 2), Some(false));
    }

    #[test]
    fn backfill_without_field_is_a_no_op() {
        let mut manager = VisibilityManager::new();
        let mut layer = cities();
        assert_eq!(manager.backfill_flags(&mut layer).unwrap(), 0);
        assert!(!layer.has_field(VIS_FIELD));
        assert_eq!(manager.cached("cities_1", 1), None);
    }
}
