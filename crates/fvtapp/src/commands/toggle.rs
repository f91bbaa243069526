use crate::commands::{CmdMessage, CmdResult, FeatureRow};
use crate::error::{FvtError, Result};
use crate::layer::VectorLayer;
use crate::model::FeatureId;
use crate::visibility::VisibilityManager;

pub fn show<L: VectorLayer + ?Sized>(
    layer: &mut L,
    visibility: &mut VisibilityManager,
    ids: &[FeatureId],
) -> Result<CmdResult> {
    set_visibility(layer, visibility, ids, true)
}

pub fn hide<L: VectorLayer + ?Sized>(
    layer: &mut L,
    visibility: &mut VisibilityManager,
    ids: &[FeatureId],
) -> Result<CmdResult> {
    set_visibility(layer, visibility, ids, false)
}

fn set_visibility<L: VectorLayer + ?Sized>(
    layer: &mut L,
    visibility: &mut VisibilityManager,
    ids: &[FeatureId],
    visible: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let mut unique: Vec<FeatureId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        result.add_message(CmdMessage::info("No features given"));
        return Ok(result);
    }

    for id in &unique {
        if layer.feature(*id)?.is_none() {
            return Err(FvtError::HostQuery(format!(
                "Feature {} not found in layer {}",
                id,
                layer.id()
            )));
        }
    }

    visibility.ensure_flag_field(&mut *layer)?;
    visibility.backfill_flags(&mut *layer)?;
    visibility.set_flags(&mut *layer, &unique, visible)?;
    visibility.recompute_layer_filter(&mut *layer)?;

    let verb = if visible { "shown" } else { "hidden" };
    for id in unique {
        let label = FeatureRow::label_for(id);
        result.add_message(CmdMessage::success(format!("{} {}", label, verb)));
        result.affected.push(FeatureRow {
            id,
            label,
            visible,
            columns: Vec::new(),
        });
    }

    Ok(result)
}
