use crate::commands::{CmdMessage, CmdResult};
use crate::config::FvtConfig;
use crate::error::{FvtError, Result};
use crate::filter::{FilterKind, FilterRule};
use crate::layer::VectorLayer;
use crate::settings::PanelSettings;
use crate::visibility::VIS_FIELD;

/// Snapshot of the current settings.
pub fn show(settings: &PanelSettings) -> Result<CmdResult> {
    Ok(CmdResult::default().with_settings(settings.clone()))
}

pub fn set_limit(settings: &mut PanelSettings, config: &FvtConfig, limit: usize) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let clamped = config.clamp_limit(limit);
    if clamped != limit {
        result.add_message(CmdMessage::warning(format!(
            "Limit {} exceeds the maximum, using {}",
            limit, clamped
        )));
    }

    settings.feature_limit = clamped;
    result.add_message(if clamped == 0 {
        CmdMessage::success("Feature limit removed")
    } else {
        CmdMessage::success(format!("Feature limit set to {}", clamped))
    });
    Ok(result)
}

/// Replace the attribute columns shown for `layer`. An empty list clears them.
pub fn select_attributes<L: VectorLayer + ?Sized>(
    settings: &mut PanelSettings,
    layer: &L,
    fields: &[String],
) -> Result<CmdResult> {
    let mut selected: Vec<String> = Vec::with_capacity(fields.len());
    for name in fields {
        check_user_field(layer, name)?;
        if name.contains(',') {
            return Err(FvtError::Settings(format!(
                "Field names containing ',' cannot be selected: {}",
                name
            )));
        }
        if !selected.contains(name) {
            selected.push(name.clone());
        }
    }

    let mut result = CmdResult::default();
    result.add_message(if selected.is_empty() {
        CmdMessage::success(format!("Attribute columns cleared for {}", layer.name()))
    } else {
        CmdMessage::success(format!(
            "Showing {} for {}",
            selected.join(", "),
            layer.name()
        ))
    });
    settings.layer_mut(layer.id()).attributes = selected;
    prune(settings, layer.id());
    Ok(result)
}

/// Store a rule for one field. An inert rule (no kind, or blank text)
/// removes the field's rule instead.
pub fn set_filter<L: VectorLayer + ?Sized>(
    settings: &mut PanelSettings,
    layer: &L,
    field: &str,
    kind: FilterKind,
    value: &str,
) -> Result<CmdResult> {
    check_user_field(layer, field)?;

    let rule = FilterRule::new(kind, value.trim());
    if rule.is_inert() {
        return clear_filter(settings, layer.id(), field);
    }

    let mut result = CmdResult::default();
    let layer_settings = settings.layer_mut(layer.id());
    if !layer_settings.attributes.iter().any(|a| a == field) {
        result.add_message(CmdMessage::info(format!(
            "Filter on {} applies once the field is selected for display",
            field
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Filter set: {} {} '{}'",
        field,
        rule.kind.label().to_lowercase(),
        rule.value
    )));
    layer_settings.filters.insert(field.to_string(), rule);
    Ok(result)
}

pub fn clear_filter(settings: &mut PanelSettings, layer_id: &str, field: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let removed = settings
        .layers
        .get_mut(layer_id)
        .and_then(|l| l.filters.remove(field))
        .is_some();
    prune(settings, layer_id);

    result.add_message(if removed {
        CmdMessage::success(format!("Filter on {} removed", field))
    } else {
        CmdMessage::info(format!("No filter on {}", field))
    });
    Ok(result)
}

fn check_user_field<L: VectorLayer + ?Sized>(layer: &L, name: &str) -> Result<()> {
    if name == VIS_FIELD || !layer.has_field(name) {
        return Err(FvtError::Settings(format!(
            "Layer {} has no field named {}",
            layer.name(),
            name
        )));
    }
    Ok(())
}

fn prune(settings: &mut PanelSettings, layer_id: &str) {
    if settings.layer(layer_id).is_some_and(|l| l.is_empty()) {
        settings.layers.remove(layer_id);
    }
}
