use crate::commands::{CmdMessage, CmdResult, FeatureListing, FeatureRow};
use crate::error::Result;
use crate::filter;
use crate::layer::VectorLayer;
use crate::model::Value;
use crate::settings::PanelSettings;
use crate::visibility::{VisibilityManager, VIS_FIELD};
use std::collections::BTreeMap;
use tracing::warn;

/// Build the feature list for `layer`.
///
/// Makes sure the visibility field exists and every record has a flag, keeps the features that pass the
/// layer's active rules, stops at the display limit, and finally points the
/// layer filter at the stored flags.
pub fn run<L: VectorLayer + ?Sized>(
    layer: &mut L,
    visibility: &mut VisibilityManager,
    settings: &PanelSettings,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let layer_id = layer.id().to_string();

    if let Err(e) = visibility.ensure_flag_field(&mut *layer) {
        warn!(layer = %layer_id, error = %e, "listing without visibility field");
        result.add_message(CmdMessage::warning(format!(
            "{}; visibility changes are unavailable for this layer",
            e
        )));
    } else if let Err(e) = visibility.backfill_flags(&mut *layer) {
        warn!(layer = %layer_id, error = %e, "could not fill missing visibility flags");
        result.add_message(CmdMessage::warning(format!(
            "Some features have no stored visibility: {}",
            e
        )));
    }

    let selected = settings.selected_attributes(&layer_id).to_vec();
    let rules = settings.active_rules(&layer_id);
    let limit = settings.limit();

    let field_names: Vec<String> = layer
        .fields()
        .into_iter()
        .map(|f| f.name)
        .filter(|name| name != VIS_FIELD)
        .collect();

    let features = layer.all_features()?;
    let total = features.len();
    let mut rows = Vec::new();

    for feature in &features {
        let values: BTreeMap<String, Value> = field_names
            .iter()
            .map(|name| {
                let value = feature.attribute(name).cloned().unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        if !filter::matches(&values, &rules) {
            continue;
        }

        let visible = visibility.observe(&layer_id, feature);
        let columns = selected
            .iter()
            .map(|name| values.get(name).map(Value::to_string).unwrap_or_default())
            .collect();

        rows.push(FeatureRow {
            id: feature.id,
            label: FeatureRow::label_for(feature.id),
            visible,
            columns,
        });

        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
    }

    let first_header = match limit {
        Some(_) => format!("Features (showing {} of {})", rows.len(), total),
        None if selected.is_empty() => "Features".to_string(),
        None => "Feature".to_string(),
    };
    let mut headers = vec![first_header];
    headers.extend(selected.iter().cloned());

    visibility.recompute_layer_filter(&mut *layer)?;

    Ok(result.with_listing(FeatureListing {
        layer_id,
        layer_name: layer.name().to_string(),
        headers,
        rows,
        total,
    }))
}
