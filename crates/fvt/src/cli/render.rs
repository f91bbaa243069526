//! # Rendering Module
//!
//! Turns `CmdResult` pieces into terminal text. Every `render_*` function
//! returns a `String` so layout can be tested without a terminal; the `print_*`
//! wrappers are the only place that writes to stdout.
//!
//! ## Table Layout
//!
//! The feature list is a checkbox column followed by the header columns:
//!
//! ```text
//! Cities (cities_1)
//!     Feature     name      pop
//! [x] Feature 1   Jackson   250
//! [ ] Feature 2   Bobtown   80
//! ```
//!
//! Column widths are measured with `unicode-width` and capped at
//! [`MAX_COLUMN_WIDTH`]; longer cells are truncated with an ellipsis.

use super::styles::{ERROR, HEADER, HIDDEN, INFO, LAYER_ID, MUTED, SUCCESS, WARNING};
use fvtapp::commands::{CmdMessage, CmdResult, FeatureListing, LayerSummary, MessageLevel};
use fvtapp::settings::PanelSettings;
use serde_json::{json, Value};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_COLUMN_WIDTH: usize = 32;
pub const COLUMN_GAP: &str = "  ";
pub const CHECKED: &str = "[x]";
pub const UNCHECKED: &str = "[ ]";

pub fn render_layers(layers: &[LayerSummary]) -> String {
    if layers.is_empty() {
        return "No layers found.\n".to_string();
    }

    let id_width = column_width(layers.iter().map(|l| l.id.as_str()));
    let name_width = column_width(layers.iter().map(|l| l.name.as_str()));

    let mut out = String::new();
    for layer in layers {
        let counts = format!("{}/{} visible", layer.visible_count, layer.feature_count);
        let marker = if layer.has_visibility_field {
            "  toggled"
        } else {
            ""
        };
        out.push_str(&format!(
            "{}{}{}{}{}{}\n",
            LAYER_ID.apply_to(pad(&layer.id, id_width)),
            COLUMN_GAP,
            pad(&layer.name, name_width),
            COLUMN_GAP,
            counts,
            MUTED.apply_to(marker)
        ));
    }
    out
}

pub fn render_listing(listing: &FeatureListing) -> String {
    let mut out = format!(
        "{} {}\n",
        HEADER.apply_to(&listing.layer_name),
        MUTED.apply_to(format!("({})", listing.layer_id))
    );

    let widths: Vec<usize> = (0..listing.headers.len())
        .map(|col| {
            let header = listing.headers[col].as_str();
            let cells = listing.rows.iter().map(move |row| cell(row, col));
            column_width(std::iter::once(header).chain(cells))
        })
        .collect();

    let header_line = join_cells(listing.headers.iter().map(String::as_str), &widths);
    out.push_str(&format!(
        "{}{}{}\n",
        " ".repeat(CHECKED.width()),
        COLUMN_GAP,
        HEADER.apply_to(header_line)
    ));

    if listing.rows.is_empty() {
        out.push_str(&format!("{}\n", MUTED.apply_to("No features match.")));
        return out;
    }

    for row in &listing.rows {
        let cells = (0..listing.headers.len()).map(|col| cell(row, col));
        let line = join_cells(cells, &widths);
        if row.visible {
            out.push_str(&format!("{}{}{}\n", CHECKED, COLUMN_GAP, line));
        } else {
            out.push_str(&format!(
                "{}{}{}\n",
                UNCHECKED,
                COLUMN_GAP,
                HIDDEN.apply_to(line)
            ));
        }
    }
    out
}

pub fn render_settings(settings: &PanelSettings) -> String {
    let limit = match settings.limit() {
        Some(limit) => limit.to_string(),
        None => "none".to_string(),
    };
    let mut out = format!("{} {}\n", HEADER.apply_to("Feature limit:"), limit);

    for (layer_id, layer) in &settings.layers {
        out.push_str(&format!("{}\n", LAYER_ID.apply_to(layer_id)));
        if !layer.attributes.is_empty() {
            out.push_str(&format!("  attributes: {}\n", layer.attributes.join(", ")));
        }
        for (field, rule) in &layer.filters {
            let dormant = if layer.attributes.contains(field) {
                ""
            } else {
                " (inactive)"
            };
            out.push_str(&format!(
                "  filter: {} {} {}{}\n",
                field,
                rule.kind.label(),
                rule.value,
                MUTED.apply_to(dormant)
            ));
        }
    }
    out
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let style = match message.level {
                MessageLevel::Info => &*INFO,
                MessageLevel::Success => &*SUCCESS,
                MessageLevel::Warning => &*WARNING,
                MessageLevel::Error => &*ERROR,
            };
            format!("{}\n", style.apply_to(&message.content))
        })
        .collect()
}

/// Machine-readable form of a command result.
pub fn result_to_json(result: &CmdResult) -> Value {
    let settings = result.settings.as_ref().map(settings_to_json);
    json!({
        "layers": result.layers,
        "listing": result.listing,
        "affected": result.affected,
        "settings": settings,
        "messages": result.messages,
    })
}

fn settings_to_json(settings: &PanelSettings) -> Value {
    let layers: serde_json::Map<String, Value> = settings
        .layers
        .iter()
        .map(|(id, layer)| {
            let filters: serde_json::Map<String, Value> = layer
                .filters
                .iter()
                .map(|(field, rule)| {
                    (
                        field.clone(),
                        json!({ "kind": rule.kind.slug(), "value": rule.value }),
                    )
                })
                .collect();
            (
                id.clone(),
                json!({ "attributes": layer.attributes, "filters": filters }),
            )
        })
        .collect();
    json!({ "feature_limit": settings.feature_limit, "layers": layers })
}

pub fn print_result(result: &CmdResult, as_json: bool) {
    if as_json {
        println!("{}", result_to_json(result));
        return;
    }
    if !result.layers.is_empty() {
        print!("{}", render_layers(&result.layers));
    }
    if let Some(listing) = &result.listing {
        print!("{}", render_listing(listing));
    }
    if let Some(settings) = &result.settings {
        print!("{}", render_settings(settings));
    }
    print!("{}", render_messages(&result.messages));
}

fn cell(row: &fvtapp::commands::FeatureRow, col: usize) -> &str {
    if col == 0 {
        &row.label
    } else {
        row.columns.get(col - 1).map(String::as_str).unwrap_or("")
    }
}

fn column_width<'a>(cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.width())
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH)
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| pad(&truncate_to_width(c, *w), *w))
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
