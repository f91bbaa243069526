//! # Panel Settings
//!
//! Per-layer display and filter choices plus the global display limit,
//! persisted through a host [`SettingsStore`].
//!
//! ## Storage Layout
//!
//! ```text
//! <namespace>/
//! ├── featureLimit            # integer, 0 = no limit
//! └── <layer id>/
//!     ├── attributes          # "name,pop"
//!     └── filters             # "name:Contains:ac|pop:Greater than:100"
//! ```
//!
//! Attribute names are comma-joined without escaping, so a field whose name
//! contains a comma does not survive a round trip. Filter components escape
//! `:` as `_COLON_` and `|` as `_PIPE_`; a `/` in a layer id is stored as
//! `_SLASH_` so the id stays a single group.
//!
//! ## Malformed Data
//!
//! Settings are user data we do not fully control. A filter triple that does
//! not split into three parts, or that names an unknown kind, is dropped with
//! a warning; a non-integer limit reads as "no limit".
//!
//! ## Implementations
//!
//! - [`memory::MemSettings`]: in-memory store for tests.
//! - [`fs::FileSettings`]: JSON file store used by the CLI.

use crate::error::Result;
use crate::filter::{active_rules, FilterKind, FilterRule, RuleSet};
use std::collections::BTreeMap;
use tracing::warn;

pub mod fs;
pub mod memory;
pub mod store;

pub use store::{key, SettingValue, SettingsStore};

pub const DEFAULT_NAMESPACE: &str = "FeatureVisibilityToggle";

const FEATURE_LIMIT_KEY: &str = "featureLimit";
const ATTRIBUTES_KEY: &str = "attributes";
const FILTERS_KEY: &str = "filters";

/// Display choices for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSettings {
    /// Fields shown as extra columns, in display order.
    pub attributes: Vec<String>,
    /// Stored filter rules, active or dormant.
    pub filters: RuleSet,
}

impl LayerSettings {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.filters.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSettings {
    /// Maximum number of listed features; 0 means no limit.
    pub feature_limit: usize,
    pub layers: BTreeMap<String, LayerSettings>,
}

impl PanelSettings {
    pub fn limit(&self) -> Option<usize> {
        (self.feature_limit > 0).then_some(self.feature_limit)
    }

    pub fn layer(&self, layer_id: &str) -> Option<&LayerSettings> {
        self.layers.get(layer_id)
    }

    pub fn layer_mut(&mut self, layer_id: &str) -> &mut LayerSettings {
        self.layers.entry(layer_id.to_string()).or_default()
    }

    pub fn selected_attributes(&self, layer_id: &str) -> &[String] {
        self.layer(layer_id)
            .map(|l| l.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Rules that currently apply to a layer: those on selected fields.
    pub fn active_rules(&self, layer_id: &str) -> RuleSet {
        match self.layer(layer_id) {
            Some(layer) => active_rules(&layer.filters, &layer.attributes),
            None => RuleSet::new(),
        }
    }
}

pub fn encode_attributes(attributes: &[String]) -> String {
    attributes.join(",")
}

pub fn decode_attributes(text: &str) -> Vec<String> {
    text.split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn escape(component: &str) -> String {
    component.replace(':', "_COLON_").replace('|', "_PIPE_")
}

fn unescape(component: &str) -> String {
    component.replace("_COLON_", ":").replace("_PIPE_", "|")
}

/// Layer ids become one group segment; `/` would otherwise open a nested group.
fn layer_group(layer_id: &str) -> String {
    layer_id.replace('/', "_SLASH_")
}

fn layer_id_of(group: &str) -> String {
    group.replace("_SLASH_", "/")
}

pub fn encode_filters(rules: &RuleSet) -> String {
    rules
        .iter()
        .map(|(field, rule)| {
            format!(
                "{}:{}:{}",
                escape(field),
                escape(rule.kind.label()),
                escape(&rule.value)
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse stored filters, dropping malformed or inert entries.
pub fn decode_filters(text: &str) -> RuleSet {
    let mut rules = RuleSet::new();
    for part in text.split('|').filter(|p| !p.is_empty()) {
        let pieces: Vec<&str> = part.splitn(3, ':').collect();
        let [field, kind, value] = pieces.as_slice() else {
            warn!(entry = part, "ignoring malformed filter entry");
            continue;
        };

        let kind_label = unescape(kind);
        let Some(kind) = FilterKind::from_label(&kind_label) else {
            warn!(entry = part, kind = %kind_label, "ignoring filter with unknown kind");
            continue;
        };

        let rule = FilterRule::new(kind, unescape(value));
        if rule.is_inert() {
            continue;
        }
        rules.insert(unescape(field), rule);
    }
    rules
}

/// Read all panel settings under `namespace`.
pub fn load<S: SettingsStore + ?Sized>(store: &S, namespace: &str) -> Result<PanelSettings> {
    let mut settings = PanelSettings::default();

    if let Some(value) = store.value(&key(&[namespace, FEATURE_LIMIT_KEY]))? {
        settings.feature_limit = match value.as_int() {
            Some(n) if n >= 0 => n as usize,
            _ => {
                warn!(value = %value.as_text(), "ignoring invalid feature limit");
                0
            }
        };
    }

    for group in store.child_groups(namespace)? {
        let mut layer = LayerSettings::default();

        if let Some(value) = store.value(&key(&[namespace, &group, ATTRIBUTES_KEY]))? {
            layer.attributes = decode_attributes(&value.as_text());
        }
        if let Some(value) = store.value(&key(&[namespace, &group, FILTERS_KEY]))? {
            layer.filters = decode_filters(&value.as_text());
        }

        if !layer.is_empty() {
            settings.layers.insert(layer_id_of(&group), layer);
        }
    }

    Ok(settings)
}

/// Replace everything under `namespace` with `settings` and sync the store.
pub fn save<S: SettingsStore + ?Sized>(
    store: &mut S,
    namespace: &str,
    settings: &PanelSettings,
) -> Result<()> {
    store.set_value(
        &key(&[namespace, FEATURE_LIMIT_KEY]),
        SettingValue::Int(settings.feature_limit as i64),
    )?;

    for group in store.child_groups(namespace)? {
        store.remove(&key(&[namespace, &group]))?;
    }

    for (layer_id, layer) in settings.layers.iter().filter(|(_, l)| !l.is_empty()) {
        let group = layer_group(layer_id);
        store.set_value(
            &key(&[namespace, &group, ATTRIBUTES_KEY]),
            SettingValue::Text(encode_attributes(&layer.attributes)),
        )?;
        if !layer.filters.is_empty() {
            store.set_value(
                &key(&[namespace, &group, FILTERS_KEY]),
                SettingValue::Text(encode_filters(&layer.filters)),
            )?;
        }
    }

    store.sync()
}
