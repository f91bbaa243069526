//! # Command Layer
//!
//! The logic the feature panel runs in response to user interaction. Each
//! command lives in its own submodule as plain functions over the domain
//! types; the API facade picks the layer and passes the session state in.
//!
//! Commands do not print, prompt or exit. They return a [`CmdResult`]
//! carrying structured data (layer summaries, a feature listing, settings)
//! and [`CmdMessage`]s, and the UI decides how to render them.
//!
//! ## Testing Strategy
//!
//! Command tests run against [`MemLayer`](crate::layer::memory::MemLayer)
//! and [`MemSettings`](crate::settings::memory::MemSettings); this is where
//! most of the behavioral coverage lives.
//!
//! ## Command Modules
//!
//! - [`layers`]: Summarize the project's layers
//! - [`list`]: Build the feature listing for one layer
//! - [`toggle`]: Show or hide features
//! - [`configure`]: Edit display limit, attribute columns and filters
//! - [`cleanup`]: Remove the visibility field from every layer

use crate::model::FeatureId;
use crate::settings::PanelSettings;
use serde::Serialize;

pub mod cleanup;
pub mod configure;
pub mod layers;
pub mod list;
pub mod toggle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One layer as shown in the layer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    /// Every record, hidden or not.
    pub feature_count: usize,
    /// Records passing the current layer filter.
    pub visible_count: usize,
    pub has_visibility_field: bool,
    pub filter: String,
}

/// One feature row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    pub id: FeatureId,
    pub label: String,
    pub visible: bool,
    /// Text of each selected attribute, in header order.
    pub columns: Vec<String>,
}

impl FeatureRow {
    pub fn label_for(id: FeatureId) -> String {
        format!("Feature {}", id)
    }
}

/// The feature list of one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureListing {
    pub layer_id: String,
    pub layer_name: String,
    /// Column headers: the feature column first, then selected attributes.
    pub headers: Vec<String>,
    pub rows: Vec<FeatureRow>,
    /// Number of records in the layer, before filtering and limiting.
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub layers: Vec<LayerSummary>,
    pub listing: Option<FeatureListing>,
    pub affected: Vec<FeatureRow>,
    pub settings: Option<PanelSettings>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_layers(mut self, layers: Vec<LayerSummary>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_listing(mut self, listing: FeatureListing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_settings(mut self, settings: PanelSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}
