//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every UI. [`FvtApi`] is also the session context: it owns
//! the project, the settings store, the loaded [`PanelSettings`] and the
//! [`VisibilityManager`] with its flag mirror. There is no global state;
//! construct one per session and call [`FvtApi::cleanup`] on teardown.
//!
//! ## Role and Responsibilities
//!
//! - **Resolve** layer ids to layers
//! - **Dispatch** to the command functions
//! - **Persist** settings after every settings change
//!
//! Business logic stays in `commands/*.rs`; presentation stays in the UI.
//!
//! ## Generic Over Host Adapters
//!
//! `FvtApi<L: VectorLayer, S: SettingsStore>`:
//! - CLI: `FvtApi<FileLayer, FileSettings>`
//! - Tests: `FvtApi<MemLayer, MemSettings>`

use crate::commands::{self, CmdResult};
use crate::config::FvtConfig;
use crate::error::Result;
use crate::filter::FilterKind;
use crate::layer::VectorLayer;
use crate::model::FeatureId;
use crate::project::Project;
use crate::settings::{self, PanelSettings, SettingsStore};
use crate::visibility::VisibilityManager;

pub struct FvtApi<L: VectorLayer, S: SettingsStore> {
    project: Project<L>,
    store: S,
    config: FvtConfig,
    settings: PanelSettings,
    visibility: VisibilityManager,
}

impl<L: VectorLayer, S: SettingsStore> FvtApi<L, S> {
    /// Start a session, loading settings from `store`.
    pub fn new(project: Project<L>, store: S, config: FvtConfig) -> Result<Self> {
        let settings = settings::load(&store, &config.namespace)?;
        Ok(Self {
            project,
            store,
            config,
            settings,
            visibility: VisibilityManager::new(),
        })
    }

    pub fn project(&self) -> &Project<L> {
        &self.project
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn panel_settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn visibility(&self) -> &VisibilityManager {
        &self.visibility
    }

    pub fn layers(&self) -> Result<CmdResult> {
        commands::layers::run(&self.project)
    }

    pub fn list_features(&mut self, layer_id: &str) -> Result<CmdResult> {
        let layer = self.project.layer_mut(layer_id)?;
        commands::list::run(layer, &mut self.visibility, &self.settings)
    }

    pub fn show_features(&mut self, layer_id: &str, ids: &[FeatureId]) -> Result<CmdResult> {
        let layer = self.project.layer_mut(layer_id)?;
        commands::toggle::show(layer, &mut self.visibility, ids)
    }

    pub fn hide_features(&mut self, layer_id: &str, ids: &[FeatureId]) -> Result<CmdResult> {
        let layer = self.project.layer_mut(layer_id)?;
        commands::toggle::hide(layer, &mut self.visibility, ids)
    }

    pub fn show_settings(&self) -> Result<CmdResult> {
        commands::configure::show(&self.settings)
    }

    pub fn set_feature_limit(&mut self, limit: usize) -> Result<CmdResult> {
        let result = commands::configure::set_limit(&mut self.settings, &self.config, limit)?;
        self.persist()?;
        Ok(result)
    }

    pub fn select_attributes(&mut self, layer_id: &str, fields: &[String]) -> Result<CmdResult> {
        let layer = self.project.layer(layer_id)?;
        let result = commands::configure::select_attributes(&mut self.settings, layer, fields)?;
        self.persist()?;
        Ok(result)
    }

    pub fn set_filter(
        &mut self,
        layer_id: &str,
        field: &str,
        kind: FilterKind,
        value: &str,
    ) -> Result<CmdResult> {
        let layer = self.project.layer(layer_id)?;
        let result =
            commands::configure::set_filter(&mut self.settings, layer, field, kind, value)?;
        self.persist()?;
        Ok(result)
    }

    pub fn clear_filter(&mut self, layer_id: &str, field: &str) -> Result<CmdResult> {
        self.project.layer(layer_id)?;
        let result = commands::configure::clear_filter(&mut self.settings, layer_id, field)?;
        self.persist()?;
        Ok(result)
    }

    /// Remove the visibility field from every layer. Per-layer failures are
    /// reported as warnings, not errors.
    pub fn cleanup(&mut self) -> Result<CmdResult> {
        commands::cleanup::run(&mut self.project, &mut self.visibility)
    }

    fn persist(&mut self) -> Result<()> {
        settings::save(&mut self.store, &self.config.namespace, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FvtError;
    use crate::layer::memory::fixtures::cities;
    use crate::layer::memory::MemLayer;
    use crate::settings::memory::MemSettings;
    use crate::settings::SettingValue;
    use crate::visibility::VIS_FIELD;

    fn api() -> FvtApi<MemLayer, MemSettings> {
        let project = Project::new(vec![cities()]);
        FvtApi::new(project, MemSettings::new(), FvtConfig::default()).unwrap()
    }

    #[test]
    fn settings_changes_are_persisted() {
        let mut api = api();
        api.set_feature_limit(3).unwrap();
        api.select_attributes("cities_1", &["name".to_string()])
            .unwrap();
        api.set_filter("cities_1", "name", FilterKind::StartsWith, "a")
            .unwrap();

        let store = api.store();
        assert_eq!(
            store.value("FeatureVisibilityToggle/featureLimit").unwrap(),
            Some(SettingValue::Int(3))
        );
        assert_eq!(
            store
                .value("FeatureVisibilityToggle/cities_1/filters")
                .unwrap(),
            Some(SettingValue::Text("name:Starts with:a".into()))
        );

        let reloaded = settings::load(store, "FeatureVisibilityToggle").unwrap();
        assert_eq!(&reloaded, api.panel_settings());
    }

    #[test]
    fn settings_are_loaded_on_start() {
        let mut store = MemSettings::new();
        store
            .set_value("FeatureVisibilityToggle/cities_1/attributes", "pop".into())
            .unwrap();
        let api = FvtApi::new(Project::new(vec![cities()]), store, FvtConfig::default()).unwrap();
        assert_eq!(api.panel_settings().selected_attributes("cities_1"), ["pop"]);
    }

    #[test]
    fn list_toggle_cleanup_cycle() {
        let mut api = api();
        api.select_attributes("cities_1", &["name".to_string()])
            .unwrap();
        api.set_filter("cities_1", "name", FilterKind::Contains, "ac")
            .unwrap();

        let listing = api.list_features("cities_1").unwrap().listing.unwrap();
        let ids: Vec<_> = listing.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        api.hide_features("cities_1", &[3]).unwrap();
        assert_eq!(api.visibility().cached("cities_1", 3), Some(false));
        let summary = &api.layers().unwrap().layers[0];
        assert_eq!(summary.visible_count, 4);

        api.cleanup().unwrap();
        let layer = api.project().layer("cities_1").unwrap();
        assert!(!layer.has_field(VIS_FIELD));
        assert_eq!(layer.subset_string(), "");
    }

    #[test]
    fn unknown_layer() {
        let mut api = api();
        assert!(matches!(
            api.list_features("nope"),
            Err(FvtError::LayerNotFound(_))
        ));
        assert!(api.clear_filter("nope", "name").is_err());
    }

    #[test]
    fn failed_persist_surfaces_error() {
        let mut store = MemSettings::new();
        store.set_simulate_write_error(true);
        let mut api = FvtApi::new(Project::new(vec![cities()]), store, FvtConfig::default())
            .unwrap();
        assert!(matches!(
            api.set_feature_limit(5),
            Err(FvtError::Settings(_))
        ));
    }
}
