use crate::commands::{CmdResult, LayerSummary};
use crate::error::Result;
use crate::layer::VectorLayer;
use crate::project::Project;
use crate::visibility::VIS_FIELD;

pub fn summarize<L: VectorLayer + ?Sized>(layer: &L) -> Result<LayerSummary> {
    Ok(LayerSummary {
        id: layer.id().to_string(),
        name: layer.name().to_string(),
        feature_count: layer.all_features()?.len(),
        visible_count: layer.feature_count()?,
        has_visibility_field: layer.has_field(VIS_FIELD),
        filter: layer.subset_string().to_string(),
    })
}

pub fn run<L: VectorLayer>(project: &Project<L>) -> Result<CmdResult> {
    let summaries = project
        .layers()
        .iter()
        .map(summarize)
        .collect::<Result<Vec<_>>>()?;
    Ok(CmdResult::default().with_layers(summaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::memory::fixtures::cities;
    use crate::layer::memory::MemLayer;
    use crate::visibility::VisibilityManager;

    #[test]
    fn lists_every_layer_with_counts() {
        let mut manager = VisibilityManager::new();
        let mut layer = cities();
        manager.ensure_flag_field(&mut layer).unwrap();
        manager.set_flag(&mut layer, 2, false).unwrap();
        manager.recompute_layer_filter(&mut layer).unwrap();

        let project = Project::new(vec![layer, MemLayer::new("empty", "Empty")]);
        let result = run(&project).unwrap();

        assert_eq!(result.layers.len(), 2);
        let cities = &result.layers[0];
        assert_eq!(cities.name, "Cities");
        assert_eq!(cities.feature_count, 5);
        assert_eq!(cities.visible_count, 4);
        assert!(cities.has_visibility_field);
        assert_eq!(cities.filter, "\"_fvt_vis\" = 1");

        let empty = &result.layers[1];
        assert_eq!(empty.feature_count, 0);
        assert!(!empty.has_visibility_field);
    }
}
