use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::layer::VectorLayer;
use crate::project::Project;
use crate::visibility::VisibilityManager;

/// Remove the visibility field and filter from every layer in the project.
pub fn run<L: VectorLayer>(
    project: &mut Project<L>,
    visibility: &mut VisibilityManager,
) -> Result<CmdResult> {
    let report = visibility.cleanup(project.layers_mut());
    let mut result = CmdResult::default();

    for layer_id in &report.cleaned {
        result.add_message(CmdMessage::success(format!(
            "Removed visibility field from {}",
            layer_id
        )));
    }
    for (layer_id, error) in &report.failed {
        result.add_message(CmdMessage::error(format!(
            "Could not clean {}: {}",
            layer_id, error
        )));
    }
    if report.cleaned.is_empty() && report.failed.is_empty() {
        result.add_message(CmdMessage::info("Nothing to clean up"));
    }

    Ok(result)
}
