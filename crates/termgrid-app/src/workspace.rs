// Builds the initial workspace from settings: one root terminal covering
// the whole grid, then the configured splits in order.

use termgrid_core::{BlockKind, LayoutError, Size};
use termgrid_layout::LayoutRegistry;

use crate::settings::AppSettings;

pub fn build_workspace(settings: &AppSettings) -> Result<LayoutRegistry, LayoutError> {
    let ws = &settings.workspace;
    let layout = &settings.layout;
    let size = Size::new(
        ws.columns as f32 * layout.column_unit_px,
        ws.rows as f32 * layout.row_unit_px,
    );
    let mut registry = LayoutRegistry::with_settings(layout.clone(), size);

    let root = registry.create_block("terminal0", BlockKind::Terminal, None)?;
    if let Some(block) = registry.block_mut(root) {
        block.set_area(0.0, ws.rows as f32, 0.0, ws.columns as f32)?;
    }
    registry.bind_terminal(ws.root_name.clone(), root)?;

    for step in &settings.splits {
        let target = registry
            .terminal_id(&step.target)
            .ok_or_else(|| LayoutError::Configuration(format!("no terminal bound as {:?}", step.target)))?;
        let out = registry.split(target, step.orientation)?;
        if let Some(name) = &step.bind_as {
            registry.bind_terminal(name.clone(), out.pane)?;
        }
        log::info!(
            "split {:?} {:?} -> pane {} (trench {})",
            step.target,
            step.orientation,
            out.pane,
            out.trench
        );
    }

    Ok(registry)
}
