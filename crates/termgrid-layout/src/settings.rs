use serde::{Deserialize, Serialize};
use termgrid_core::{Axis, UnitSize};

/// Tunables of the layout engine. Every field falls back to its default when
/// missing from a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Pixel height of one grid row.
    pub row_unit_px: f32,
    /// Pixel width of one grid column.
    pub column_unit_px: f32,
    /// Thickness of a trench along the axis it divides.
    pub trench_thickness_px: f32,
    /// Smallest row span a terminal may be split or dragged down to.
    pub min_pane_rows: i32,
    /// Smallest column span a terminal may be split or dragged down to.
    pub min_pane_columns: i32,
    /// How far from a trench (in pixels) a drag may start.
    pub drag_hit_threshold_px: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            row_unit_px: 20.0,
            column_unit_px: 9.0,
            trench_thickness_px: 1.5,
            min_pane_rows: 2,
            min_pane_columns: 4,
            drag_hit_threshold_px: 4.0,
        }
    }
}

impl LayoutSettings {
    pub fn units(&self) -> UnitSize {
        UnitSize::new(self.row_unit_px, self.column_unit_px)
    }

    pub fn min_span(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Row => self.min_pane_rows,
            Axis::Column => self.min_pane_columns,
        }
    }
}
