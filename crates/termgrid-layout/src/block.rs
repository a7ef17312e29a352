use serde::Serialize;
use termgrid_core::{
    grid_line, Axis, BlockId, BlockKind, GridArea, LayoutError, Orientation, Rect, Side, UnitSize,
};

use crate::neighbors::{self, Neighbors};

// ──────────────────────────────────────────────
// Block: one cell of the partition
// ──────────────────────────────────────────────

/// A reference from a trench to a block on one of its sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: BlockId,
    pub side: Side,
}

/// A terminal pane or a trench (divider) in the workspace grid.
///
/// A block owns its grid-line span and derives its pixel size from it. The
/// adjacency to other blocks is stored as ids in [`Neighbors`].
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    name: String,
    kind: BlockKind,
    area: GridArea,
    width_px: f32,
    height_px: f32,
    units: UnitSize,
    trench_thickness_px: f32,
    pub(crate) neighbors: Neighbors,
    parent: Option<Link>,
    first_sibling: Option<Link>,
}

impl Block {
    /// Build a block. A trench must be carved out of a `parent`: it takes over
    /// the parent's side given by [`Orientation::occupied_side`] together with
    /// every neighbor the parent had there. A terminal never has a parent.
    pub fn create(
        id: BlockId,
        name: impl Into<String>,
        kind: BlockKind,
        units: UnitSize,
        trench_thickness_px: f32,
        parent: Option<&mut Block>,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let mut block = Self {
            id,
            name,
            kind,
            area: GridArea::default(),
            width_px: 0.0,
            height_px: 0.0,
            units,
            trench_thickness_px,
            neighbors: Neighbors::new(),
            parent: None,
            first_sibling: None,
        };

        match (kind, parent) {
            (BlockKind::Terminal, None) => {}
            (BlockKind::Terminal, Some(parent)) => {
                return Err(LayoutError::Configuration(format!(
                    "terminal block {:?} cannot take a parent (got block {})",
                    block.name, parent.id
                )));
            }
            (BlockKind::Trench(_), None) => {
                return Err(LayoutError::Configuration(format!(
                    "cannot create trench {:?} without a parent block",
                    block.name
                )));
            }
            (BlockKind::Trench(orientation), Some(parent)) => {
                if parent.id == id {
                    return Err(LayoutError::Configuration(format!(
                        "trench {:?} cannot be its own parent",
                        block.name
                    )));
                }
                let side = orientation.occupied_side();
                neighbors::hand_over(&mut parent.neighbors, &mut block.neighbors, side, id);
                block.neighbors.insert(side.opposite(), parent.id);
                block.parent = Some(Link {
                    id: parent.id,
                    side,
                });
            }
        }

        block.recompute_geometry();
        Ok(block)
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.kind.orientation()
    }

    pub fn area(&self) -> GridArea {
        self.area
    }

    pub fn width_px(&self) -> f32 {
        self.width_px
    }

    pub fn height_px(&self) -> f32 {
        self.height_px
    }

    pub fn units(&self) -> UnitSize {
        self.units
    }

    pub fn neighbors(&self) -> &Neighbors {
        &self.neighbors
    }

    /// The block this trench was carved out of, and which of its sides the
    /// trench occupies.
    pub fn parent_link(&self) -> Option<Link> {
        self.parent
    }

    pub fn first_sibling(&self) -> Option<Link> {
        self.first_sibling
    }

    /// Pixel rectangle for the renderer. Trenches sit on their grid line.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.area.column_start as f32 * self.units.column_px,
            self.area.row_start as f32 * self.units.row_px,
            self.width_px,
            self.height_px,
        )
    }

    /// Record the first block split off past this trench: on the right of a
    /// vertical trench, on the bottom of a horizontal one.
    pub fn set_first_sibling(&mut self, sibling: BlockId) -> Result<(), LayoutError> {
        match self.kind {
            BlockKind::Terminal => {
                log::warn!(
                    "cannot set first sibling on {}: not a trench",
                    self.name
                );
                Err(LayoutError::InvalidOperation {
                    operation: "set_first_sibling",
                    kind: self.kind,
                })
            }
            BlockKind::Trench(orientation) => {
                let side = match orientation {
                    Orientation::Vertical => Side::Right,
                    Orientation::Horizontal => Side::Bottom,
                };
                self.first_sibling = Some(Link { id: sibling, side });
                Ok(())
            }
        }
    }

    /// Add one or many blocks to the neighbor set on `side`. Existing members
    /// are kept.
    pub fn add_sibling<I>(&mut self, side: Side, ids: I)
    where
        I: IntoIterator<Item = BlockId>,
    {
        self.neighbors.extend(side, ids);
    }

    pub fn set_row_start(&mut self, value: f32) -> Result<(), LayoutError> {
        self.set_bound(Axis::Row, true, value)
    }

    pub fn set_row_end(&mut self, value: f32) -> Result<(), LayoutError> {
        self.set_bound(Axis::Row, false, value)
    }

    pub fn set_column_start(&mut self, value: f32) -> Result<(), LayoutError> {
        self.set_bound(Axis::Column, true, value)
    }

    pub fn set_column_end(&mut self, value: f32) -> Result<(), LayoutError> {
        self.set_bound(Axis::Column, false, value)
    }

    /// Set all four bounds at once. Every value and both axes are checked
    /// before anything is applied.
    pub fn set_area(
        &mut self,
        row_start: f32,
        row_end: f32,
        column_start: f32,
        column_end: f32,
    ) -> Result<(), LayoutError> {
        let next = GridArea::new(
            self.round_cell(Axis::Row, row_start)?,
            self.round_cell(Axis::Row, row_end)?,
            self.round_cell(Axis::Column, column_start)?,
            self.round_cell(Axis::Column, column_end)?,
        );
        self.apply_area(next)
    }

    /// Replace the unit sizes and recompute pixel geometry.
    pub fn set_units(&mut self, units: UnitSize) {
        self.units = units;
        self.recompute_geometry();
    }

    /// Derive pixel size from span and unit sizes. A trench keeps its
    /// collapsed axis at zero span and a fixed thickness.
    pub fn recompute_geometry(&mut self) {
        let span_px = |area: &GridArea, axis: Axis, units: &UnitSize| {
            area.span(axis) as f32 * units.along(axis)
        };
        match self.kind {
            BlockKind::Terminal => {
                self.width_px = span_px(&self.area, Axis::Column, &self.units);
                self.height_px = span_px(&self.area, Axis::Row, &self.units);
            }
            BlockKind::Trench(Orientation::Vertical) => {
                self.area.column_end = self.area.column_start;
                self.width_px = self.trench_thickness_px;
                self.height_px = span_px(&self.area, Axis::Row, &self.units);
            }
            BlockKind::Trench(Orientation::Horizontal) => {
                self.area.row_end = self.area.row_start;
                self.width_px = span_px(&self.area, Axis::Column, &self.units);
                self.height_px = self.trench_thickness_px;
            }
        }
        log::trace!(
            "{} recomputed: {}x{}px",
            self.name,
            self.width_px,
            self.height_px
        );
    }

    /// Validate and apply a whole area.
    pub(crate) fn apply_area(&mut self, next: GridArea) -> Result<(), LayoutError> {
        if let Err(e) = next.validate() {
            log::warn!("rejected area for {}: {}", self.name, e);
            return Err(e);
        }
        self.area = next;
        self.recompute_geometry();
        Ok(())
    }

    /// Drop every neighbor entry and link that points at `id`.
    pub(crate) fn forget(&mut self, id: BlockId) {
        self.neighbors.prune(id);
        if self.parent.is_some_and(|link| link.id == id) {
            self.parent = None;
        }
        if self.first_sibling.is_some_and(|link| link.id == id) {
            self.first_sibling = None;
        }
    }

    fn set_bound(&mut self, axis: Axis, is_start: bool, value: f32) -> Result<(), LayoutError> {
        let line = self.round_cell(axis, value)?;
        let mut next = self.area;
        if is_start {
            next.set_start(axis, line);
        } else {
            next.set_end(axis, line);
        }

        let (start, end) = (next.start(axis), next.end(axis));
        if start > end {
            let err = LayoutError::RangeInvariant { axis, start, end };
            log::warn!("rejected {} bound for {}: {}", axis, self.name, err);
            return Err(err);
        }

        self.area = next;
        self.recompute_geometry();
        Ok(())
    }

    /// Round a coordinate to the nearest grid line, rejecting NaN, infinities
    /// and lines outside the grid.
    fn round_cell(&self, axis: Axis, value: f32) -> Result<i32, LayoutError> {
        grid_line(axis, value).map_err(|e| {
            log::warn!("rejected {} coordinate for {}: {}", axis, self.name, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNITS: UnitSize = UnitSize {
        row_px: 20.0,
        column_px: 30.0,
    };
    const THICKNESS: f32 = 1.5;

    fn terminal(id: BlockId) -> Block {
        Block::create(id, format!("terminal{id}"), BlockKind::Terminal, UNITS, THICKNESS, None)
            .unwrap()
    }

    fn trench(id: BlockId, orientation: Orientation, parent: &mut Block) -> Block {
        Block::create(
            id,
            format!("trench{id}"),
            BlockKind::Trench(orientation),
            UNITS,
            THICKNESS,
            Some(parent),
        )
        .unwrap()
    }

    // ──────────────────────────────────────────
    // Construction
    // ──────────────────────────────────────────

    #[test]
    fn test_trench_requires_parent() {
        let err = Block::create(
            1,
            "trench1",
            BlockKind::Trench(Orientation::Vertical),
            UNITS,
            THICKNESS,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Configuration(_)));
    }

    #[test]
    fn test_terminal_rejects_parent() {
        let mut parent = terminal(1);
        let err = Block::create(2, "t", BlockKind::Terminal, UNITS, THICKNESS, Some(&mut parent))
            .unwrap_err();
        assert!(matches!(err, LayoutError::Configuration(_)));
        // parent untouched
        assert!(parent.neighbors().is_empty());
    }

    #[test]
    fn test_vertical_trench_takes_over_right_side() {
        let mut parent = terminal(1);
        parent.add_sibling(Side::Right, [10, 11]);
        parent.add_sibling(Side::Top, [12]);

        let t = trench(2, Orientation::Vertical, &mut parent);

        assert_eq!(
            t.neighbors().on(Side::Right).iter().copied().collect::<Vec<_>>(),
            vec![10, 11]
        );
        assert_eq!(
            parent.neighbors().on(Side::Right).iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
        assert!(t.neighbors().contains(Side::Left, 1));
        assert!(parent.neighbors().contains(Side::Top, 12));
        assert_eq!(
            t.parent_link(),
            Some(Link {
                id: 1,
                side: Side::Right
            })
        );
    }

    #[test]
    fn test_horizontal_trench_takes_over_top_side() {
        let mut parent = terminal(1);
        parent.add_sibling(Side::Top, [5]);

        let t = trench(2, Orientation::Horizontal, &mut parent);

        assert!(t.neighbors().contains(Side::Top, 5));
        assert!(t.neighbors().contains(Side::Bottom, 1));
        assert_eq!(parent.neighbors().on(Side::Top).len(), 1);
        assert!(parent.neighbors().contains(Side::Top, 2));
        assert_eq!(t.parent_link().map(|l| l.side), Some(Side::Top));
    }

    // ──────────────────────────────────────────
    // First sibling
    // ──────────────────────────────────────────

    #[test]
    fn test_first_sibling_only_on_trench() {
        let mut a = terminal(1);
        assert_eq!(
            a.set_first_sibling(2),
            Err(LayoutError::InvalidOperation {
                operation: "set_first_sibling",
                kind: BlockKind::Terminal
            })
        );
        assert!(a.first_sibling().is_none());

        let mut t = trench(3, Orientation::Vertical, &mut a);
        t.set_first_sibling(4).unwrap();
        assert_eq!(
            t.first_sibling(),
            Some(Link {
                id: 4,
                side: Side::Right
            })
        );
    }

    #[test]
    fn test_horizontal_first_sibling_is_below() {
        let mut a = terminal(1);
        let mut t = trench(2, Orientation::Horizontal, &mut a);
        t.set_first_sibling(3).unwrap();
        assert_eq!(
            t.first_sibling(),
            Some(Link {
                id: 3,
                side: Side::Bottom
            })
        );
    }

    // ──────────────────────────────────────────
    // Coordinates and geometry
    // ──────────────────────────────────────────

    #[test]
    fn test_terminal_geometry() {
        let mut a = terminal(1);
        a.set_area(2.0, 5.0, 1.0, 4.0).unwrap();
        assert_eq!(a.height_px(), 60.0);
        assert_eq!(a.width_px(), 90.0);
        assert_eq!(a.rect(), Rect::new(30.0, 40.0, 90.0, 60.0));
    }

    #[test]
    fn test_setters_round_to_nearest_cell() {
        let mut a = terminal(1);
        a.set_row_end(4.6).unwrap();
        a.set_column_end(2.4).unwrap();
        assert_eq!(a.area(), GridArea::new(0, 5, 0, 2));
    }

    #[test]
    fn test_setter_rejects_inverted_range() {
        let mut a = terminal(1);
        a.set_area(2.0, 5.0, 1.0, 4.0).unwrap();

        let err = a.set_row_start(6.0).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RangeInvariant {
                axis: Axis::Row,
                start: 6,
                end: 5
            }
        );
        assert!(a.set_column_end(0.0).is_err());
        assert_eq!(a.area(), GridArea::new(2, 5, 1, 4));
        assert_eq!(a.width_px(), 90.0);
    }

    #[test]
    fn test_set_area_is_all_or_nothing() {
        let mut a = terminal(1);
        a.set_area(0.0, 10.0, 0.0, 10.0).unwrap();

        // valid columns, invalid rows: columns must not be applied
        assert!(a.set_area(8.0, 3.0, 2.0, 4.0).is_err());
        assert_eq!(a.area(), GridArea::new(0, 10, 0, 10));

        // valid rows, invalid columns: rows must not be applied
        assert!(a.set_area(1.0, 3.0, 9.0, 4.0).is_err());
        assert_eq!(a.area(), GridArea::new(0, 10, 0, 10));
    }

    #[test]
    fn test_out_of_grid_coordinates_are_rejected() {
        let mut a = terminal(1);
        a.set_area(2.0, 5.0, 1.0, 4.0).unwrap();

        let err = a.set_area(-3e9, 3e9, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, LayoutError::LineOutOfRange { axis: Axis::Row, .. }));
        assert!(a.set_area(0.0, 1.0, 0.0, f32::NAN).is_err());
        assert!(a.set_row_start(f32::NEG_INFINITY).is_err());
        assert!(a.set_column_end(f32::INFINITY).is_err());
        assert!(a.set_row_end(f32::NAN).is_err());
        assert_eq!(a.area(), GridArea::new(2, 5, 1, 4));
        assert_eq!((a.width_px(), a.height_px()), (90.0, 60.0));
    }

    #[derive(Debug, Clone, Copy)]
    enum Edit {
        RowStart(f32),
        RowEnd(f32),
        ColumnStart(f32),
        ColumnEnd(f32),
        Area(f32, f32, f32, f32),
    }

    #[test]
    fn test_edit_sequence_keeps_ranges() {
        let edits = [
            Edit::Area(0.0, 10.0, 0.0, 10.0),
            Edit::RowStart(12.0),
            Edit::RowEnd(3.4),
            Edit::RowStart(3.6),
            Edit::ColumnEnd(-1.0),
            Edit::ColumnStart(f32::NAN),
            Edit::Area(5.0, 4.0, 0.0, 1.0),
            Edit::ColumnStart(-7.5),
            Edit::Area(1.0, 1.0, 2.0, 2.0),
            Edit::RowEnd(f32::INFINITY),
            Edit::ColumnEnd(1e12),
            Edit::Area(-4.2, 8.8, -3.0, 6.0),
            Edit::RowEnd(-5.0),
            Edit::ColumnStart(6.0),
            Edit::ColumnStart(6.6),
        ];
        for units in [UNITS, UnitSize::new(1.0, 1.0)] {
            let mut a = terminal(1);
            a.set_units(units);
            for edit in edits {
                let before = (a.area(), a.width_px(), a.height_px());
                let result = match edit {
                    Edit::RowStart(v) => a.set_row_start(v),
                    Edit::RowEnd(v) => a.set_row_end(v),
                    Edit::ColumnStart(v) => a.set_column_start(v),
                    Edit::ColumnEnd(v) => a.set_column_end(v),
                    Edit::Area(rs, re, cs, ce) => a.set_area(rs, re, cs, ce),
                };
                let area = a.area();
                match result {
                    Ok(()) => {
                        assert!(area.validate().is_ok(), "{:?} left {:?}", edit, area);
                        assert_eq!(a.width_px(), area.span(Axis::Column) as f32 * units.column_px);
                        assert_eq!(a.height_px(), area.span(Axis::Row) as f32 * units.row_px);
                    }
                    Err(_) => assert_eq!(
                        (area, a.width_px(), a.height_px()),
                        before,
                        "{:?} changed the block",
                        edit
                    ),
                }
            }
            assert_eq!(a.area(), GridArea::new(-4, 9, 6, 6));
        }
    }

    #[test]
    fn test_vertical_trench_collapses_columns() {
        let mut a = terminal(1);
        let mut t = trench(2, Orientation::Vertical, &mut a);
        t.set_area(0.0, 10.0, 5.0, 9.0).unwrap();
        assert_eq!(t.area(), GridArea::new(0, 10, 5, 5));
        assert_eq!(t.width_px(), THICKNESS);
        assert_eq!(t.height_px(), 200.0);
    }

    #[test]
    fn test_horizontal_trench_collapses_rows() {
        let mut a = terminal(1);
        let mut t = trench(2, Orientation::Horizontal, &mut a);
        t.set_area(4.0, 6.0, 0.0, 3.0).unwrap();
        assert_eq!(t.area(), GridArea::new(4, 4, 0, 3));
        assert_eq!(t.height_px(), THICKNESS);
        assert_eq!(t.width_px(), 90.0);
    }

    #[test]
    fn test_set_units_recomputes() {
        let mut a = terminal(1);
        a.set_area(0.0, 10.0, 0.0, 10.0).unwrap();
        assert_eq!((a.width_px(), a.height_px()), (300.0, 200.0));
        a.set_units(UnitSize::new(10.0, 15.0));
        assert_eq!((a.width_px(), a.height_px()), (150.0, 100.0));
    }

    #[test]
    fn test_forget_clears_links() {
        let mut a = terminal(1);
        let mut t = trench(2, Orientation::Vertical, &mut a);
        t.set_first_sibling(3).unwrap();
        t.add_sibling(Side::Right, [3]);
        t.forget(3);
        t.forget(1);
        assert!(t.neighbors().is_empty());
        assert!(t.parent_link().is_none());
        assert!(t.first_sibling().is_none());
    }
}
