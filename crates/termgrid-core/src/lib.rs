use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel size of one grid row and one grid column, shared workspace-wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSize {
    pub row_px: f32,
    pub column_px: f32,
}

impl UnitSize {
    pub fn new(row_px: f32, column_px: f32) -> Self {
        Self { row_px, column_px }
    }

    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Row => self.row_px,
            Axis::Column => self.column_px,
        }
    }
}

// ──────────────────────────────────────────────
// Identity
// ──────────────────────────────────────────────

pub type BlockId = u64;

// ──────────────────────────────────────────────
// Directions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// The axis whose coordinates change when crossing this side.
    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Column,
            Side::Top | Side::Bottom => Axis::Row,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        };
        f.write_str(s)
    }
}

/// Orientation of a trench.
///
/// A `Vertical` trench divides columns: its neighbors are on the left and
/// right. A `Horizontal` trench divides rows: its neighbors are on the top
/// and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Side of the parent block that a trench of this orientation occupies.
    pub fn occupied_side(self) -> Side {
        match self {
            Orientation::Vertical => Side::Right,
            Orientation::Horizontal => Side::Top,
        }
    }

    /// Axis collapsed to zero span on a trench of this orientation.
    pub fn collapsed_axis(self) -> Axis {
        match self {
            Orientation::Vertical => Axis::Column,
            Orientation::Horizontal => Axis::Row,
        }
    }
}

// ──────────────────────────────────────────────
// Block kinds
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Terminal,
    Trench(Orientation),
}

impl BlockKind {
    pub fn is_trench(&self) -> bool {
        matches!(self, BlockKind::Trench(_))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            BlockKind::Terminal => None,
            BlockKind::Trench(orientation) => Some(*orientation),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Terminal => f.write_str("terminal"),
            BlockKind::Trench(Orientation::Vertical) => f.write_str("trench(vertical)"),
            BlockKind::Trench(Orientation::Horizontal) => f.write_str("trench(horizontal)"),
        }
    }
}

/// Selects blocks by kind regardless of trench orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Terminal,
    Trench,
}

impl KindFilter {
    pub fn matches(&self, kind: BlockKind) -> bool {
        match self {
            KindFilter::Terminal => kind == BlockKind::Terminal,
            KindFilter::Trench => kind.is_trench(),
        }
    }
}

// ──────────────────────────────────────────────
// Grid area
// ──────────────────────────────────────────────

/// Grid-line span of a block on both axes.
///
/// A validated area keeps every line within `-MAX_LINE..=MAX_LINE`, so spans
/// and midpoints never overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridArea {
    pub row_start: i32,
    pub row_end: i32,
    pub column_start: i32,
    pub column_end: i32,
}

impl GridArea {
    /// Largest grid line magnitude. Every line in this range is exact as `f32`.
    pub const MAX_LINE: i32 = 1 << 24;

    pub fn new(row_start: i32, row_end: i32, column_start: i32, column_end: i32) -> Self {
        Self {
            row_start,
            row_end,
            column_start,
            column_end,
        }
    }

    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Row => self.row_start,
            Axis::Column => self.column_start,
        }
    }

    pub fn end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Row => self.row_end,
            Axis::Column => self.column_end,
        }
    }

    /// `end - start`, saturating for areas built outside the line range.
    pub fn span(&self, axis: Axis) -> i32 {
        self.end(axis).saturating_sub(self.start(axis))
    }

    pub fn set_start(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Row => self.row_start = value,
            Axis::Column => self.column_start = value,
        }
    }

    pub fn set_end(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Row => self.row_end = value,
            Axis::Column => self.column_end = value,
        }
    }

    /// Grid line on the given side of the area.
    pub fn edge(&self, side: Side) -> i32 {
        match side {
            Side::Left => self.column_start,
            Side::Right => self.column_end,
            Side::Top => self.row_start,
            Side::Bottom => self.row_end,
        }
    }

    pub fn set_edge(&mut self, side: Side, value: i32) {
        match side {
            Side::Left => self.column_start = value,
            Side::Right => self.column_end = value,
            Side::Top => self.row_start = value,
            Side::Bottom => self.row_end = value,
        }
    }

    /// Checks that every line is in range and `start <= end` on both axes.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for axis in [Axis::Row, Axis::Column] {
            let (start, end) = (self.start(axis), self.end(axis));
            for line in [start, end] {
                if !(-Self::MAX_LINE..=Self::MAX_LINE).contains(&line) {
                    return Err(LayoutError::LineOutOfRange {
                        axis,
                        value: f64::from(line),
                    });
                }
            }
            if start > end {
                return Err(LayoutError::RangeInvariant { axis, start, end });
            }
        }
        Ok(())
    }
}

/// Round a coordinate to the nearest grid line. Non-finite values and lines
/// beyond [`GridArea::MAX_LINE`] are rejected.
pub fn grid_line(axis: Axis, value: f32) -> Result<i32, LayoutError> {
    let line = value.round();
    let limit = GridArea::MAX_LINE as f32;
    if !line.is_finite() || line.abs() > limit {
        return Err(LayoutError::LineOutOfRange {
            axis,
            value: f64::from(value),
        });
    }
    Ok(line as i32)
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Every failure the layout engine reports. All of them are recoverable:
/// a rejected operation leaves the layout exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("{axis} start cannot be greater than end (start: {start}, end: {end})")]
    RangeInvariant { axis: Axis, start: i32, end: i32 },

    #[error("{axis} line {value} is outside the grid")]
    LineOutOfRange { axis: Axis, value: f64 },

    #[error("invalid block configuration: {0}")]
    Configuration(String),

    #[error("{operation} is not valid for a {kind} block")]
    InvalidOperation {
        operation: &'static str,
        kind: BlockKind,
    },

    #[error("terminal name already bound: {0}")]
    DuplicateName(String),

    #[error("no block with id {0}")]
    UnknownBlock(BlockId),

    #[error("block {id} would span {span} {axis}s, minimum is {min}")]
    PaneTooSmall {
        id: BlockId,
        axis: Axis,
        span: i32,
        min: i32,
    },
}
