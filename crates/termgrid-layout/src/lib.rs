// Grid layout engine
// Tracks terminals and trenches as blocks on a shared row/column grid. The
// partition topology lives in each block's neighbor sets.

mod block;
mod cascade;
mod neighbors;
mod settings;
mod split;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use termgrid_core::{
    BlockId, BlockKind, GridArea, KindFilter, LayoutError, Side, Size, UnitSize,
};

pub use block::{Block, Link};
pub use neighbors::{hand_over, Neighbors};
pub use settings::LayoutSettings;
pub use split::SplitOutcome;

// ──────────────────────────────────────────────
// Counters and snapshots
// ──────────────────────────────────────────────

/// Tallies kept incrementally as blocks and bindings come and go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutCounts {
    pub blocks: usize,
    pub trenches: usize,
    pub terminals: usize,
}

/// Neighbor ids of one block, per side, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborSnapshot {
    pub left: Vec<BlockId>,
    pub right: Vec<BlockId>,
    pub top: Vec<BlockId>,
    pub bottom: Vec<BlockId>,
}

impl From<&Neighbors> for NeighborSnapshot {
    fn from(n: &Neighbors) -> Self {
        let ids = |side: Side| -> Vec<BlockId> { n.on(side).iter().copied().collect() };
        Self {
            left: ids(Side::Left),
            right: ids(Side::Right),
            top: ids(Side::Top),
            bottom: ids(Side::Bottom),
        }
    }
}

/// Read-only view of a block for diagnostics and the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSnapshot {
    pub id: BlockId,
    pub name: String,
    pub kind: BlockKind,
    pub area: GridArea,
    pub width_px: f32,
    pub height_px: f32,
    pub neighbors: NeighborSnapshot,
    pub parent: Option<Link>,
    pub first_sibling: Option<Link>,
}

impl From<&Block> for BlockSnapshot {
    fn from(b: &Block) -> Self {
        Self {
            id: b.id(),
            name: b.name().to_string(),
            kind: b.kind(),
            area: b.area(),
            width_px: b.width_px(),
            height_px: b.height_px(),
            neighbors: NeighborSnapshot::from(b.neighbors()),
            parent: b.parent_link(),
            first_sibling: b.first_sibling(),
        }
    }
}

// ──────────────────────────────────────────────
// LayoutRegistry
// ──────────────────────────────────────────────

/// Owns every block of one workspace and is the only way to create them.
#[derive(Debug)]
pub struct LayoutRegistry {
    units: UnitSize,
    workspace: Size,
    settings: LayoutSettings,
    /// Keyed by id; ids grow monotonically so iteration is creation order.
    blocks: BTreeMap<BlockId, Block>,
    terminals_by_name: BTreeMap<String, BlockId>,
    counts: LayoutCounts,
    next_id: BlockId,
    terminal_seq: u32,
    trench_seq: u32,
    /// Trench currently being dragged, if any.
    pub(crate) active_drag: Option<BlockId>,
}

impl LayoutRegistry {
    pub fn new(units: UnitSize, workspace: Size) -> Self {
        let settings = LayoutSettings {
            row_unit_px: units.row_px,
            column_unit_px: units.column_px,
            ..LayoutSettings::default()
        };
        Self::with_settings(settings, workspace)
    }

    pub fn with_settings(settings: LayoutSettings, workspace: Size) -> Self {
        Self {
            units: settings.units(),
            workspace,
            settings,
            blocks: BTreeMap::new(),
            terminals_by_name: BTreeMap::new(),
            counts: LayoutCounts::default(),
            next_id: 1,
            terminal_seq: 1,
            trench_seq: 1,
            active_drag: None,
        }
    }

    pub fn units(&self) -> UnitSize {
        self.units
    }

    pub fn workspace_size(&self) -> Size {
        self.workspace
    }

    pub fn set_workspace_size(&mut self, size: Size) {
        self.workspace = size;
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn counts(&self) -> LayoutCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Direct access for coordinate edits. Neighbor edits made here are
    /// one-directional; use [`LayoutRegistry::link`] to keep both sides.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    /// All blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Resolve a bound terminal name to its block.
    pub fn terminal(&self, name: &str) -> Option<&Block> {
        self.terminals_by_name
            .get(name)
            .and_then(|id| self.blocks.get(id))
    }

    pub fn terminal_id(&self, name: &str) -> Option<BlockId> {
        self.terminals_by_name.get(name).copied()
    }

    /// Create a block with the workspace unit sizes and register it.
    ///
    /// A trench needs a `parent` and takes over the parent's occupied side
    /// (see [`Block::create`]). Nothing is registered or mutated on error.
    pub fn create_block(
        &mut self,
        name: impl Into<String>,
        kind: BlockKind,
        parent: Option<BlockId>,
    ) -> Result<BlockId, LayoutError> {
        let id = self.next_id;
        let thickness = self.settings.trench_thickness_px;
        let block = match parent {
            Some(parent_id) => {
                let parent = self
                    .blocks
                    .get_mut(&parent_id)
                    .ok_or(LayoutError::UnknownBlock(parent_id))?;
                Block::create(id, name, kind, self.units, thickness, Some(parent))?
            }
            None => Block::create(id, name, kind, self.units, thickness, None)?,
        };
        self.next_id += 1;
        log::debug!("created {} {} (id {})", block.kind(), block.name(), id);
        self.add_block(block);
        Ok(id)
    }

    /// Register a constructed block and bump the counters.
    ///
    /// Not idempotent: adding a block with an id already present replaces the
    /// stored block but still counts it again.
    pub(crate) fn add_block(&mut self, block: Block) {
        self.counts.blocks += 1;
        if block.kind().is_trench() {
            self.counts.trenches += 1;
        }
        self.blocks.insert(block.id(), block);
    }

    /// Bind a session name to the terminal block it renders into.
    pub fn bind_terminal(&mut self, name: impl Into<String>, id: BlockId) -> Result<(), LayoutError> {
        let name = name.into();
        if self.terminals_by_name.contains_key(&name) {
            log::warn!("terminal name {:?} is already bound", name);
            return Err(LayoutError::DuplicateName(name));
        }
        let block = self.blocks.get(&id).ok_or(LayoutError::UnknownBlock(id))?;
        if block.kind() != BlockKind::Terminal {
            return Err(LayoutError::InvalidOperation {
                operation: "bind_terminal",
                kind: block.kind(),
            });
        }
        self.terminals_by_name.insert(name, id);
        self.counts.terminals += 1;
        Ok(())
    }

    /// Make `b` a neighbor on `side` of `a`, and `a` a neighbor on the
    /// opposite side of `b`.
    pub fn link(&mut self, a: BlockId, side: Side, b: BlockId) -> Result<(), LayoutError> {
        if a == b {
            return Err(LayoutError::Configuration(format!(
                "block {} cannot neighbor itself",
                a
            )));
        }
        self.with_pair(a, b, |first, second| {
            first.neighbors.insert(side, b);
            second.neighbors.insert(side.opposite(), a);
        })
    }

    /// Update the shared unit sizes and recompute every block. The unit sizes
    /// and the workspace size are scaled by the given ratios: rows and
    /// height by `height_ratio`, columns and width by `width_ratio`.
    ///
    /// Each block depends only on its own span and the unit sizes, so the
    /// result is independent of iteration order and identical inputs give
    /// identical outputs.
    pub fn resize_workspace(
        &mut self,
        row_unit_px: f32,
        column_unit_px: f32,
        width_ratio: f32,
        height_ratio: f32,
    ) {
        let width_ratio = sanitize_ratio(width_ratio);
        let height_ratio = sanitize_ratio(height_ratio);
        self.units = UnitSize::new(row_unit_px * height_ratio, column_unit_px * width_ratio);
        self.workspace = Size::new(
            self.workspace.width * width_ratio,
            self.workspace.height * height_ratio,
        );
        self.settings.row_unit_px = self.units.row_px;
        self.settings.column_unit_px = self.units.column_px;
        for block in self.blocks.values_mut() {
            block.set_units(self.units);
        }
        log::debug!(
            "workspace resized to {}x{}px: row unit {}px, column unit {}px, {} blocks",
            self.workspace.width,
            self.workspace.height,
            self.units.row_px,
            self.units.column_px,
            self.blocks.len()
        );
    }

    /// Snapshot every block (optionally only one kind) in creation order.
    pub fn describe(&self, filter: Option<KindFilter>) -> Vec<BlockSnapshot> {
        self.blocks
            .values()
            .filter(|b| filter.map_or(true, |f| f.matches(b.kind())))
            .map(BlockSnapshot::from)
            .collect()
    }

    /// Remove a block and every reference to it: neighbor entries, trench
    /// links and terminal bindings. The space it covered is not reassigned.
    pub fn remove_block(&mut self, id: BlockId) -> Result<Block, LayoutError> {
        let block = self.blocks.remove(&id).ok_or(LayoutError::UnknownBlock(id))?;
        for other in self.blocks.values_mut() {
            other.forget(id);
        }

        let bound_before = self.terminals_by_name.len();
        self.terminals_by_name.retain(|_, bound| *bound != id);
        let unbound = bound_before - self.terminals_by_name.len();

        self.counts.blocks = self.counts.blocks.saturating_sub(1);
        if block.kind().is_trench() {
            self.counts.trenches = self.counts.trenches.saturating_sub(1);
        }
        self.counts.terminals = self.counts.terminals.saturating_sub(unbound);

        if self.active_drag == Some(id) {
            self.active_drag = None;
        }
        log::debug!("removed {} {} (id {})", block.kind(), block.name(), id);
        Ok(block)
    }

    /// Every `(a, side, b)` where `b` is on `side` of `a` but `a` is not on
    /// the opposite side of `b`, or `b` does not exist.
    pub fn asymmetric_links(&self) -> Vec<(BlockId, Side, BlockId)> {
        let mut out = Vec::new();
        for block in self.blocks.values() {
            for side in Side::ALL {
                for &other in block.neighbors().on(side) {
                    let mirrored = self
                        .blocks
                        .get(&other)
                        .is_some_and(|o| o.neighbors().contains(side.opposite(), block.id()));
                    if !mirrored {
                        out.push((block.id(), side, other));
                    }
                }
            }
        }
        out
    }

    /// Run `f` with mutable access to two distinct blocks.
    pub(crate) fn with_pair<R>(
        &mut self,
        a: BlockId,
        b: BlockId,
        f: impl FnOnce(&mut Block, &mut Block) -> R,
    ) -> Result<R, LayoutError> {
        if !self.blocks.contains_key(&b) {
            return Err(LayoutError::UnknownBlock(b));
        }
        let mut first = self.blocks.remove(&a).ok_or(LayoutError::UnknownBlock(a))?;
        let result = match self.blocks.get_mut(&b) {
            Some(second) => Ok(f(&mut first, second)),
            None => Err(LayoutError::UnknownBlock(b)),
        };
        self.blocks.insert(a, first);
        result
    }

    fn next_terminal_name(&mut self) -> String {
        let name = format!("terminal{}", self.terminal_seq);
        self.terminal_seq += 1;
        name
    }

    fn next_trench_name(&mut self) -> String {
        let name = format!("trench{}", self.trench_seq);
        self.trench_seq += 1;
        name
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        log::warn!("ignoring invalid resize ratio {}", ratio);
        1.0
    }
}

impl fmt::Display for LayoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "workspace {}x{}px, units {}x{}px, {} blocks ({} trenches, {} bound terminals)",
            self.workspace.width,
            self.workspace.height,
            self.units.column_px,
            self.units.row_px,
            self.counts.blocks,
            self.counts.trenches,
            self.counts.terminals
        )?;
        for b in self.blocks.values() {
            let a = b.area();
            let n = NeighborSnapshot::from(b.neighbors());
            writeln!(
                f,
                "  [{}] {} {} rows {}..{} cols {}..{} {}x{}px L{:?} R{:?} T{:?} B{:?}",
                b.id(),
                b.name(),
                b.kind(),
                a.row_start,
                a.row_end,
                a.column_start,
                a.column_end,
                b.width_px(),
                b.height_px(),
                n.left,
                n.right,
                n.top,
                n.bottom
            )?;
        }
        Ok(())
    }
}
