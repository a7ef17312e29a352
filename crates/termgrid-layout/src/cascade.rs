use std::collections::BTreeMap;

use termgrid_core::{
    grid_line, BlockId, BlockKind, GridArea, LayoutError, Orientation, Rect, Side, Vec2,
};

use crate::LayoutRegistry;

// ──────────────────────────────────────────────
// Trench moves
// ──────────────────────────────────────────────

/// Near and far sides of a trench: left/right for vertical, top/bottom for
/// horizontal.
fn trench_sides(orientation: Orientation) -> (Side, Side) {
    match orientation {
        Orientation::Vertical => (Side::Left, Side::Right),
        Orientation::Horizontal => (Side::Top, Side::Bottom),
    }
}

impl LayoutRegistry {
    /// Move a trench to grid line `line`, dragging along every edge that
    /// touches it.
    ///
    /// Blocks on the near side whose far edge sits on the trench's line get
    /// that edge moved, and likewise for the far side. Trenches running across
    /// those blocks that end on the same line follow them. The move is planned
    /// in full first; if any terminal would fall under the minimum span or
    /// any range would invert, nothing changes.
    pub fn move_trench(&mut self, trench: BlockId, line: i32) -> Result<(), LayoutError> {
        let block = self
            .blocks
            .get(&trench)
            .ok_or(LayoutError::UnknownBlock(trench))?;
        let orientation = block.orientation().ok_or(LayoutError::InvalidOperation {
            operation: "move_trench",
            kind: block.kind(),
        })?;

        let axis = orientation.collapsed_axis();
        let old = block.area().start(axis);
        if line == old {
            return Ok(());
        }
        if !(-GridArea::MAX_LINE..=GridArea::MAX_LINE).contains(&line) {
            log::warn!("cannot move trench {} to line {}: outside the grid", trench, line);
            return Err(LayoutError::LineOutOfRange {
                axis,
                value: f64::from(line),
            });
        }

        let (near, far) = trench_sides(orientation);
        let mut plan: BTreeMap<BlockId, GridArea> = BTreeMap::new();
        let mut moved_area = block.area();
        moved_area.set_start(axis, line);
        moved_area.set_end(axis, line);
        plan.insert(trench, moved_area);

        // (side of the trench, edge of the neighbor that faces it)
        for (side, edge) in [(near, far), (far, near)] {
            for &id in block.neighbors().on(side) {
                let neighbor = self.blocks.get(&id).ok_or(LayoutError::UnknownBlock(id))?;
                let mut area = neighbor.area();
                if area.edge(edge) != old {
                    log::debug!(
                        "{} does not end on line {}, left in place",
                        neighbor.name(),
                        old
                    );
                    continue;
                }
                area.set_edge(edge, line);
                plan.insert(id, area);

                if neighbor.kind() != BlockKind::Terminal {
                    continue;
                }
                // Trenches running across this terminal end where it ends.
                for cross_side in cross_sides(orientation) {
                    for &cross_id in neighbor.neighbors().on(cross_side) {
                        let Some(cross) = self.blocks.get(&cross_id) else {
                            continue;
                        };
                        if cross.kind() != BlockKind::Trench(crossing(orientation)) {
                            continue;
                        }
                        let mut cross_area = plan.get(&cross_id).copied().unwrap_or(cross.area());
                        if cross_area.edge(edge) == old {
                            cross_area.set_edge(edge, line);
                            plan.insert(cross_id, cross_area);
                        }
                    }
                }
            }
        }

        let min = self.settings.min_span(axis);
        for (&id, area) in &plan {
            let b = &self.blocks[&id];
            if let Err(e) = area.validate() {
                log::warn!("cannot move trench {}: {} ({})", trench, e, b.name());
                return Err(e);
            }
            if b.kind() == BlockKind::Terminal && area.span(axis) < min {
                log::warn!(
                    "cannot move trench {} to {}: {} would span {}",
                    trench,
                    line,
                    b.name(),
                    area.span(axis)
                );
                return Err(LayoutError::PaneTooSmall {
                    id,
                    axis,
                    span: area.span(axis),
                    min,
                });
            }
        }

        let count = plan.len();
        for (id, area) in plan {
            if let Some(b) = self.blocks.get_mut(&id) {
                b.apply_area(area)?;
            }
        }
        log::debug!("moved trench {} from {} to {} ({} blocks)", trench, old, line, count);
        Ok(())
    }

    // ──────────────────────────────────────────
    // Pointer drags
    // ──────────────────────────────────────────

    /// Find the trench closest to `point`, within the hit threshold.
    pub fn trench_at(&self, point: Vec2) -> Option<BlockId> {
        let threshold = self.settings.drag_hit_threshold_px;
        let mut best: Option<(f32, BlockId)> = None;
        for b in self.blocks.values() {
            let Some(orientation) = b.orientation() else {
                continue;
            };
            // Hit zone: the trench's grid line widened by the threshold.
            let rect = b.rect();
            let (zone, dist) = match orientation {
                Orientation::Vertical => (
                    Rect::new(rect.x - threshold, rect.y, 2.0 * threshold, rect.height),
                    (point.x - rect.x).abs(),
                ),
                Orientation::Horizontal => (
                    Rect::new(rect.x, rect.y - threshold, rect.width, 2.0 * threshold),
                    (point.y - rect.y).abs(),
                ),
            };
            if !zone.contains(point) {
                continue;
            }
            if best.map_or(true, |(best_dist, _)| dist < best_dist) {
                best = Some((dist, b.id()));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Start dragging the trench under `point`. Returns the trench, if any.
    pub fn begin_drag(&mut self, point: Vec2) -> Option<BlockId> {
        self.active_drag = self.trench_at(point);
        self.active_drag
    }

    /// Move the dragged trench to the grid line nearest to `point`.
    /// Does nothing when no drag is active.
    pub fn drag_to(&mut self, point: Vec2) -> Result<(), LayoutError> {
        let Some(trench) = self.active_drag else {
            return Ok(());
        };
        let orientation = match self.blocks.get(&trench).and_then(|b| b.orientation()) {
            Some(o) => o,
            None => {
                self.active_drag = None;
                return Err(LayoutError::UnknownBlock(trench));
            }
        };
        let axis = orientation.collapsed_axis();
        let px = match orientation {
            Orientation::Vertical => point.x,
            Orientation::Horizontal => point.y,
        };
        let line = grid_line(axis, px / self.units.along(axis))?;
        self.move_trench(trench, line)
    }

    pub fn end_drag(&mut self) {
        self.active_drag = None;
    }

    pub fn active_drag(&self) -> Option<BlockId> {
        self.active_drag
    }
}

/// Sides of a terminal where trenches crossing a moved edge are found.
fn cross_sides(orientation: Orientation) -> [Side; 2] {
    match orientation {
        Orientation::Vertical => [Side::Top, Side::Bottom],
        Orientation::Horizontal => [Side::Left, Side::Right],
    }
}

fn crossing(orientation: Orientation) -> Orientation {
    match orientation {
        Orientation::Vertical => Orientation::Horizontal,
        Orientation::Horizontal => Orientation::Vertical,
    }
}
