use termgrid_core::{Axis, BlockId, BlockKind, GridArea, LayoutError, Orientation, Side};

use crate::{neighbors, LayoutRegistry};

/// Ids created by [`LayoutRegistry::split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub trench: BlockId,
    pub pane: BlockId,
}

/// Areas of the three blocks after halving a terminal.
struct SplitPlan {
    target: GridArea,
    trench: GridArea,
    pane: GridArea,
}

/// Halve `area` along the axis the trench collapses. The new pane goes on
/// the occupied side: right of a vertical trench, above a horizontal one.
fn plan_split(area: GridArea, orientation: Orientation) -> SplitPlan {
    let axis = orientation.collapsed_axis();
    let (start, end) = (area.start(axis), area.end(axis));
    let mid = ((i64::from(start) + i64::from(end)) as f64 / 2.0).round() as i32;

    let mut near = area;
    near.set_end(axis, mid);
    let mut far = area;
    far.set_start(axis, mid);
    let mut trench = area;
    trench.set_start(axis, mid);
    trench.set_end(axis, mid);

    match orientation {
        Orientation::Vertical => SplitPlan {
            target: near,
            trench,
            pane: far,
        },
        Orientation::Horizontal => SplitPlan {
            target: far,
            trench,
            pane: near,
        },
    }
}

fn perpendicular(side: Side) -> [Side; 2] {
    match side.axis() {
        Axis::Column => [Side::Top, Side::Bottom],
        Axis::Row => [Side::Left, Side::Right],
    }
}

fn overlaps(a: &GridArea, b: &GridArea, axis: Axis) -> bool {
    a.start(axis) < b.end(axis) && b.start(axis) < a.end(axis)
}

impl LayoutRegistry {
    /// Split a terminal in half with a trench between the halves.
    ///
    /// The neighbor graph stays symmetric: blocks beyond the split edge are
    /// handed over to the new pane, and perpendicular neighbors are shared by
    /// whichever half they still touch. Rejected with `PaneTooSmall` when
    /// either half would fall under the configured minimum span.
    pub fn split(
        &mut self,
        target: BlockId,
        orientation: Orientation,
    ) -> Result<SplitOutcome, LayoutError> {
        let block = self
            .blocks
            .get(&target)
            .ok_or(LayoutError::UnknownBlock(target))?;
        if block.kind() != BlockKind::Terminal {
            return Err(LayoutError::InvalidOperation {
                operation: "split",
                kind: block.kind(),
            });
        }

        let axis = orientation.collapsed_axis();
        let plan = plan_split(block.area(), orientation);
        let min = self.settings.min_span(axis);
        let smaller = plan.target.span(axis).min(plan.pane.span(axis));
        if smaller < min {
            log::warn!(
                "cannot split {}: halves would span {} {}s (minimum {})",
                block.name(),
                smaller,
                axis,
                min
            );
            return Err(LayoutError::PaneTooSmall {
                id: target,
                axis,
                span: smaller,
                min,
            });
        }

        let side = orientation.occupied_side();
        let trench_name = self.next_trench_name();
        let trench = self.create_block(trench_name, BlockKind::Trench(orientation), Some(target))?;
        let pane_name = self.next_terminal_name();
        let pane = self.create_block(pane_name, BlockKind::Terminal, None)?;

        // The trench passes everything beyond it on to the new pane.
        self.with_pair(trench, pane, |t, p| {
            neighbors::hand_over(&mut t.neighbors, &mut p.neighbors, side, pane);
            p.neighbors.insert(side.opposite(), trench);
            t.set_first_sibling(pane)
        })??;

        let beyond: Vec<BlockId> = self.blocks[&pane].neighbors().on(side).iter().copied().collect();
        for id in beyond {
            if let Some(b) = self.blocks.get_mut(&id) {
                b.neighbors.replace(side.opposite(), target, pane);
            }
        }

        // Perpendicular neighbors touch whichever halves they overlap.
        for perp in perpendicular(side) {
            let candidates: Vec<BlockId> =
                self.blocks[&target].neighbors().on(perp).iter().copied().collect();
            for id in candidates {
                let Some(other) = self.blocks.get_mut(&id) else {
                    continue;
                };
                // A neighbor without a span on this axis has no placement yet;
                // keep it next to both halves.
                let other_area = other.area();
                let placed = other_area.span(axis) > 0;
                let touches_pane = !placed || overlaps(&other_area, &plan.pane, axis);
                let touches_target = !placed || overlaps(&other_area, &plan.target, axis);
                if touches_pane {
                    other.neighbors.insert(perp.opposite(), pane);
                }
                if !touches_target {
                    other.neighbors.remove(perp.opposite(), target);
                }
                if touches_pane {
                    if let Some(p) = self.blocks.get_mut(&pane) {
                        p.neighbors.insert(perp, id);
                    }
                }
                if !touches_target {
                    if let Some(t) = self.blocks.get_mut(&target) {
                        t.neighbors.remove(perp, id);
                    }
                }
            }
        }

        for (id, area) in [(target, plan.target), (trench, plan.trench), (pane, plan.pane)] {
            if let Some(b) = self.blocks.get_mut(&id) {
                b.apply_area(area)?;
            }
        }

        log::debug!(
            "split block {} {:?}: trench {}, pane {}",
            target,
            orientation,
            trench,
            pane
        );
        Ok(SplitOutcome { trench, pane })
    }
}
