use std::collections::BTreeSet;

use termgrid_core::{BlockId, Side};

// ──────────────────────────────────────────────
// Neighbors: per-side adjacency lists
// ──────────────────────────────────────────────

/// The blocks touching each of the four sides of a block.
///
/// Entries are ids, never owned blocks: a block stays alive only through the
/// registry. Sets are ordered so iteration and snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    left: BTreeSet<BlockId>,
    right: BTreeSet<BlockId>,
    top: BTreeSet<BlockId>,
    bottom: BTreeSet<BlockId>,
}

impl Neighbors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, side: Side) -> &BTreeSet<BlockId> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    fn on_mut(&mut self, side: Side) -> &mut BTreeSet<BlockId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }

    pub fn contains(&self, side: Side, id: BlockId) -> bool {
        self.on(side).contains(&id)
    }

    /// Union `ids` into the set on `side`. Never removes anything.
    pub fn extend<I>(&mut self, side: Side, ids: I)
    where
        I: IntoIterator<Item = BlockId>,
    {
        self.on_mut(side).extend(ids);
    }

    pub fn insert(&mut self, side: Side, id: BlockId) -> bool {
        self.on_mut(side).insert(id)
    }

    pub fn remove(&mut self, side: Side, id: BlockId) -> bool {
        self.on_mut(side).remove(&id)
    }

    /// Replace `old` with `new` on `side`. Returns false if `old` was absent.
    pub fn replace(&mut self, side: Side, old: BlockId, new: BlockId) -> bool {
        let set = self.on_mut(side);
        if set.remove(&old) {
            set.insert(new);
            true
        } else {
            false
        }
    }

    /// Drop `id` from every side. Returns true if anything was removed.
    pub fn prune(&mut self, id: BlockId) -> bool {
        let mut removed = false;
        for side in Side::ALL {
            removed |= self.on_mut(side).remove(&id);
        }
        removed
    }

    /// Every id referenced on any side, deduplicated.
    pub fn all(&self) -> BTreeSet<BlockId> {
        Side::ALL
            .iter()
            .flat_map(|side| self.on(*side).iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Side::ALL.iter().all(|side| self.on(*side).is_empty())
    }
}

/// Insert a new block on `side` of an existing one.
///
/// The newcomer inherits every neighbor `from` had on `side`, and becomes
/// `from`'s only neighbor there. Both sets change inside this one call.
pub fn hand_over(from: &mut Neighbors, to: &mut Neighbors, side: Side, newcomer: BlockId) {
    let inherited = std::mem::take(from.on_mut(side));
    to.on_mut(side).extend(inherited);
    from.on_mut(side).insert(newcomer);
}
