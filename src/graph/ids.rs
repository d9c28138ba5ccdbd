//! Per-kind block id allocation.
//!
//! Block ids follow the `{kind}-{ordinal}` pattern (`generateText-3`). The
//! allocator keeps one monotonically increasing counter per kind so ids are
//! never reissued within a session, even after deletions. Loading an existing
//! graph seeds the counters past every id it contains, so later allocations
//! cannot collide with loaded blocks.

use rustc_hash::FxHashMap;

use crate::blocks::BlockKind;

/// Issues `{kind}-{ordinal}` block ids, one counter per kind.
///
/// # Examples
///
/// ```rust
/// use flowcanvas::blocks::BlockKind;
/// use flowcanvas::graph::BlockIdAllocator;
///
/// let mut ids = BlockIdAllocator::default();
/// assert_eq!(ids.allocate(&BlockKind::GenerateText), "generateText-1");
/// assert_eq!(ids.allocate(&BlockKind::GenerateText), "generateText-2");
/// assert_eq!(ids.allocate(&BlockKind::DisplayText), "displayText-1");
///
/// // Seeding from a loaded id keeps future allocations ahead of it
/// ids.observe("generateText-7");
/// assert_eq!(ids.allocate(&BlockKind::GenerateText), "generateText-8");
/// ```
#[derive(Clone, Debug, Default)]
pub struct BlockIdAllocator {
    counters: FxHashMap<BlockKind, u64>,
}

impl BlockIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next id for `kind`. Ordinals start at 1.
    pub fn allocate(&mut self, kind: &BlockKind) -> String {
        let counter = self.counters.entry(kind.clone()).or_insert(0);
        *counter += 1;
        format!("{kind}-{counter}")
    }

    /// Notes an existing id so future allocations stay ahead of it.
    ///
    /// Ids that do not follow the `{kind}-{ordinal}` pattern are ignored;
    /// they can never collide with an allocated id.
    pub fn observe(&mut self, id: &str) {
        let Some((prefix, ordinal)) = id.rsplit_once('-') else {
            return;
        };
        let Ok(ordinal) = ordinal.parse::<u64>() else {
            return;
        };
        let kind = BlockKind::from(prefix);
        let counter = self.counters.entry(kind).or_insert(0);
        if ordinal > *counter {
            *counter = ordinal;
        }
    }

    /// Highest ordinal seen or issued for `kind`, 0 if none.
    #[must_use]
    pub fn high_water_mark(&self, kind: &BlockKind) -> u64 {
        self.counters.get(kind).copied().unwrap_or(0)
    }
}
