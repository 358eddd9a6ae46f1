//! Collection diagnostics.

use std::fmt;
use std::time::Duration;

/// What one collection cycle saw and did.
///
/// Informational only; nothing in the collector reads these back.
///
/// 一次回收周期的观察与结果。仅供参考。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectStats {
    /// Root set size when marking started.
    pub roots: usize,
    /// Pinned entries when marking started.
    pub pinned: usize,
    /// Live objects before the cycle.
    pub heap_before: usize,
    /// Objects newly marked during this cycle's mark phase.
    pub marked: usize,
    /// Objects that survived the sweep.
    pub live: usize,
    /// Objects destroyed by the sweep.
    pub freed: usize,
    /// Wall-clock duration of the whole cycle.
    pub elapsed: Duration,
}

impl fmt::Display for CollectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Roots: {}", self.roots)?;
        writeln!(f, "Pinned: {}", self.pinned)?;
        writeln!(f, "GC: {} objects in heap", self.heap_before)?;
        writeln!(f, "GC: {} objects live after sweep", self.live)?;
        writeln!(f, "GC: {} objects dead after sweep", self.freed)?;
        write!(f, "GC: {} microseconds", self.elapsed.as_micros())
    }
}

/// Totals accumulated over every cycle a collector has run.
///
/// 收集器运行过的所有周期的累计统计。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of completed cycles.
    pub collections: u64,
    /// Objects destroyed by sweeps, across all cycles.
    pub total_freed: u64,
    /// Time spent inside `collect`, across all cycles.
    pub total_pause: Duration,
    /// The most recent cycle, if any.
    pub last: Option<CollectStats>,
}

impl HeapStats {
    pub(crate) fn record(&mut self, cycle: CollectStats) {
        self.collections += 1;
        self.total_freed += cycle.freed as u64;
        self.total_pause += cycle.elapsed;
        self.last = Some(cycle);
    }
}
