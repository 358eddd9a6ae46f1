use crate::collector::Collector;
use crate::error::{GcError, Result};
use crate::object::Trace;
use crate::ptr::Gc;
use rustc_hash::FxHashMap;
use std::num::NonZeroUsize;

/// Reference-counted pins.
///
/// An entry exists exactly while its count is positive; the last `unpin`
/// removes it.
///
/// 引用计数的钉住表。
/// 仅当计数为正时条目存在；最后一次 `unpin` 会移除它。
#[derive(Debug, Default)]
pub(crate) struct PinTable {
    counts: FxHashMap<Gc, NonZeroUsize>,
}

impl PinTable {
    /// Increment the pin count of `gc`, returning the new count.
    pub(crate) fn pin(&mut self, gc: Gc) -> usize {
        let count = self
            .counts
            .entry(gc)
            .and_modify(|count| *count = count.saturating_add(1))
            .or_insert(NonZeroUsize::MIN);
        count.get()
    }

    /// Decrement the pin count of `gc`, returning what remains.
    pub(crate) fn unpin(&mut self, gc: Gc) -> Result<usize> {
        let Some(count) = self.counts.get_mut(&gc) else {
            return Err(GcError::NotPinned(gc));
        };

        match NonZeroUsize::new(count.get() - 1) {
            Some(remaining) => {
                *count = remaining;
                Ok(remaining.get())
            }
            None => {
                self.counts.remove(&gc);
                Ok(0)
            }
        }
    }

    #[inline]
    pub(crate) fn count(&self, gc: Gc) -> usize {
        self.counts.get(&gc).map_or(0, |count| count.get())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub(crate) fn handles(&self) -> impl Iterator<Item = Gc> + '_ {
        self.counts.keys().copied()
    }
}

/// A scope that keeps one object pinned.
///
/// Created by [`Collector::pin_scope`]. While it exists the object survives
/// any collection, including ones run through [`Pinned::collector_mut`].
/// Dropping the scope performs the matching `unpin`.
///
/// **Contract**: do not `unpin` the handle yourself through
/// `collector_mut()`; the scope owns exactly one pin and releasing it twice
/// is a mismatched unpin.
///
/// 保持一个对象被钉住的作用域。
///
/// 由 [`Collector::pin_scope`] 创建。只要它存在，该对象就能在任何回收中存活，
/// 包括通过 [`Pinned::collector_mut`] 运行的回收。
/// drop 该作用域时会执行对应的 `unpin`。
#[must_use]
pub struct Pinned<'a, T: Trace> {
    collector: &'a mut Collector<T>,
    gc: Gc,
}

impl<'a, T: Trace> Pinned<'a, T> {
    pub(crate) fn new(collector: &'a mut Collector<T>, gc: Gc) -> Self {
        collector.pin(gc);
        Self { collector, gc }
    }

    /// The pinned handle.
    #[inline]
    pub fn handle(&self) -> Gc {
        self.gc
    }

    /// The pinned object, if the handle is live.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.collector.get(self.gc)
    }

    /// Borrow the collector immutably.
    #[inline]
    pub fn collector(&self) -> &Collector<T> {
        &*self.collector
    }

    /// Borrow the collector mutably, e.g. to allocate or collect while the
    /// object stays protected.
    #[inline]
    pub fn collector_mut(&mut self) -> &mut Collector<T> {
        &mut *self.collector
    }
}

impl<T: Trace> Drop for Pinned<'_, T> {
    fn drop(&mut self) {
        self.collector.unpin(self.gc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_counts_up_and_down() {
        let gc = Gc::new(0, 0);
        let mut table = PinTable::default();

        assert_eq!(table.pin(gc), 1);
        assert_eq!(table.pin(gc), 2);
        assert_eq!(table.len(), 1);

        assert_eq!(table.unpin(gc), Ok(1));
        assert_eq!(table.count(gc), 1);
        assert_eq!(table.unpin(gc), Ok(0));
        assert_eq!(table.count(gc), 0);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_unpin_without_pin_is_reported() {
        let gc = Gc::new(3, 1);
        let mut table = PinTable::default();
        assert_eq!(table.unpin(gc), Err(GcError::NotPinned(gc)));
    }
}
