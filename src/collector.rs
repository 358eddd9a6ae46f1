use crate::domain::{CollectorBuilder, SharedCollector};
use crate::error::{GcError, Result};
use crate::object::{Trace, Tracer};
use crate::pin::{PinTable, Pinned};
use crate::ptr::Gc;
use crate::state::SlotArena;
use crate::stats::{CollectStats, HeapStats};
use rustc_hash::FxHashSet;
use std::mem;
use std::time::Instant;

/// Target used for every `tracing` event emitted by the collector.
const LOG_TARGET: &str = "stw_gc::gc";

/// A stop-the-world mark-and-sweep collector.
///
/// The collector owns every object allocated through it (the *heap*), the
/// set of *roots*, and a table of reference-counted *pins*. A call to
/// [`collect`](Self::collect) marks everything reachable from roots and
/// pinned objects, then destroys the rest.
///
/// Objects are stored in a non-moving slot arena and addressed by [`Gc`]
/// handles. A freed slot is reused by later allocations under a new
/// generation, so stale handles are detected rather than dereferenced.
///
/// **Thread Safety**: `Collector` has no internal locking. All methods that
/// change the heap, roots, or pins take `&mut self`, which makes the
/// stop-the-world discipline a compile-time property. To share a collector
/// between threads, wrap it in a [`SharedCollector`].
///
/// **Typical Usage**:
/// ```
/// use stw_gc::{Collector, Object};
///
/// let mut heap: Collector = Collector::new();
/// let b = heap.alloc(Object::Leaf);
/// let a = heap.alloc(Object::node([b]));
/// let garbage = heap.alloc(Object::bytes(32));
///
/// heap.add_root(a);
/// let stats = heap.collect(false);
///
/// assert_eq!(stats.freed, 1);
/// assert!(heap.contains(a) && heap.contains(b));
/// assert!(!heap.contains(garbage));
/// ```
///
/// 一个全停顿的标记-清扫收集器。
///
/// 收集器拥有通过它分配的所有对象（*堆*）、*根*集合，以及引用计数的*钉住*表。
/// 调用 [`collect`](Self::collect) 会标记从根和被钉住对象可达的所有对象，然后销毁其余对象。
///
/// 对象存储在不移动的槽位表中，并通过 [`Gc`] 句柄访问。
/// 被释放的槽位会以新的代数被之后的分配复用，因此过期句柄会被检测到而不是被解引用。
///
/// **线程安全性**：`Collector` 没有内部锁。所有修改堆、根或钉住表的方法都接受
/// `&mut self`，这使全停顿约束成为编译期性质。
/// 要在线程间共享收集器，请将其包装在 [`SharedCollector`] 中。
pub struct Collector<T = crate::Object> {
    heap: SlotArena<T>,
    roots: FxHashSet<Gc>,
    pins: PinTable,
    /// Mark worklist, kept between cycles so marking does not allocate.
    /// 标记工作列表，在周期之间保留，使标记不需要分配。
    worklist: Vec<Gc>,
    auto_collect_threshold: Option<usize>,
    /// Live count at which the next automatic cycle runs. Moved up after
    /// every cycle so a heap whose objects are all reachable does not
    /// collect on each allocation.
    /// 下一次自动回收触发时的存活数量。每个周期后都会重新计算，
    /// 使对象全部可达的堆不会在每次分配时都回收。
    next_auto_collect: Option<usize>,
    stats: HeapStats,
}

impl<T: Trace> Collector<T> {
    /// Create a collector with default settings.
    /// 使用默认设置创建收集器。
    #[inline]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring a collector.
    ///
    /// # Example
    /// ```
    /// use stw_gc::Collector;
    ///
    /// let heap: Collector = Collector::builder()
    ///     .capacity(1024)
    ///     .auto_collect_threshold(4096)
    ///     .build();
    /// assert_eq!(heap.live(), 0);
    /// ```
    ///
    /// 创建一个用于配置收集器的构建器。
    #[inline]
    pub fn builder() -> CollectorBuilder<T> {
        CollectorBuilder::new()
    }

    pub(crate) fn from_parts(capacity: usize, auto_collect_threshold: Option<usize>) -> Self {
        Self {
            heap: SlotArena::with_capacity(capacity),
            roots: FxHashSet::default(),
            pins: PinTable::default(),
            worklist: Vec::new(),
            auto_collect_threshold,
            next_auto_collect: auto_collect_threshold,
            stats: HeapStats::default(),
        }
    }

    /// Move this collector behind a lock so it can be shared between threads.
    #[inline]
    pub fn into_shared(self) -> SharedCollector<T> {
        SharedCollector::new(self)
    }

    // --- Object lifecycle ---
    // --- 对象生命周期 ---

    /// Register `value` as a new tracked object and return its handle.
    ///
    /// This is the only way objects enter the heap. The new object starts
    /// unmarked, unrooted and unpinned: unless it is rooted, pinned, or
    /// referenced from one of those before the next [`collect`](Self::collect),
    /// that cycle destroys it.
    ///
    /// **Automatic Collection**: if an automatic threshold is configured
    /// (see [`CollectorBuilder::auto_collect_threshold`]) and the live count
    /// has reached the current trigger point, a cycle runs *before* `value` is
    /// registered, so the new object itself is never collected by this call.
    /// After every cycle the trigger point becomes twice the surviving count,
    /// but never less than the threshold.
    ///
    /// 将 `value` 注册为新的被跟踪对象并返回其句柄。
    ///
    /// 这是对象进入堆的唯一途径。新对象初始时未标记、不是根、未被钉住：
    /// 除非在下一次 [`collect`](Self::collect) 之前它被设为根、被钉住，或被它们引用，
    /// 否则该周期会销毁它。
    ///
    /// **自动回收**：如果配置了自动阈值且存活数量已达到当前触发点，
    /// 会在注册 `value` *之前*运行一次回收，因此新对象本身不会被此调用回收。
    /// 每个周期之后，触发点变为存活数量的两倍，但不低于阈值。
    pub fn alloc(&mut self, value: T) -> Gc {
        if let Some(trigger) = self.next_auto_collect {
            if self.heap.live() >= trigger {
                self.collect(false);
            }
        }

        self.heap.insert(value)
    }

    /// Copy-construct a new tracked object from the one behind `gc`.
    ///
    /// The copy is a distinct object with its own handle; it is unmarked and
    /// neither rooted nor pinned, whatever the state of the original.
    ///
    /// 从 `gc` 指向的对象复制构造一个新的被跟踪对象。
    /// 副本是一个拥有自己句柄的独立对象；无论原对象状态如何，它都未标记、不是根、未被钉住。
    pub fn duplicate(&mut self, gc: Gc) -> Result<Gc>
    where
        T: Clone,
    {
        let value = self.get(gc).cloned().ok_or(GcError::StaleHandle(gc))?;
        Ok(self.alloc(value))
    }

    /// Destroy the object behind `gc` immediately and hand back its value.
    ///
    /// Roots and pins naming `gc` are left in place; they become inert
    /// because the handle is stale from now on. An outstanding pin still has
    /// to be matched by its `unpin`.
    ///
    /// 立即销毁 `gc` 指向的对象并返回其值。
    /// 指向 `gc` 的根和钉住会被保留；由于句柄从此过期，它们不再起作用。
    /// 未完成的钉住仍需由对应的 `unpin` 配对。
    pub fn free(&mut self, gc: Gc) -> Result<T> {
        let index = self.heap.validate(gc).ok_or(GcError::StaleHandle(gc))?;
        tracing::trace!(target: LOG_TARGET, %gc, "object freed explicitly");
        Ok(self.heap.release(index))
    }

    /// Borrow the object behind `gc`, or `None` if the handle is stale.
    #[inline]
    pub fn get(&self, gc: Gc) -> Option<&T> {
        self.heap.get(gc).and_then(|slot| slot.value.as_ref())
    }

    /// Mutably borrow the object behind `gc`, or `None` if the handle is stale.
    #[inline]
    pub fn get_mut(&mut self, gc: Gc) -> Option<&mut T> {
        self.heap.get_mut(gc).and_then(|slot| slot.value.as_mut())
    }

    /// Whether `gc` names a live object.
    #[inline]
    pub fn contains(&self, gc: Gc) -> bool {
        self.heap.validate(gc).is_some()
    }

    /// Number of objects currently in the heap.
    ///
    /// 堆中当前的对象数量。
    #[inline]
    pub fn live(&self) -> usize {
        self.heap.live()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.live() == 0
    }

    /// Iterate over live objects and their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Gc, &T)> + '_ {
        self.heap.iter()
    }

    // --- Marking ---
    // --- 标记 ---

    /// Mark `gc` and everything reachable from it.
    ///
    /// Idempotent: an object that is already marked is not traversed again,
    /// which is what makes cyclic graphs safe. Stale handles are ignored.
    ///
    /// Marks set outside of [`collect`](Self::collect) count as live for the
    /// next cycle only; its sweep clears them like any other mark.
    ///
    /// 标记 `gc` 及从它可达的所有对象。
    ///
    /// 幂等：已标记的对象不会被再次遍历，这使得循环图是安全的。过期句柄会被忽略。
    ///
    /// 在 [`collect`](Self::collect) 之外设置的标记只对下一个周期有效；
    /// 该周期的清扫会像清除其他标记一样清除它们。
    pub fn mark(&mut self, gc: Gc) {
        let mut tracer = Tracer::with_worklist(mem::take(&mut self.worklist));
        tracer.mark(gc);
        self.drain(&mut tracer);
        self.worklist = tracer.into_worklist();
    }

    /// Whether `gc` currently carries a mark. `false` for stale handles.
    #[inline]
    pub fn is_marked(&self, gc: Gc) -> bool {
        self.heap.get(gc).is_some_and(|slot| slot.marked)
    }

    /// Pop handles until the worklist is empty, marking and tracing each
    /// live, unmarked object. Returns how many objects were newly marked.
    fn drain(&mut self, tracer: &mut Tracer) -> usize {
        let mut marked = 0;

        while let Some(gc) = tracer.pop() {
            let Some(slot) = self.heap.get_mut(gc) else {
                continue;
            };
            if slot.marked {
                continue;
            }
            slot.marked = true;
            marked += 1;

            if let Some(value) = slot.value.as_ref() {
                value.trace(tracer);
            }
        }

        marked
    }

    // --- Roots and pins ---
    // --- 根与钉住 ---

    /// Add `gc` to the root set. Returns `false` if it was already a root.
    ///
    /// The handle does not have to be live; a stale root is simply ignored
    /// by marking.
    ///
    /// 将 `gc` 加入根集合。如果它已经是根则返回 `false`。
    #[inline]
    pub fn add_root(&mut self, gc: Gc) -> bool {
        self.roots.insert(gc)
    }

    /// Remove `gc` from the root set. Removing a non-root is a no-op that
    /// returns `false`.
    ///
    /// 将 `gc` 从根集合中移除。移除非根对象是无操作，返回 `false`。
    #[inline]
    pub fn remove_root(&mut self, gc: Gc) -> bool {
        self.roots.remove(&gc)
    }

    #[inline]
    pub fn is_root(&self, gc: Gc) -> bool {
        self.roots.contains(&gc)
    }

    /// Size of the root set.
    #[inline]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Pin `gc` so it survives collections regardless of reachability.
    ///
    /// Pins are reference counted: every `pin` must be matched by one
    /// [`unpin`](Self::unpin). Returns the new pin count.
    ///
    /// 钉住 `gc`，使其无论是否可达都能在回收中存活。
    /// 钉住是引用计数的：每次 `pin` 都必须与一次 [`unpin`](Self::unpin) 配对。返回新的钉住计数。
    pub fn pin(&mut self, gc: Gc) -> usize {
        let count = self.pins.pin(gc);
        tracing::trace!(target: LOG_TARGET, %gc, count, "pinned");
        count
    }

    /// Release one pin on `gc`. Returns the remaining pin count.
    ///
    /// # Panics
    /// Panics if `gc` has no outstanding pin. A mismatched unpin is a bug in
    /// the caller's pin/unpin pairing and is not recoverable; use
    /// [`try_unpin`](Self::try_unpin) to get an error instead.
    ///
    /// 释放 `gc` 上的一个钉住。返回剩余的钉住计数。
    ///
    /// # Panics
    /// 如果 `gc` 没有未完成的钉住则 panic。不匹配的 unpin 是调用者配对逻辑的 bug，不可恢复；
    /// 如需返回错误请使用 [`try_unpin`](Self::try_unpin)。
    pub fn unpin(&mut self, gc: Gc) -> usize {
        match self.try_unpin(gc) {
            Ok(remaining) => remaining,
            Err(err) => panic!(
                "BUG: {err}. Every unpin must match an earlier pin of the same handle."
            ),
        }
    }

    /// Release one pin on `gc`, reporting a mismatched unpin as
    /// [`GcError::NotPinned`] instead of panicking.
    pub fn try_unpin(&mut self, gc: Gc) -> Result<usize> {
        let remaining = self.pins.unpin(gc)?;
        tracing::trace!(target: LOG_TARGET, %gc, remaining, "unpinned");
        Ok(remaining)
    }

    /// Current pin count of `gc` (0 if not pinned).
    #[inline]
    pub fn pin_count(&self, gc: Gc) -> usize {
        self.pins.count(gc)
    }

    /// Number of distinct pinned handles.
    #[inline]
    pub fn pinned_count(&self) -> usize {
        self.pins.len()
    }

    /// Pin `gc` for the lifetime of the returned scope.
    ///
    /// # Example
    /// ```
    /// use stw_gc::{Collector, Object};
    ///
    /// let mut heap: Collector = Collector::new();
    /// let scratch = heap.alloc(Object::bytes(8));
    /// {
    ///     let mut pinned = heap.pin_scope(scratch);
    ///     pinned.collector_mut().collect(false);
    ///     assert!(pinned.collector().contains(scratch));
    /// }
    /// heap.collect(false);
    /// assert!(!heap.contains(scratch));
    /// ```
    #[inline]
    pub fn pin_scope(&mut self, gc: Gc) -> Pinned<'_, T> {
        Pinned::new(self, gc)
    }

    // --- Collection ---
    // --- 回收 ---

    /// Perform one full collection cycle.
    ///
    /// 1. **Mark**: every root, then every pinned handle, is marked
    ///    transitively through [`Trace::trace`]. The reachable set does not
    ///    depend on iteration order.
    /// 2. **Sweep**: the heap is scanned once. Marked objects have their
    ///    mark cleared and stay; unmarked objects are removed and their slots
    ///    go back on the free list. The removed values are dropped after the
    ///    scan completes, in unspecified order.
    ///
    /// `verbose` raises the cycle summary from `DEBUG` to `INFO` level. The
    /// returned [`CollectStats`] carries the same numbers and implements
    /// `Display` for callers that want to print them.
    ///
    /// The cycle always runs to completion.
    ///
    /// 执行一次完整的回收周期。
    ///
    /// 1. **标记**：通过 [`Trace::trace`] 传递地标记每个根以及每个被钉住的句柄。
    ///    可达集合与遍历顺序无关。
    /// 2. **清扫**：扫描堆一次。已标记对象清除标记并保留；未标记对象被移除，
    ///    其槽位回到空闲列表。被移除的值在扫描完成后被 drop，顺序未指定。
    ///
    /// `verbose` 会将周期摘要从 `DEBUG` 级别提升到 `INFO` 级别。
    /// 周期总是运行至完成。
    pub fn collect(&mut self, verbose: bool) -> CollectStats {
        let start = Instant::now();
        let heap_before = self.heap.live();
        let roots = self.roots.len();
        let pinned = self.pins.len();

        let marked = self.mark_phase();

        if verbose {
            tracing::info!(target: LOG_TARGET, roots, pinned, objects = heap_before, "mark phase complete");
        } else {
            tracing::debug!(target: LOG_TARGET, roots, pinned, objects = heap_before, "mark phase complete");
        }

        let (live, freed) = self.sweep_phase();

        let stats = CollectStats {
            roots,
            pinned,
            heap_before,
            marked,
            live,
            freed,
            elapsed: start.elapsed(),
        };
        self.stats.record(stats);
        if let Some(threshold) = self.auto_collect_threshold {
            self.next_auto_collect = Some(threshold.max(live.saturating_mul(2)));
        }

        let micros = stats.elapsed.as_micros() as u64;
        if verbose {
            tracing::info!(
                target: LOG_TARGET,
                collection = self.stats.collections,
                live,
                dead = freed,
                micros,
                "GC cycle complete"
            );
        } else {
            tracing::debug!(
                target: LOG_TARGET,
                collection = self.stats.collections,
                live,
                dead = freed,
                micros,
                "GC cycle complete"
            );
        }

        stats
    }

    /// Mark from roots and pinned objects. Returns the number of objects
    /// marked by this phase.
    fn mark_phase(&mut self) -> usize {
        let mut tracer = Tracer::with_worklist(mem::take(&mut self.worklist));

        for &gc in self.roots.iter() {
            tracer.mark(gc);
        }
        for gc in self.pins.handles() {
            tracer.mark(gc);
        }

        let marked = self.drain(&mut tracer);
        self.worklist = tracer.into_worklist();
        marked
    }

    /// Clear marks on survivors and release every unmarked object.
    /// Returns `(live, freed)`.
    fn sweep_phase(&mut self) -> (usize, usize) {
        let mut dead = Vec::new();
        let mut live = 0;

        for index in 0..self.heap.slots.len() {
            let slot = &mut self.heap.slots[index];
            if slot.value.is_none() {
                continue;
            }
            if slot.marked {
                slot.marked = false;
                live += 1;
            } else {
                dead.push(self.heap.release(index));
            }
        }

        let freed = dead.len();
        // Destroy only after the scan has finished.
        drop(dead);

        debug_assert_eq!(live, self.heap.live());
        (live, freed)
    }

    /// Totals accumulated across every cycle run so far.
    ///
    /// 到目前为止所有周期的累计统计。
    #[inline]
    pub fn stats(&self) -> HeapStats {
        self.stats
    }
}

impl<T: Trace> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Collector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("live", &self.heap.live())
            .field("roots", &self.roots.len())
            .field("pinned", &self.pins.len())
            .field("auto_collect_threshold", &self.auto_collect_threshold)
            .finish_non_exhaustive()
    }
}
