use crate::collector::Collector;
use crate::object::Trace;
use crate::state::{DEFAULT_AUTO_COLLECT_THRESHOLD, DEFAULT_CAPACITY};
use crate::stats::CollectStats;
use crate::sync::{Arc, Mutex, MutexGuard};
use std::marker::PhantomData;

/// Builder for configuring a [`Collector`].
///
/// Use this builder to customize collector behavior:
/// - `capacity`: Number of object slots reserved up front
/// - `auto_collect_threshold`: Live object count at which `alloc` runs a cycle
///
/// # Example
/// ```
/// use stw_gc::{Collector, CollectorBuilder, Object};
///
/// let heap: Collector<Object> = CollectorBuilder::new()
///     .capacity(256)
///     .auto_collect_threshold(None)
///     .build();
/// assert!(heap.is_empty());
/// ```
///
/// 用于配置 [`Collector`] 的构建器。
pub struct CollectorBuilder<T> {
    capacity: usize,
    auto_collect_threshold: Option<usize>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Trace> CollectorBuilder<T> {
    /// Create a new builder with default settings.
    /// 创建一个带有默认设置的新构建器。
    #[inline]
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            auto_collect_threshold: DEFAULT_AUTO_COLLECT_THRESHOLD,
            _marker: PhantomData,
        }
    }

    /// Set how many object slots to reserve up front.
    ///
    /// Default: `64`
    ///
    /// 设置预先保留的对象槽位数量。
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the automatic collection threshold.
    ///
    /// When the live object count has reached this threshold, the next
    /// `alloc` runs a (non-verbose) collection before registering its value.
    /// After each cycle the next trigger point is twice the surviving count
    /// (never below the threshold), so a heap that keeps growing collects
    /// a logarithmic number of times.
    /// Only enable this when every object the program still needs is rooted,
    /// pinned, or reachable from one of those at every allocation site.
    /// Pass `None` to disable automatic collection.
    ///
    /// Default: `None`
    ///
    /// 设置自动回收阈值。
    /// 当存活对象数量达到此阈值时，下一次 `alloc` 会在注册其值之前运行一次回收。
    /// 每个周期之后，下一个触发点为存活数量的两倍（不低于阈值）。
    /// 只有当程序仍需要的每个对象在每个分配点都是根、被钉住或从它们可达时才应启用。
    /// 传递 `None` 可禁用自动回收。
    #[inline]
    pub fn auto_collect_threshold(mut self, threshold: impl Into<Option<usize>>) -> Self {
        self.auto_collect_threshold = threshold.into();
        self
    }

    /// Build the [`Collector`] with the configured settings.
    /// 使用配置的设置构建 [`Collector`]。
    #[inline]
    pub fn build(self) -> Collector<T> {
        Collector::from_parts(self.capacity, self.auto_collect_threshold)
    }

    /// Build the collector and place it behind a lock.
    /// 构建收集器并将其放在锁之后。
    #[inline]
    pub fn build_shared(self) -> SharedCollector<T> {
        SharedCollector::new(self.build())
    }
}

impl<T: Trace> Default for CollectorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A collector behind a mutex, for embeddings that touch the heap from more
/// than one thread.
///
/// The collector itself is single-threaded by contract. `SharedCollector`
/// supplies the exclusive-access scope: [`lock`](Self::lock) returns a guard
/// through which allocation, root and pin changes, and collection happen,
/// and no other thread can observe the heap until the guard is dropped.
///
/// `SharedCollector` is `Clone`; clones refer to the same collector.
///
/// **Typical Usage**:
/// ```
/// use stw_gc::{Collector, Object};
/// use std::thread;
///
/// let shared = Collector::<Object>::new().into_shared();
///
/// let worker = {
///     let shared = shared.clone();
///     thread::spawn(move || {
///         let mut heap = shared.lock();
///         let gc = heap.alloc(Object::Leaf);
///         heap.add_root(gc);
///     })
/// };
/// worker.join().unwrap();
///
/// shared.collect(false);
/// assert_eq!(shared.live(), 1);
/// ```
///
/// 放在互斥锁之后的收集器，用于从多个线程访问堆的嵌入场景。
///
/// 收集器本身按约定是单线程的。`SharedCollector` 提供独占访问作用域：
/// [`lock`](Self::lock) 返回一个守卫，分配、根和钉住的修改以及回收都通过它进行，
/// 在守卫被 drop 之前其他线程无法观察堆。
///
/// `SharedCollector` 是 `Clone` 的；克隆体指向同一个收集器。
pub struct SharedCollector<T> {
    inner: Arc<Mutex<Collector<T>>>,
}

impl<T: Trace> SharedCollector<T> {
    /// Wrap `collector` in a new lock.
    #[inline]
    pub fn new(collector: Collector<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collector)),
        }
    }

    /// Acquire exclusive access to the collector.
    ///
    /// 获取对收集器的独占访问。
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Collector<T>> {
        self.inner.lock()
    }

    /// Run one collection cycle under the lock.
    #[inline]
    pub fn collect(&self, verbose: bool) -> CollectStats {
        self.lock().collect(verbose)
    }

    /// Live object count, read under the lock.
    #[inline]
    pub fn live(&self) -> usize {
        self.lock().live()
    }
}

impl<T> Clone for SharedCollector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
