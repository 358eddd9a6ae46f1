//! The object protocol: how the collector discovers references.

use crate::ptr::Gc;

/// Implemented by every type stored in a [`Collector`](crate::Collector).
///
/// `trace` is the "mark children" hook: it must call [`Tracer::mark`] on
/// every handle this object references. Objects without references keep the
/// default, which does nothing.
///
/// The hook only sees `&self` and the tracer, so it cannot touch the
/// collector's root or pin tables or start another cycle while marking is in
/// progress.
///
/// # Example
/// ```
/// use stw_gc::{Collector, Gc, Trace, Tracer};
///
/// struct Pair {
///     left: Option<Gc>,
///     right: Option<Gc>,
/// }
///
/// impl Trace for Pair {
///     fn trace(&self, tracer: &mut Tracer) {
///         self.left.trace(tracer);
///         self.right.trace(tracer);
///     }
/// }
///
/// let mut heap = Collector::<Pair>::new();
/// let leaf = heap.alloc(Pair { left: None, right: None });
/// let pair = heap.alloc(Pair { left: Some(leaf), right: None });
/// heap.add_root(pair);
///
/// heap.collect(false);
/// assert_eq!(heap.live(), 2);
/// ```
///
/// 由存储在 [`Collector`](crate::Collector) 中的每种类型实现。
///
/// `trace` 是"标记子对象"的钩子：它必须对该对象引用的每个句柄调用
/// [`Tracer::mark`]。没有引用的对象使用默认实现，什么也不做。
pub trait Trace {
    /// Report every handle this object references.
    /// 报告该对象引用的每个句柄。
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// Collects handles reported by [`Trace::trace`] during marking.
///
/// 在标记期间收集 [`Trace::trace`] 报告的句柄。
#[derive(Debug, Default)]
pub struct Tracer {
    worklist: Vec<Gc>,
}

impl Tracer {
    #[inline]
    pub(crate) fn with_worklist(worklist: Vec<Gc>) -> Self {
        debug_assert!(worklist.is_empty());
        Self { worklist }
    }

    /// Report a reference to `gc`.
    ///
    /// Marking an already marked or stale handle is harmless; the collector
    /// filters those out when it pops the worklist.
    ///
    /// 报告对 `gc` 的引用。
    /// 标记已标记或已过期的句柄是无害的；收集器在弹出工作列表时会过滤它们。
    #[inline]
    pub fn mark(&mut self, gc: Gc) {
        self.worklist.push(gc);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Gc> {
        self.worklist.pop()
    }

    #[inline]
    pub(crate) fn into_worklist(self) -> Vec<Gc> {
        self.worklist
    }
}

impl Trace for () {}

impl Trace for Gc {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        tracer.mark(*self);
    }
}

impl<T: Trace> Trace for Option<T> {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        if let Some(inner) = self {
            inner.trace(tracer);
        }
    }
}

impl<T: Trace> Trace for [T] {
    fn trace(&self, tracer: &mut Tracer) {
        for item in self {
            item.trace(tracer);
        }
    }
}

impl<T: Trace> Trace for Vec<T> {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        self.as_slice().trace(tracer);
    }
}

impl<T: Trace + ?Sized> Trace for Box<T> {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        (**self).trace(tracer);
    }
}

/// The built-in closed set of object shapes.
///
/// Use it when the embedding does not need its own object type; each variant
/// knows its own reference layout and `trace` dispatches on the tag.
///
/// 内置的封闭对象形态集合。
/// 每个变体知道自己的引用布局，`trace` 按标签分派。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Object {
    /// An object with no payload and no references.
    /// 没有负载也没有引用的对象。
    #[default]
    Leaf,
    /// An owned byte buffer. Never references other objects.
    /// 一个拥有所有权的字节缓冲区。从不引用其他对象。
    Bytes(Box<[u8]>),
    /// A composite holding references to other objects.
    /// 持有其他对象引用的复合对象。
    Node(Vec<Gc>),
}

impl Object {
    /// A zero-filled buffer of `len` bytes.
    pub fn bytes(len: usize) -> Self {
        Object::Bytes(vec![0u8; len].into_boxed_slice())
    }

    /// A composite referencing `children`.
    pub fn node(children: impl IntoIterator<Item = Gc>) -> Self {
        Object::Node(children.into_iter().collect())
    }

    /// Handles referenced by this object, in declaration order.
    pub fn children(&self) -> &[Gc] {
        match self {
            Object::Node(children) => children,
            Object::Leaf | Object::Bytes(_) => &[],
        }
    }
}

impl Trace for Object {
    fn trace(&self, tracer: &mut Tracer) {
        match self {
            Object::Node(children) => children.trace(tracer),
            Object::Leaf | Object::Bytes(_) => {}
        }
    }
}
