use crate::{Gc, Trace, Tracer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

mod logging_tests;

/// Test object that counts how many times it has been dropped.
/// 记录自身被 drop 次数的测试对象。
#[derive(Debug)]
pub(crate) struct Tracked {
    pub(crate) children: Vec<Gc>,
    drops: Arc<AtomicUsize>,
}

impl Tracked {
    pub(crate) fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            children: Vec::new(),
            drops: Arc::clone(drops),
        }
    }

    pub(crate) fn with_children(drops: &Arc<AtomicUsize>, children: Vec<Gc>) -> Self {
        Self {
            children,
            drops: Arc::clone(drops),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::with_children(&self.drops, self.children.clone())
    }
}

impl Trace for Tracked {
    fn trace(&self, tracer: &mut Tracer) {
        self.children.trace(tracer);
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn drop_counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub(crate) fn drops(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
