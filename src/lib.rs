//! # stw-gc
//!
//! A non-moving, stop-the-world mark-and-sweep collector.
//!
//! Client code allocates objects through a [`Collector`], declares which of
//! them are *roots*, optionally *pins* objects to protect them across calls
//! the collector cannot see into, and periodically runs
//! [`Collector::collect`], which frees everything unreachable.
//!
//! ## Design
//!
//! - **Caller-owned heap**: every collector is an independent value; there is
//!   no global instance.
//! - **Slot arena**: objects live in a `Vec` of slots addressed by [`Gc`]
//!   handles (index + generation). Sweep returns slots to a free list; stale
//!   handles are detected instead of dangling.
//! - **Trace protocol**: the collector never looks inside objects. Each type
//!   reports its references through [`Trace::trace`]. [`Object`] is a ready
//!   made closed set of shapes.
//! - **Roots and pins**: roots are a set under explicit client control; pins
//!   are reference counted and an unmatched [`Collector::unpin`] panics.
//! - **Stop-the-world**: all mutation takes `&mut Collector`; multi-threaded
//!   embeddings serialize through [`SharedCollector`].
//!
//! ## Example
//! ```
//! use stw_gc::{Collector, Object};
//!
//! let mut heap: Collector = Collector::new();
//!
//! let a = heap.alloc(Object::Leaf);
//! let b = heap.alloc(Object::node([a]));
//! heap.add_root(b);
//!
//! let c = heap.alloc(Object::bytes(64));
//! heap.pin(c);
//!
//! heap.alloc(Object::Leaf); // unreachable
//!
//! let stats = heap.collect(true);
//! assert_eq!(stats.freed, 1);
//! assert_eq!(heap.live(), 3);
//!
//! heap.remove_root(b);
//! heap.unpin(c);
//! heap.collect(false);
//! assert_eq!(heap.live(), 0);
//! ```

mod collector;
mod domain;
mod error;
mod object;
mod pin;
mod ptr;
mod state;
mod stats;
mod sync;

pub use collector::Collector;
pub use domain::{CollectorBuilder, SharedCollector};
pub use error::{GcError, Result};
pub use object::{Object, Trace, Tracer};
pub use pin::Pinned;
pub use ptr::Gc;
pub use stats::{CollectStats, HeapStats};

#[cfg(test)]
mod tests;
