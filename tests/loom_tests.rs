//! Loom-based concurrency tests
//!
//! These tests use the `loom` library to exhaustively check all possible
//! thread interleavings of embedders that share a collector through
//! `SharedCollector`, and detect data races and deadlocks around the lock.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`

#![cfg(feature = "loom")]

use loom::model::Builder;
use loom::thread;
use stw_gc::{Collector, Object};

/// Test: A mutator and a collector thread never observe a half-built object
#[test]
fn loom_alloc_and_root_is_atomic_under_lock() {
    loom::model(|| {
        let shared = Collector::<Object>::new().into_shared();

        let mutator = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut heap = shared.lock();
                let child = heap.alloc(Object::Leaf);
                let parent = heap.alloc(Object::node([child]));
                heap.add_root(parent);
            })
        };

        // Either runs before the mutator (empty heap) or after (both objects rooted)
        let stats = shared.collect(false);
        assert_eq!(stats.freed, 0);

        mutator.join().unwrap();

        shared.collect(false);
        assert_eq!(shared.live(), 2);
    });
}

/// Test: Pin held across an unlocked window protects the object from a concurrent cycle
#[test]
fn loom_pin_protects_across_threads() {
    loom::model(|| {
        let shared = Collector::<Object>::new().into_shared();
        let gc = {
            let mut heap = shared.lock();
            let gc = heap.alloc(Object::bytes(8));
            heap.pin(gc);
            gc
        };

        let collector = {
            let shared = shared.clone();
            thread::spawn(move || {
                shared.collect(false);
            })
        };

        // The object stays live while the pin is outstanding
        assert!(shared.lock().contains(gc));

        collector.join().unwrap();
        assert!(shared.lock().contains(gc));

        shared.lock().unpin(gc);
        shared.collect(false);
        assert_eq!(shared.live(), 0);
    });
}

/// Test: Two mutators rooting objects concurrently
#[test]
fn loom_two_mutators() {
    // 2 mutators + main collector = large state space
    let mut builder = Builder::new();
    builder.preemption_bound = Some(3);
    builder.check(|| {
        let shared = Collector::<Object>::new().into_shared();

        let mut mutators = vec![];
        for _ in 0..2 {
            let shared = shared.clone();
            mutators.push(thread::spawn(move || {
                let mut heap = shared.lock();
                let gc = heap.alloc(Object::Leaf);
                heap.add_root(gc);
                heap.alloc(Object::Leaf);
            }));
        }

        shared.collect(false);

        for mutator in mutators {
            mutator.join().unwrap();
        }

        let stats = shared.collect(false);
        assert_eq!(stats.live, 2);
        assert_eq!(shared.lock().root_count(), 2);
    });
}
