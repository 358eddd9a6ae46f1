/// 日志测试模块
/// 测试回收周期摘要的 tracing 事件及其级别
use crate::{Collector, Object};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One event seen by [`Capture`]: level, target and fields rendered with `Debug`.
#[derive(Debug, Clone)]
struct Captured {
    level: Level,
    target: String,
    fields: BTreeMap<String, String>,
}

impl Captured {
    fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Layer that records every event into a shared buffer.
#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl Capture {
    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
        });
    }
}

/// Run `f` with a capturing subscriber installed for the current thread.
fn capture(f: impl FnOnce()) -> Vec<Captured> {
    let layer = Capture::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, f);
    layer.events()
}

/// Two live objects (root and its child) and one garbage object.
fn small_heap() -> Collector {
    let mut heap: Collector = Collector::new();
    let child = heap.alloc(Object::Leaf);
    let root = heap.alloc(Object::node([child]));
    heap.alloc(Object::bytes(4));
    heap.add_root(root);
    heap
}

/// 测试1: verbose 回收在 INFO 级别输出周期摘要
#[test]
fn test_verbose_collect_logs_summary_at_info() {
    let mut heap = small_heap();

    let events = capture(|| {
        heap.collect(true);
    });

    let summary = events
        .iter()
        .find(|e| e.message() == Some("GC cycle complete"))
        .expect("cycle summary event");
    assert_eq!(summary.level, Level::INFO);
    assert_eq!(summary.target, "stw_gc::gc");
    assert_eq!(summary.fields.get("live").map(String::as_str), Some("2"));
    assert_eq!(summary.fields.get("dead").map(String::as_str), Some("1"));
    assert_eq!(summary.fields.get("collection").map(String::as_str), Some("1"));
    assert!(summary.fields.contains_key("micros"));

    let mark = events
        .iter()
        .find(|e| e.message() == Some("mark phase complete"))
        .expect("mark phase event");
    assert_eq!(mark.level, Level::INFO);
    assert_eq!(mark.fields.get("roots").map(String::as_str), Some("1"));
    assert_eq!(mark.fields.get("objects").map(String::as_str), Some("3"));
}

/// 测试2: 非 verbose 回收只在 DEBUG 级别输出
#[test]
fn test_quiet_collect_logs_at_debug_only() {
    let mut heap = small_heap();

    let events = capture(|| {
        heap.collect(false);
    });

    let summary = events
        .iter()
        .find(|e| e.message() == Some("GC cycle complete"))
        .expect("cycle summary event");
    assert_eq!(summary.level, Level::DEBUG);
    assert_eq!(summary.fields.get("dead").map(String::as_str), Some("1"));

    assert!(
        events
            .iter()
            .filter(|e| e.target == "stw_gc::gc")
            .all(|e| e.level == Level::DEBUG || e.level == Level::TRACE),
        "unexpected event above DEBUG: {events:?}"
    );
}

/// 测试3: 钉住和解除钉住在 TRACE 级别记录
#[test]
fn test_pin_events_are_trace_level() {
    let mut heap: Collector = Collector::new();
    let gc = heap.alloc(Object::Leaf);

    let events = capture(|| {
        heap.pin(gc);
        heap.unpin(gc);
    });

    let pin_events: Vec<_> = events.iter().filter(|e| e.target == "stw_gc::gc").collect();
    assert_eq!(pin_events.len(), 2);
    assert!(pin_events.iter().all(|e| e.level == Level::TRACE));
}
