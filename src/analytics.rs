//! Analytics Hook
//!
//! Events go to an optional page-level tracker. When the tracker is missing
//! the event is dropped without complaint.

use std::rc::Rc;

use serde_json::{json, Value};

pub const TASK_MOVED: &str = "task-moved";

/// Receives tracking events
pub trait EventSink {
    fn track(&self, name: &str, props: Value);
}

/// Sink that drops everything, used when analytics are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn track(&self, _name: &str, _props: Value) {}
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn track(&self, name: &str, props: Value) {
        (**self).track(name, props)
    }
}

impl<S: EventSink + ?Sized> EventSink for Rc<S> {
    fn track(&self, name: &str, props: Value) {
        (**self).track(name, props)
    }
}

pub fn task_moved_props(column_id: &str) -> Value {
    json!({ "column": column_id })
}
