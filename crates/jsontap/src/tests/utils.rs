//! Shared helpers for the test tree.

use alloc::{
    format,
    rc::Rc,
    string::String,
    vec::Vec,
};
use core::cell::RefCell;

use crate::{Event, LazyContext, Parser, ParserObserver, RawValue};

/// Subscribes a recording handler for `expr`, returning the shared event
/// log.
pub fn record(parser: &mut Parser, expr: &str) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    parser.on(expr, move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Observer recording every emitted event, regardless of subscriptions.
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<Event>>>,
}

impl ParserObserver for RecordingObserver {
    fn on_event(&mut self, event: &Event, _context: LazyContext<'_>) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Installs a recording observer, returning the shared event log.
pub fn observe(parser: &mut Parser) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    parser.set_observer(RecordingObserver {
        events: Rc::clone(&events),
    });
    events
}

/// Splits `payload` into at most `parts` chunks on char boundaries.
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<String> {
    let chars: Vec<char> = payload.chars().collect();
    let size = chars.len().div_ceil(parts.max(1)).max(1);
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// One-line rendering of an event for sequence assertions and snapshots.
pub fn render_event(event: &Event) -> String {
    let mut out = format!("{} {}", event.kind, event.path());
    if let Some(value) = &event.value {
        out.push_str(&format!(" {}", value.kind));
        match &value.value {
            RawValue::None => {}
            RawValue::Bool(b) => out.push_str(&format!(" {b}")),
            RawValue::Text(text) => out.push_str(&format!(" {text:?}")),
        }
        if value.append {
            out.push_str(" append");
        }
        if value.complete {
            out.push_str(" complete");
        }
        if value.aborted {
            out.push_str(" aborted");
        }
    }
    out
}

/// Renders a whole event log, one event per line.
pub fn render_events(events: &[Event]) -> String {
    let lines: Vec<String> = events.iter().map(render_event).collect();
    lines.join("\n")
}
