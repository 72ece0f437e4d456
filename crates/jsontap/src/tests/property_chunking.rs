use alloc::{
    collections::BTreeMap,
    rc::Rc,
    string::String,
    vec::Vec,
};
use core::cell::RefCell;

use quickcheck::QuickCheck;

use crate::{
    tests::utils::{observe, render_event},
    Event, EventKind, Parser, ValueKind,
};

/// Documents exercising strings, numbers, literals, nesting, and escapes.
const DOCS: &[&str] = &[
    r#"{"status":"running","progress":42}"#,
    r#"{"items":[{"id":1,"name":"foo"},{"id":2,"name":"bar"}]}"#,
    r#"[{"a":1},{"a":2},[3,4],"tail"]"#,
    r#"{"a":{"b":{"c":[true,false,null,1.5e-3,"x y"]}}}"#,
    "{\"text\":\"he\\\"llo \\n world\",\"n\":-12.5}",
];

fn iterations() -> u64 {
    if cfg!(miri) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

fn run_to_events(doc: &str, splits: &[usize]) -> Vec<Event> {
    let mut parser = Parser::new();
    let log = observe(&mut parser);

    let chars: Vec<char> = doc.chars().collect();
    let mut idx = 0;
    for &split in splits {
        if idx >= chars.len() {
            break;
        }
        let size = 1 + split % (chars.len() - idx);
        let chunk: String = chars[idx..idx + size].iter().collect();
        parser.feed_str(&chunk).unwrap();
        idx += size;
    }
    if idx < chars.len() {
        let rest: String = chars[idx..].iter().collect();
        parser.feed_str(&rest).unwrap();
    }
    parser.close(true).unwrap();

    let events = log.borrow().clone();
    events
}

/// Structural events (everything but string appends), rendered.
fn structure(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter(|event| {
            event
                .value
                .as_ref()
                .map_or(true, |value| !value.append)
        })
        .map(render_event)
        .collect()
}

/// Map of path to completed value text, with appended chunks concatenated
/// separately for comparison.
fn final_strings(events: &[Event]) -> BTreeMap<String, (String, String)> {
    let mut out: BTreeMap<String, (String, String)> = BTreeMap::new();
    for event in events {
        let Some(value) = &event.value else { continue };
        if value.kind != ValueKind::String {
            continue;
        }
        let entry = out.entry(String::from(event.path())).or_default();
        if value.append {
            entry.0.push_str(value.as_str());
        } else if value.complete || value.aborted {
            entry.1 = String::from(value.as_str());
        }
    }
    out
}

/// Feeding a document in arbitrary chunk sizes, including splits mid-string
/// and mid-number, must produce the same structural event sequence as a
/// single feed, and appended chunks must concatenate to the final value.
#[test]
fn chunking_is_transparent() {
    fn prop(doc_index: usize, splits: Vec<usize>) -> bool {
        let doc = DOCS[doc_index % DOCS.len()];
        let whole = run_to_events(doc, &[]);
        let chunked = run_to_events(doc, &splits);

        if structure(&whole) != structure(&chunked) {
            return false;
        }

        // Every string that streamed in chunks reassembles to its final
        // value.
        for (appended, fin) in final_strings(&chunked).values() {
            if !appended.is_empty() && appended != fin {
                return false;
            }
        }
        final_strings(&whole)
            .iter()
            .map(|(path, (_, fin))| (path.clone(), fin.clone()))
            .collect::<Vec<_>>()
            == final_strings(&chunked)
                .iter()
                .map(|(path, (_, fin))| (path.clone(), fin.clone()))
                .collect::<Vec<_>>()
    }

    QuickCheck::new()
        .tests(iterations())
        .quickcheck(prop as fn(usize, Vec<usize>) -> bool);
}

/// Arbitrary garbage never panics, never emits more than one terminal
/// event, and never produces a value that is both complete and aborted.
#[test]
fn garbage_is_survivable() {
    fn prop(bytes: Vec<u8>, normal: bool) -> bool {
        let mut parser = Parser::new();
        let log = observe(&mut parser);

        let _ = parser.feed(&bytes);
        let _ = parser.close(normal);
        let _ = parser.close(!normal);

        let events = log.borrow();
        let terminals = events
            .iter()
            .filter(|event| {
                matches!(event.kind, EventKind::StreamEnd | EventKind::StreamAbort)
            })
            .count();
        let flags_ok = events.iter().all(|event| {
            event
                .value
                .as_ref()
                .map_or(true, |value| !(value.complete && value.aborted))
        });

        terminals == 1 && flags_ok
    }

    QuickCheck::new()
        .tests(iterations())
        .quickcheck(prop as fn(Vec<u8>, bool) -> bool);
}

/// Container starts and ends stay balanced for every split, even when the
/// input is cut off mid-structure.
#[test]
fn containers_balance_under_truncation() {
    fn prop(doc_index: usize, cut: usize, normal: bool) -> bool {
        let doc = DOCS[doc_index % DOCS.len()];
        let chars: Vec<char> = doc.chars().collect();
        let cut = cut % (chars.len() + 1);
        let prefix: String = chars[..cut].iter().collect();

        let mut parser = Parser::new();
        let log = observe(&mut parser);
        let _ = parser.feed_str(&prefix);
        let _ = parser.close(normal);

        let events = log.borrow();
        let count = |kind: EventKind| events.iter().filter(|e| e.kind == kind).count();
        count(EventKind::ObjectStart) == count(EventKind::ObjectEnd)
            && count(EventKind::ArrayStart) == count(EventKind::ArrayEnd)
    }

    QuickCheck::new()
        .tests(iterations())
        .quickcheck(prop as fn(usize, usize, bool) -> bool);
}

/// Rc sanity: recording handlers observe the same dispatch the observer
/// does for matching paths.
#[test]
fn handlers_and_observer_agree() {
    let shared = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shared);

    let mut parser = Parser::new();
    let log = observe(&mut parser);
    parser.on("$.items[*].name", move |event| {
        sink.borrow_mut().push(render_event(event));
    });
    parser
        .feed_str(r#"{"items":[{"id":1,"name":"foo"},{"id":2,"name":"bar"}]}"#)
        .unwrap();
    parser.close(true).unwrap();

    let from_observer: Vec<String> = log
        .borrow()
        .iter()
        .filter(|event| {
            event.path().starts_with("$.items[") && event.path().ends_with("].name")
        })
        .map(render_event)
        .collect();
    assert_eq!(&*shared.borrow(), &from_observer);
}
