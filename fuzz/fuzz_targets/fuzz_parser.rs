//! Feeds arbitrary bytes in arbitrary splits, then closes, checking the
//! terminal-event invariant: no panic, and exactly one `StreamEnd` or
//! `StreamAbort` per parser lifetime.

#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use jsontap::{EventKind, Parser};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzCase<'a> {
    data: &'a [u8],
    splits: Vec<u8>,
    normal_close: bool,
}

fuzz_target!(|case: FuzzCase<'_>| {
    let terminals = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&terminals);

    let mut parser = Parser::new();
    parser.on("$", move |event| {
        if matches!(event.kind, EventKind::StreamEnd | EventKind::StreamAbort) {
            seen.set(seen.get() + 1);
        }
    });

    let mut rest = case.data;
    for split in case.splits {
        if rest.is_empty() {
            break;
        }
        let take = 1 + usize::from(split) % rest.len();
        let (chunk, tail) = rest.split_at(take);
        let _ = parser.feed(chunk);
        rest = tail;
    }
    let _ = parser.feed(rest);

    let _ = parser.close(case.normal_close);
    // Idempotent: a second close must not emit another terminal event.
    let _ = parser.close(!case.normal_close);

    assert_eq!(terminals.get(), 1);
});
