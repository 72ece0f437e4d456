use alloc::vec::Vec;

use crate::{
    tests::utils::{observe, record},
    EventKind, ParseError, Parser, ValueKind,
};

#[test]
fn truncated_string_aborts() {
    let mut parser = Parser::new();
    let text = record(&mut parser, "$.text");
    let log = observe(&mut parser);

    parser.feed_str(r#"{"text":"hel"#).unwrap();
    parser.close(false).unwrap();

    let events = text.borrow();
    // The feed boundary delivered the partial chunk, the close aborted the
    // in-flight value.
    let last = events.last().unwrap();
    assert_eq!(last.kind, EventKind::FieldValue);
    let value = last.value.as_ref().unwrap();
    assert!(value.aborted);
    assert!(!value.complete);
    assert_eq!(value.kind, ValueKind::String);
    assert_eq!(value.as_str(), "hel");

    assert_eq!(log.borrow().last().unwrap().kind, EventKind::StreamAbort);
}

#[test]
fn feed_boundary_flushes_one_append_per_call() {
    let mut parser = Parser::new();
    let s = record(&mut parser, "$.s");
    parser.feed_str(r#"{"s":"he"#).unwrap();
    parser.feed_str("llo\"}").unwrap();
    parser.close(true).unwrap();

    let events = s.borrow();
    let rendered: Vec<(bool, bool, alloc::string::String)> = events
        .iter()
        .filter_map(|event| {
            let value = event.value.as_ref()?;
            Some((value.append, value.complete, value.as_str().into()))
        })
        .collect();
    assert_eq!(
        rendered,
        [
            (true, false, "he".into()),
            (true, false, "llo".into()),
            (false, true, "hello".into()),
        ]
    );
}

#[test]
fn truncated_number_aborts() {
    let mut parser = Parser::new();
    let n = record(&mut parser, "$.n");
    parser.feed_str(r#"{"n": 12"#).unwrap();
    parser.close(false).unwrap();

    let events = n.borrow();
    assert_eq!(events.len(), 1);
    let value = events[0].value.as_ref().unwrap();
    assert_eq!(value.kind, ValueKind::Number);
    assert!(value.aborted);
    assert_eq!(value.as_str(), "12");
}

#[test]
fn truncation_inside_an_escape_aborts_with_the_prefix() {
    let mut parser = Parser::new();
    let s = record(&mut parser, "$.s");
    parser.feed_str("{\"s\":\"x\\").unwrap();
    parser.close(false).unwrap();

    let events = s.borrow();
    let last = events.last().unwrap();
    let value = last.value.as_ref().unwrap();
    assert!(value.aborted);
    assert_eq!(value.as_str(), "x");
}

#[test]
fn normal_close_reports_unclosed_values() {
    let mut parser = Parser::new();
    parser.feed_str(r#"{"s":"ab"#).unwrap();
    assert_eq!(parser.close(true), Err(ParseError::UnclosedString));

    let mut parser = Parser::new();
    parser.feed_str(r#"{"n":17"#).unwrap();
    assert_eq!(parser.close(true), Err(ParseError::UnclosedNumber));

    // An abortive close never complains about truncation.
    let mut parser = Parser::new();
    parser.feed_str(r#"{"s":"ab"#).unwrap();
    assert_eq!(parser.close(false), Ok(()));
}

#[test]
fn truncated_key_emits_no_value() {
    let mut parser = Parser::new();
    let log = observe(&mut parser);
    parser.feed_str(r#"{"stat"#).unwrap();
    parser.close(false).unwrap();

    let kinds: Vec<EventKind> = log.borrow().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        [
            EventKind::ObjectStart,
            EventKind::ObjectEnd,
            EventKind::StreamAbort,
        ]
    );
}

#[test]
fn unclosed_containers_synthesize_end_events() {
    let mut parser = Parser::new();
    let log = observe(&mut parser);
    parser.feed_str(r#"{"a":[{"b":"#).unwrap();
    parser.close(false).unwrap();

    let rendered = crate::tests::utils::render_events(&log.borrow());
    assert_eq!(
        rendered,
        "ObjectStart $\n\
         ArrayStart $.a\n\
         ObjectStart $.a[0]\n\
         ObjectEnd $.a[0]\n\
         ArrayEnd $.a\n\
         ObjectEnd $\n\
         StreamAbort $"
    );
}

#[test]
fn close_is_idempotent() {
    let mut parser = Parser::new();
    let log = observe(&mut parser);
    parser.feed_str(r#"{"a":1}"#).unwrap();
    parser.close(false).unwrap();
    let after_first = log.borrow().len();
    parser.close(false).unwrap();
    parser.close(true).unwrap();
    assert_eq!(log.borrow().len(), after_first);
}

#[test]
fn feed_after_close_is_an_error() {
    let mut parser = Parser::new();
    parser.feed_str("{}").unwrap();
    parser.close(true).unwrap();
    assert_eq!(parser.feed_str("{}"), Err(ParseError::InvalidState));
}

#[test]
fn errors_are_sticky() {
    let mut parser = Parser::new();
    assert_eq!(parser.feed_str(","), Err(ParseError::UnexpectedToken));
    assert_eq!(parser.err(), Some(&ParseError::UnexpectedToken));
    // Subsequent feeds short-circuit with the same error.
    assert_eq!(parser.feed_str("{}"), Err(ParseError::UnexpectedToken));
}

#[test]
fn comma_after_complete_document_is_an_error() {
    let mut parser = Parser::new();
    parser.feed_str(r#"{"a": 1}"#).unwrap();
    assert_eq!(parser.feed_str(","), Err(ParseError::UnexpectedToken));
}

#[test]
fn mismatched_close_tokens() {
    let mut parser = Parser::new();
    assert_eq!(
        parser.feed_str(r#"{"a":1]"#),
        Err(ParseError::MismatchedBracket)
    );

    let mut parser = Parser::new();
    assert_eq!(parser.feed_str("[1}"), Err(ParseError::MismatchedBrace));

    let mut parser = Parser::new();
    assert_eq!(parser.feed_str("}"), Err(ParseError::MismatchedBrace));

    let mut parser = Parser::new();
    assert_eq!(parser.feed_str("]"), Err(ParseError::MismatchedBracket));
}

#[test]
fn close_after_error_still_aborts_cleanly() {
    let mut parser = Parser::new();
    let log = observe(&mut parser);
    assert!(parser.feed_str(r#"{"a":1]"#).is_err());
    parser.close(false).unwrap();

    let events = log.borrow();
    assert_eq!(events.last().unwrap().kind, EventKind::StreamAbort);
    // The open object still received its synthesized end.
    assert!(events.iter().any(|e| e.kind == EventKind::ObjectEnd));
}

#[test]
fn events_before_an_error_remain_valid() {
    let mut parser = Parser::new();
    let a = record(&mut parser, "$.a");
    assert!(parser.feed_str(r#"{"a":1]"#).is_err());

    let events = a.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value.as_ref().unwrap().as_i64(), 1);
}
