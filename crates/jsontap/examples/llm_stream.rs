//! Reacting to a streamed LLM tool-call response before it completes.
//!
//! The assistant has been prompted to produce a JSON object describing a
//! generated code snippet. A `moderation` object arrives first so that the
//! caller can abort early on a `"block"` decision; the `code` string is
//! rendered chunk-by-chunk as it streams in.
//!
//! The payload is fed in small, irregular chunks to mirror how chat
//! completion APIs deliver partial tokens.
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsontap --example llm_stream
//! ```

use std::cell::Cell;
use std::io::Write as _;
use std::rc::Rc;

use jsontap::Parser;

fn main() {
    // A toy assistant response, streamed in irregular chunks. In real life
    // this would come from the network.
    let simulated_stream = [
        r#"{"moderation":{"decision":"al"#,
        r#"lo"#,
        r#"w","reason":null},"#,
        r#""filename":"hello.rs","#,
        r#""code":"fn main() {\n    println!(\"#,
        r#""hello from a stream\");\n}"#,
        r#"\n"}"#,
    ];

    let blocked = Rc::new(Cell::new(false));

    let mut parser = Parser::new();

    let flag = Rc::clone(&blocked);
    parser.on("$.moderation.decision", move |event| {
        let Some(value) = &event.value else { return };
        // Appends stream in as they arrive; a prefix of "block" is enough
        // to pull the plug before the payload finishes.
        if value.as_str().starts_with('b') {
            flag.set(true);
        }
        if value.complete {
            println!("moderation decision: {}", value.as_str());
        }
    });

    parser.on("$.filename", |event| {
        let Some(value) = &event.value else { return };
        if value.complete {
            println!("filename: {}", value.as_str());
        }
    });

    parser.on("$.code", |event| {
        let Some(value) = &event.value else { return };
        // Print only the newly arrived fragment, not the whole prefix.
        if value.append {
            print!("{}", value.as_str());
            let _ = std::io::stdout().flush();
        }
        if value.complete {
            println!();
        }
    });

    for chunk in simulated_stream {
        parser.feed_str(chunk).expect("parse error");
        if blocked.get() {
            eprintln!("moderation blocked the content, aborting");
            parser.close(false).expect("close");
            return;
        }
    }

    match parser.close(true) {
        Ok(()) => println!("stream complete"),
        Err(err) => eprintln!("stream ended early: {err}"),
    }
}
