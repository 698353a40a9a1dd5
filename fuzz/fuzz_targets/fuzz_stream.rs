//! Buffered stream fuzz target.
//!
//! Drives a rule that performs an arbitrary mix of peeks, reads, writes and
//! drops, then checks that the stream terminates with the expected number of
//! tokens in upstream order.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relex::{BufferConfig, BufferedTokenStream, FnRule, IterSource, Lookahead, Span, Token};

/// What the rule does for one invocation.
#[derive(Debug, Clone, Arbitrary)]
struct Step {
    /// Position to peek at (0 is allowed and returns nothing).
    peek: u8,
    /// Tokens to read ahead and push back again.
    reads: u8,
    /// Copies of the current token to write.
    writes: u8,
    /// Whether to drop the current token.
    drop: bool,
}

#[derive(Debug, Arbitrary)]
struct Input {
    token_count: u8,
    steps: Vec<Step>,
    lookahead_limit: Option<u8>,
}

fuzz_target!(|input: Input| {
    if input.steps.is_empty() {
        return;
    }

    let count = input.token_count as usize;
    let tokens: Vec<Token> = (0..count)
        .map(|i| Token::new(i.to_string(), Span::new(i, i + 1)))
        .collect();

    let limit = input.lookahead_limit.map(|l| l as usize);
    let config = match limit {
        Some(limit) => BufferConfig::new().lookahead_limit(limit),
        None => BufferConfig::new(),
    };

    let steps = input.steps.clone();
    let mut invocation = 0;
    let mut expected_writes = 0;
    let mut expected_drops = 0;
    let mut seen = Vec::new();

    let rule = FnRule::new(|token: Token, cx: &mut Lookahead<'_>| {
        let step = &steps[invocation % steps.len()];
        invocation += 1;
        seen.push(token.text.clone());

        cx.peek(step.peek as usize)?;

        let mut taken = Vec::new();
        for _ in 0..step.reads % 8 {
            match cx.read()? {
                Some(next) => taken.push(next),
                None => break,
            }
        }
        while let Some(next) = taken.pop() {
            cx.push_back(next);
        }

        for _ in 0..step.writes % 4 {
            cx.write(token.clone());
            expected_writes += 1;
        }

        if step.drop {
            expected_drops += 1;
            Ok(None)
        } else {
            Ok(Some(token))
        }
    });

    let mut stream = BufferedTokenStream::with_config(IterSource::new(tokens), rule, config);
    let mut emitted = 0;
    let mut limited = false;
    loop {
        match stream.next_token() {
            Ok(Some(_)) => emitted += 1,
            Ok(None) => break,
            Err(relex::StreamError::LookaheadLimit { requested, limit }) => {
                assert!(requested > limit);
                limited = true;
                break;
            }
            Err(error) => panic!("unexpected error: {}", error),
        }
        assert!(emitted <= count * 4, "stream did not terminate");
    }

    // End marker is sticky
    if !limited {
        assert!(stream.next_token().unwrap().is_none());
    }
    drop(stream);

    if !limited {
        // Every input token reached the rule exactly once, in order
        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        assert_eq!(seen, expected);
        assert_eq!(emitted, count - expected_drops + expected_writes);
    }
});
