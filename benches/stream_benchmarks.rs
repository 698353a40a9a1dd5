//! Benchmarks for the buffered token stream.
//!
//! Run with: `cargo bench`
//! View reports: `open target/criterion/report/index.html`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relex::{
    BufferConfig, BufferedTokenStream, Identity, IterSource, Lookahead, Result, RewriteRule,
    Span, Token,
};

/// Generate `count` tokens cycling through a vocabulary with rewrite triggers.
fn generate_tokens(count: usize) -> Vec<Token> {
    let vocabulary = ["how", "now", "A", "B", "brown", "A", "cow", "B", "like"];
    (0..count)
        .map(|i| {
            let text = vocabulary[i % vocabulary.len()];
            Token::new(text, Span::new(i * 6, i * 6 + text.len()))
        })
        .collect()
}

/// "A" "B" => "Q" "B"
struct AbToQb;

impl RewriteRule for AbToQb {
    fn process(&mut self, mut token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        if token.is("A") {
            if let Some(next) = cx.read()? {
                if next.is("B") {
                    token.set_text("Q");
                }
                cx.push_back(next);
            }
        }
        Ok(Some(token))
    }
}

/// "A" "B" => "A" "A" "B"
struct AbToAab;

impl RewriteRule for AbToAab {
    fn process(&mut self, token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        if token.is("A") && cx.peek(1)?.is_some_and(|next| next.is("B")) {
            cx.write(token.clone());
        }
        Ok(Some(token))
    }
}

/// Drain a stream and return the number of tokens it produced.
fn drain<R: RewriteRule>(tokens: Vec<Token>, rule: R) -> usize {
    let mut stream = BufferedTokenStream::new(IterSource::new(tokens), rule);
    let mut count = 0;
    while let Ok(Some(token)) = stream.next_token() {
        black_box(token);
        count += 1;
    }
    count
}

fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");

    for size in [100, 1_000, 10_000] {
        let tokens = generate_tokens(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("identity", size), &tokens, |b, tokens| {
            b.iter(|| drain(tokens.clone(), Identity))
        });
        group.bench_with_input(BenchmarkId::new("ab_to_qb", size), &tokens, |b, tokens| {
            b.iter(|| drain(tokens.clone(), AbToQb))
        });
        group.bench_with_input(BenchmarkId::new("ab_to_aab", size), &tokens, |b, tokens| {
            b.iter(|| drain(tokens.clone(), AbToAab))
        });
    }

    group.finish();
}

/// Cost of deep lookahead relative to the size of the window.
fn bench_lookahead_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookahead_depth");
    let tokens = generate_tokens(5_000);
    group.throughput(Throughput::Elements(tokens.len() as u64));

    for depth in [1, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("peek", depth), &depth, |b, &depth| {
            b.iter(|| {
                let config = BufferConfig::new().input_capacity(depth);
                let rule = relex::FnRule::new(move |token: Token, cx: &mut Lookahead<'_>| {
                    black_box(cx.peek(depth)?);
                    Ok(Some(token))
                });
                let mut stream =
                    BufferedTokenStream::with_config(IterSource::new(tokens.clone()), rule, config);
                while let Ok(Some(token)) = stream.next_token() {
                    black_box(token);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rules, bench_lookahead_depth);

criterion_main!(benches);
