//! # Relex
//!
//! A buffered token stream that rewrites tokens with lookahead.
//!
//! `relex` sits between a tokenizer and whatever consumes its tokens. A
//! [`BufferedTokenStream`] pulls tokens from an upstream [`TokenSource`] one
//! at a time and hands each to a [`RewriteRule`], which can look at the
//! tokens that follow, push tokens back, and write extra tokens, while the
//! consumer still sees a plain single-pass stream.
//!
//! ## Features
//!
//! - **Lookahead**: peek any number of tokens ahead; upstream is pulled lazily
//!   and at most once per position
//! - **Pushback**: return consumed tokens to the front of the stream
//! - **Writes**: emit extra tokens after the current one
//! - **Chaining**: a stream is itself a `TokenSource`, so rewrite stages stack
//! - **Scoped Release**: the upstream is closed exactly once, on `close()` or drop
//!
//! ## Quick Start
//!
//! ```rust
//! use relex::{BufferedTokenStream, IterSource, Span, Token};
//!
//! let input = "How now A B brown A cow B like A B thing?";
//! let mut offset = 0;
//! let tokens: Vec<Token> = input
//!     .split(' ')
//!     .map(|word| {
//!         let token = Token::new(word, Span::new(offset, offset + word.len()));
//!         offset += word.len() + 1;
//!         token
//!     })
//!     .collect();
//!
//! // "A" "B" => "A" "A" "B"
//! let stream = BufferedTokenStream::from_fn(IterSource::new(tokens), |token, cx| {
//!     if token.is("A") && cx.peek(1)?.is_some_and(|next| next.is("B")) {
//!         cx.write(token.clone());
//!     }
//!     Ok(Some(token))
//! });
//!
//! assert_eq!(
//!     relex::render(stream).unwrap(),
//!     "How now A A B brown A cow B like A A B thing?"
//! );
//! ```
//!
//! ## Custom Rules
//!
//! ```rust
//! use relex::{Lookahead, Result, RewriteRule, Token};
//!
//! /// "A" "B" => "Q" "B"
//! struct AbToQb;
//!
//! impl RewriteRule for AbToQb {
//!     fn process(&mut self, mut token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
//!         if token.is("A") {
//!             if let Some(next) = cx.read()? {
//!                 if next.is("B") {
//!                     token.set_text("Q");
//!                 }
//!                 cx.push_back(next);
//!             }
//!         }
//!         Ok(Some(token))
//!     }
//! }
//! ```

pub mod buffered;
pub mod error;
pub mod rule;
pub mod source;
pub mod span;
pub mod token;

// Re-export commonly used types
pub use buffered::{
    render, BufferConfig, BufferStats, BufferedTokenStream, Lookahead, StreamState, TokenIter,
};
pub use error::{Result, StreamError};
pub use rule::{FnRule, Identity, RewriteRule};
pub use source::{IterSource, SourceItem, TokenSource};
pub use span::Span;
pub use token::{Token, TokenKind};
