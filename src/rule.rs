//! Rewrite rules applied by a [`BufferedTokenStream`](crate::BufferedTokenStream).
//!
//! A rule sees one token at a time, by value, together with a
//! [`Lookahead`] handle onto the stream's queues. It returns the token to
//! emit (the same one, a mutated one, or a replacement), or `None` to drop
//! it.

use crate::buffered::Lookahead;
use crate::error::Result;
use crate::token::Token;

/// Per-token rewrite logic with access to lookahead, pushback, and writes.
pub trait RewriteRule {
    /// Rewrite `token`.
    ///
    /// `cx` is only valid for the duration of this call. `Ok(None)` drops
    /// the token; anything written through `cx` is still emitted.
    fn process(&mut self, token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>>;
}

impl<R: RewriteRule + ?Sized> RewriteRule for &mut R {
    fn process(&mut self, token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        (**self).process(token, cx)
    }
}

impl<R: RewriteRule + ?Sized> RewriteRule for Box<R> {
    fn process(&mut self, token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        (**self).process(token, cx)
    }
}

/// A rule backed by a closure.
pub struct FnRule<F> {
    f: F,
}

impl<F> FnRule<F>
where
    F: FnMut(Token, &mut Lookahead<'_>) -> Result<Option<Token>>,
{
    /// Wrap a closure as a rule.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RewriteRule for FnRule<F>
where
    F: FnMut(Token, &mut Lookahead<'_>) -> Result<Option<Token>>,
{
    fn process(&mut self, token: Token, cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        (self.f)(token, cx)
    }
}

/// Passes every token through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl RewriteRule for Identity {
    fn process(&mut self, token: Token, _cx: &mut Lookahead<'_>) -> Result<Option<Token>> {
        Ok(Some(token))
    }
}
