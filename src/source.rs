//! Upstream token producers.
//!
//! A [`TokenSource`] is anything that hands out tokens one at a time and may
//! hold a resource that needs releasing. Tokenizers implement it, and so does
//! [`BufferedTokenStream`](crate::BufferedTokenStream), which lets rewrite
//! stages stack on top of each other.

use crate::error::Result;
use crate::token::Token;

/// A pull-based producer of tokens.
pub trait TokenSource {
    /// Produce the next token, or `Ok(None)` once the source is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>>;

    /// Release any resource held by the source.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Option<Token>> {
        (**self).next_token()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        (**self).next_token()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Items an [`IterSource`] can be built from: plain tokens or
/// `Result<Token>` for iterators that can fail.
pub trait SourceItem {
    /// Convert the item into a pull result.
    fn into_result(self) -> Result<Token>;
}

impl SourceItem for Token {
    fn into_result(self) -> Result<Token> {
        Ok(self)
    }
}

impl SourceItem for Result<Token> {
    fn into_result(self) -> Result<Token> {
        self
    }
}

/// A token source backed by an iterator.
///
/// The iterator is fused: once it returns `None`, it is never polled again.
/// Pulls and closes are counted so callers can observe how the source was
/// driven.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
    finished: bool,
    pulls: usize,
    closes: usize,
}

impl<I> IterSource<I>
where
    I: Iterator,
    I::Item: SourceItem,
{
    /// Create a source from anything iterable over tokens or token results.
    pub fn new<T>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: iter.into_iter(),
            finished: false,
            pulls: 0,
            closes: 0,
        }
    }

    /// Number of times the underlying iterator was polled.
    pub fn pulls(&self) -> usize {
        self.pulls
    }

    /// Number of times `close` was called.
    pub fn closes(&self) -> usize {
        self.closes
    }

    /// Check if the iterator has been exhausted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<I> TokenSource for IterSource<I>
where
    I: Iterator,
    I::Item: SourceItem,
{
    fn next_token(&mut self) -> Result<Option<Token>> {
        if self.finished {
            return Ok(None);
        }

        self.pulls += 1;
        match self.iter.next() {
            Some(item) => item.into_result().map(Some),
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closes += 1;
        Ok(())
    }
}
