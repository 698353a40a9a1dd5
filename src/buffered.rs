//! Buffered token stream with lookahead, pushback, and rewrite rules.
//!
//! [`BufferedTokenStream`] sits between an upstream [`TokenSource`] and
//! whatever consumes tokens, and runs a [`RewriteRule`] once for every token
//! that reaches the front of the pipeline. While the rule runs it holds a
//! [`Lookahead`] handle that can:
//!
//! - **peek** at upcoming tokens without consuming them,
//! - **read** the next token off the lookahead queue,
//! - **push back** a token so the next read returns it again,
//! - **write** extra tokens to be emitted after the rule's result.
//!
//! The stream keeps two queues. The input queue holds tokens pulled from
//! upstream that the rule has not consumed yet; the output queue holds
//! tokens the rule wrote. Pending writes are always emitted before any new
//! input is pulled.
//!
//! # Example
//!
//! ```rust
//! use relex::{BufferedTokenStream, IterSource, Span, Token};
//!
//! let tokens = ["X", "A", "B", "Y"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, t)| Token::new(*t, Span::new(i * 2, i * 2 + 1)))
//!     .collect::<Vec<_>>();
//!
//! // "A" "B" => "Q" "B"
//! let stream = BufferedTokenStream::from_fn(IterSource::new(tokens), |mut token, cx| {
//!     if token.is("A") && cx.peek(1)?.is_some_and(|next| next.is("B")) {
//!         token.set_text("Q");
//!     }
//!     Ok(Some(token))
//! });
//!
//! assert_eq!(relex::render(stream).unwrap(), "X Q B Y");
//! ```

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::{Result, StreamError};
use crate::rule::{FnRule, RewriteRule};
use crate::source::TokenSource;
use crate::token::Token;

/// Configuration for a buffered token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferConfig {
    /// Furthest position a rule may peek at.
    /// Default: unbounded
    pub lookahead_limit: Option<usize>,
    /// Initial capacity of the lookahead queue.
    /// Default: 16 tokens
    pub input_capacity: usize,
    /// Initial capacity of the output queue.
    /// Default: 4 tokens
    pub output_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            lookahead_limit: None,
            input_capacity: 16,
            output_capacity: 4,
        }
    }
}

impl BufferConfig {
    /// Create a new buffer configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how far ahead a rule may peek.
    pub fn lookahead_limit(mut self, limit: usize) -> Self {
        self.lookahead_limit = Some(limit);
        self
    }

    /// Allow unbounded lookahead.
    pub fn unbounded(mut self) -> Self {
        self.lookahead_limit = None;
        self
    }

    /// Set the initial lookahead queue capacity.
    pub fn input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity;
        self
    }

    /// Set the initial output queue capacity.
    pub fn output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }
}

/// Counters describing how a stream has been driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferStats {
    /// Calls made to the upstream source, including the one that hit the end.
    pub upstream_pulls: usize,
    /// Times the rule was invoked.
    pub rule_invocations: usize,
    /// Tokens returned from `next_token`.
    pub tokens_emitted: usize,
    /// Tokens pushed back onto the lookahead queue.
    pub pushbacks: usize,
    /// Tokens written to the output queue.
    pub writes: usize,
    /// Largest size the lookahead queue reached.
    pub max_buffered: usize,
}

/// Lifecycle of a buffered token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Tokens may still be produced.
    Running,
    /// Upstream has ended and both queues are empty.
    Exhausted,
    /// `close` has been called.
    Closed,
}

/// Queues and bookkeeping shared between the stream and the rule.
#[derive(Debug)]
struct Buffers {
    input: VecDeque<Token>,
    output: VecDeque<Token>,
    upstream_done: bool,
    stats: BufferStats,
}

impl Buffers {
    fn new(config: &BufferConfig) -> Self {
        Self {
            input: VecDeque::with_capacity(config.input_capacity),
            output: VecDeque::with_capacity(config.output_capacity),
            upstream_done: false,
            stats: BufferStats::default(),
        }
    }

    /// Pull one token from upstream. Never polls again after the end.
    fn pull(&mut self, source: &mut dyn TokenSource) -> Result<Option<Token>> {
        if self.upstream_done {
            return Ok(None);
        }

        self.stats.upstream_pulls += 1;
        match source.next_token()? {
            Some(token) => {
                trace!(text = %token.text, span = %token.span, "pulled token");
                Ok(Some(token))
            }
            None => {
                debug!(pulls = self.stats.upstream_pulls, "upstream exhausted");
                self.upstream_done = true;
                Ok(None)
            }
        }
    }

    /// Take the next token, buffered first.
    fn read(&mut self, source: &mut dyn TokenSource) -> Result<Option<Token>> {
        match self.input.pop_front() {
            Some(token) => Ok(Some(token)),
            None => self.pull(source),
        }
    }

    /// Ensure at least `n` tokens are buffered. Returns `false` if upstream
    /// ended first.
    fn fill(&mut self, source: &mut dyn TokenSource, n: usize) -> Result<bool> {
        while self.input.len() < n {
            match self.pull(source)? {
                Some(token) => {
                    self.input.push_back(token);
                    self.note_buffered();
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn note_buffered(&mut self) {
        self.stats.max_buffered = self.stats.max_buffered.max(self.input.len());
    }

    fn is_drained(&self) -> bool {
        self.upstream_done && self.input.is_empty() && self.output.is_empty()
    }
}

/// A rule's handle onto the stream for the duration of one `process` call.
pub struct Lookahead<'a> {
    source: &'a mut dyn TokenSource,
    buffers: &'a mut Buffers,
    limit: Option<usize>,
    reads: usize,
    pushbacks: usize,
    writes: usize,
}

impl<'a> Lookahead<'a> {
    fn new(
        source: &'a mut dyn TokenSource,
        buffers: &'a mut Buffers,
        limit: Option<usize>,
    ) -> Self {
        Self {
            source,
            buffers,
            limit,
            reads: 0,
            pushbacks: 0,
            writes: 0,
        }
    }

    /// Peek at the token `n` positions ahead without consuming it.
    ///
    /// `peek(1)` is the token the next [`read`](Self::read) returns;
    /// `peek(0)` is the same token. Returns `Ok(None)` only when upstream
    /// ends before position `n`. Peeking at an already buffered position
    /// never touches upstream.
    pub fn peek(&mut self, n: usize) -> Result<Option<&Token>> {
        let n = n.max(1);
        if let Some(limit) = self.limit {
            if n > limit {
                return Err(StreamError::LookaheadLimit { requested: n, limit });
            }
        }

        if !self.buffers.fill(&mut *self.source, n)? {
            return Ok(None);
        }
        Ok(self.buffers.input.get(n - 1))
    }

    /// Consume and return the next token, or `Ok(None)` at end of stream.
    pub fn read(&mut self) -> Result<Option<Token>> {
        let token = self.buffers.read(&mut *self.source)?;
        if token.is_some() {
            self.reads += 1;
        }
        Ok(token)
    }

    /// Put a token back on the front of the lookahead queue.
    ///
    /// Tokens pushed back in a row come out again in reverse order.
    pub fn push_back(&mut self, token: Token) {
        trace!(text = %token.text, "pushed back token");
        self.buffers.input.push_front(token);
        self.buffers.note_buffered();
        self.buffers.stats.pushbacks += 1;
        self.pushbacks += 1;
    }

    /// Queue a token for output after the current rule result.
    pub fn write(&mut self, token: Token) {
        trace!(text = %token.text, "wrote token");
        self.buffers.output.push_back(token);
        self.buffers.stats.writes += 1;
        self.writes += 1;
    }

    /// Number of tokens in the lookahead queue.
    pub fn buffered(&self) -> usize {
        self.buffers.input.len()
    }

    /// Number of tokens waiting in the output queue.
    pub fn pending(&self) -> usize {
        self.buffers.output.len()
    }

    /// Check whether upstream has signalled the end.
    pub fn is_upstream_done(&self) -> bool {
        self.buffers.upstream_done
    }

    /// The rule pushed back as many tokens as it took and wrote nothing.
    fn is_idle(&self) -> bool {
        self.writes == 0 && self.pushbacks == self.reads + 1
    }
}

impl fmt::Debug for Lookahead<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookahead")
            .field("buffered", &self.buffers.input.len())
            .field("pending", &self.buffers.output.len())
            .field("upstream_done", &self.buffers.upstream_done)
            .field("limit", &self.limit)
            .finish()
    }
}

/// A token stream that applies a rewrite rule with lookahead.
pub struct BufferedTokenStream<S: TokenSource, R: RewriteRule> {
    /// Upstream token producer.
    source: S,
    /// Rule applied to every top-level token.
    rule: R,
    /// Lookahead and output queues.
    buffers: Buffers,
    /// Configuration.
    config: BufferConfig,
    /// Token left at the front by the last pass that consumed nothing.
    idle_front: Option<Token>,
    /// Whether `close` has run.
    closed: bool,
}

impl<S: TokenSource, R: RewriteRule> BufferedTokenStream<S, R> {
    /// Create a new buffered token stream.
    pub fn new(source: S, rule: R) -> Self {
        Self::with_config(source, rule, BufferConfig::default())
    }

    /// Create a new buffered token stream with custom configuration.
    pub fn with_config(source: S, rule: R, config: BufferConfig) -> Self {
        Self {
            source,
            rule,
            buffers: Buffers::new(&config),
            config,
            idle_front: None,
            closed: false,
        }
    }

    /// Get the next token, or `Ok(None)` at end of stream.
    ///
    /// Writes left by the previous rule invocation are emitted first, in
    /// the order they were written. Otherwise one token is taken from the
    /// lookahead queue (or upstream) and handed to the rule, whose result
    /// is returned. If the rule drops its token, the loop continues with
    /// whatever it wrote or with the next input.
    ///
    /// An error returned by the rule (including an upstream failure seen
    /// through `peek` or `read`) is passed on as is; the token the rule was
    /// given, and any tokens it had read but not pushed back, are lost.
    ///
    /// A rule that drops its token and pushes back exactly the token it was
    /// given, consuming and writing nothing, would be handed that token
    /// forever. That is reported as [`StreamError::NoProgress`].
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.closed {
            return Err(StreamError::Closed);
        }

        loop {
            if let Some(token) = self.buffers.output.pop_front() {
                self.buffers.stats.tokens_emitted += 1;
                return Ok(Some(token));
            }

            let Some(token) = self.buffers.read(&mut self.source)? else {
                return Ok(None);
            };

            self.buffers.stats.rule_invocations += 1;
            let mut cx = Lookahead::new(
                &mut self.source,
                &mut self.buffers,
                self.config.lookahead_limit,
            );
            let result = self.rule.process(token, &mut cx)?;
            let idle = cx.is_idle();

            match result {
                Some(token) => {
                    self.idle_front = None;
                    self.buffers.stats.tokens_emitted += 1;
                    return Ok(Some(token));
                }
                None if idle => {
                    let front = self.buffers.input.front();
                    if front.is_some() && front == self.idle_front.as_ref() {
                        warn!("rewrite rule keeps pushing back the same token");
                        return Err(StreamError::NoProgress);
                    }
                    self.idle_front = front.cloned();
                }
                None => self.idle_front = None,
            }
        }
    }

    /// Close the upstream source.
    ///
    /// Only the first call reaches upstream; later calls return `Ok(())`.
    /// Buffered and pending tokens are discarded.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.closed = true;
        debug!(
            buffered = self.buffers.input.len(),
            pending = self.buffers.output.len(),
            "closing token stream"
        );
        self.buffers.input.clear();
        self.buffers.output.clear();
        self.source.close()
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> StreamState {
        if self.closed {
            StreamState::Closed
        } else if self.buffers.is_drained() {
            StreamState::Exhausted
        } else {
            StreamState::Running
        }
    }

    /// Check if the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of tokens in the lookahead queue.
    pub fn buffered(&self) -> usize {
        self.buffers.input.len()
    }

    /// Number of written tokens not yet emitted.
    pub fn pending(&self) -> usize {
        self.buffers.output.len()
    }

    /// Get a snapshot of the stream's counters.
    pub fn stats(&self) -> BufferStats {
        self.buffers.stats
    }

    /// Get the configuration.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Get the upstream source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the rule.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Get the rule mutably, e.g. to reconfigure it between tokens.
    pub fn rule_mut(&mut self) -> &mut R {
        &mut self.rule
    }

    /// Iterate over the remaining tokens.
    pub fn iter(&mut self) -> TokenIter<'_, S, R> {
        TokenIter {
            stream: self,
            done: false,
        }
    }

    /// Drain the stream into a vector, then close it.
    ///
    /// The stream is closed even when draining fails; the draining error
    /// takes precedence over a close error.
    pub fn collect_tokens(mut self) -> Result<Vec<Token>> {
        let drained = self.iter().collect::<Result<Vec<_>>>();
        let closed = self.close();
        let tokens = drained?;
        closed?;
        Ok(tokens)
    }
}

impl<S, F> BufferedTokenStream<S, FnRule<F>>
where
    S: TokenSource,
    F: FnMut(Token, &mut Lookahead<'_>) -> Result<Option<Token>>,
{
    /// Create a stream whose rule is a closure.
    pub fn from_fn(source: S, f: F) -> Self {
        Self::new(source, FnRule::new(f))
    }
}

impl<S: TokenSource, R: RewriteRule> TokenSource for BufferedTokenStream<S, R> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        BufferedTokenStream::next_token(self)
    }

    fn close(&mut self) -> Result<()> {
        BufferedTokenStream::close(self)
    }
}

impl<S: TokenSource, R: RewriteRule> Drop for BufferedTokenStream<S, R> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(error) = self.close() {
                warn!(%error, "failed to close upstream token source");
            }
        }
    }
}

/// An iterator adapter for `BufferedTokenStream`.
///
/// Yields `Err` at most once and stops after it.
pub struct TokenIter<'s, S: TokenSource, R: RewriteRule> {
    stream: &'s mut BufferedTokenStream<S, R>,
    done: bool,
}

impl<'s, S: TokenSource, R: RewriteRule> Iterator for TokenIter<'s, S, R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.stream.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// Drive a source to the end and join the term texts with single spaces.
///
/// The source is closed afterwards, also when reading fails.
pub fn render<S: TokenSource>(mut source: S) -> Result<String> {
    let mut out = String::new();
    let drained = append_texts(&mut source, &mut out);
    let closed = source.close();
    drained?;
    closed?;
    Ok(out)
}

fn append_texts<S: TokenSource>(source: &mut S, out: &mut String) -> Result<()> {
    while let Some(token) = source.next_token()? {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    Ok(())
}
