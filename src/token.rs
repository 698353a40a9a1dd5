//! Token types and definitions.
//!
//! This module defines the `Token` struct and `TokenKind` enum that flow
//! through a token stream. A token owns its term text so rewrite rules can
//! change it in place.

use crate::span::Span;
use std::fmt;

/// A token with its term text, kind, and source offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The term text.
    pub text: String,
    /// The type of token.
    pub kind: TokenKind,
    /// Offsets in the original text.
    pub span: Span,
    /// Position relative to the previous token (0 = same position).
    pub position_increment: u32,
}

impl Token {
    /// Create a new `Word` token.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Word,
            span,
            position_increment: 1,
        }
    }

    /// Create a token of a specific kind.
    pub fn with_kind(text: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            ..Self::new(text, span)
        }
    }

    /// Get the term text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the term text, keeping offsets and kind.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Check whether the term text equals `text`.
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Set the position increment, builder style.
    pub fn position_increment(mut self, increment: u32) -> Self {
        self.position_increment = increment;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} at {}", self.text, self.kind, self.span)
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// A plain word, the kind every whitespace-split token starts as.
    #[default]
    Word,
    /// Mixed letters and digits.
    Alphanum,
    /// A number.
    Numeric,
    /// Punctuation.
    Punctuation,
    /// A token injected by a rule at the position of another token.
    Synonym,
    /// A caller-defined type name.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(&'static str),
}

impl TokenKind {
    /// Check if this is a plain word.
    pub fn is_word(&self) -> bool {
        matches!(self, TokenKind::Word | TokenKind::Alphanum)
    }

    /// Check if this token was injected by a rule.
    pub fn is_synonym(&self) -> bool {
        matches!(self, TokenKind::Synonym)
    }

    /// The conventional type name.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::Alphanum => "alphanum",
            TokenKind::Numeric => "num",
            TokenKind::Punctuation => "punct",
            TokenKind::Synonym => "synonym",
            TokenKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_defaults() {
        let token = Token::new("how", Span::new(0, 3));
        assert_eq!(token.kind, TokenKind::Word);
        assert_eq!(token.position_increment, 1);
        assert!(token.is("how"));
    }

    #[test]
    fn test_set_text_keeps_offsets() {
        let mut token = Token::new("A", Span::new(8, 9));
        token.set_text("Q");
        assert_eq!(token.text(), "Q");
        assert_eq!(token.span, Span::new(8, 9));
        assert_eq!(token.kind, TokenKind::Word);
    }

    #[test]
    fn test_token_kind_checks() {
        assert!(TokenKind::Word.is_word());
        assert!(TokenKind::Alphanum.is_word());
        assert!(!TokenKind::Numeric.is_word());
        assert!(TokenKind::Synonym.is_synonym());
        assert_eq!(TokenKind::Custom("shingle").name(), "shingle");
    }

    #[test]
    fn test_token_display() {
        let token = Token::with_kind("42", TokenKind::Numeric, Span::new(0, 2));
        let display = format!("{}", token);
        assert!(display.contains("\"42\""));
        assert!(display.contains("num"));
        assert!(display.contains("0..2"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_token_serde() {
        let token = Token::new("cow", Span::new(19, 22)).position_increment(2);
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
