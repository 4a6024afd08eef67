//! Immutable token stream with the positional queries both checkers
//! share.

use std::ops::Index;

use crate::token::{Token, TokenKind};

/// Ordered, random-access sequence of tokens for one analyzed unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Wrap tokens, renumbering each `position` to its index.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        for (i, token) in tokens.iter_mut().enumerate() {
            token.position = i;
        }
        Self { tokens }
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Concatenated token text.
    #[must_use]
    pub fn source(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// First non-whitespace token on the line where `position` starts.
    ///
    /// Falls back to `position` itself when everything before it on
    /// that line is whitespace.
    #[must_use]
    pub fn first_on_line(&self, position: usize) -> Option<usize> {
        let line = self.get(position)?.line();
        let mut start = position;
        while start > 0 && self.tokens[start - 1].line() == line {
            start -= 1;
        }
        self.next_not_of_kind(&[TokenKind::Whitespace], start, Some(position + 1))
    }

    /// First token in `from..end` whose kind is in `kinds`.
    /// `end` defaults to the end of the stream.
    #[must_use]
    pub fn next_of_kind(
        &self,
        kinds: &[TokenKind],
        from: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        self.scan_forward(from, end, |t| kinds.contains(&t.kind))
    }

    /// First token in `from..end` whose kind is not in `kinds`.
    #[must_use]
    pub fn next_not_of_kind(
        &self,
        kinds: &[TokenKind],
        from: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        self.scan_forward(from, end, |t| !kinds.contains(&t.kind))
    }

    /// Walking back from `from` down to `stop` (both inclusive), the
    /// first token whose kind is in `kinds`. `stop` defaults to 0.
    #[must_use]
    pub fn previous_of_kind(
        &self,
        kinds: &[TokenKind],
        from: usize,
        stop: Option<usize>,
    ) -> Option<usize> {
        self.scan_backward(from, stop, |t| kinds.contains(&t.kind))
    }

    /// Walking back from `from` down to `stop` (both inclusive), the
    /// first token whose kind is not in `kinds`.
    #[must_use]
    pub fn previous_not_of_kind(
        &self,
        kinds: &[TokenKind],
        from: usize,
        stop: Option<usize>,
    ) -> Option<usize> {
        self.scan_backward(from, stop, |t| !kinds.contains(&t.kind))
    }

    fn scan_forward(
        &self,
        from: usize,
        end: Option<usize>,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (from..end).find(|&i| pred(&self.tokens[i]))
    }

    fn scan_backward(
        &self,
        from: usize,
        stop: Option<usize>,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let from = from.min(self.tokens.len() - 1);
        let stop = stop.unwrap_or(0);
        if stop > from {
            return None;
        }
        (stop..=from).rev().find(|&i| pred(&self.tokens[i]))
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, position: usize) -> &Token {
        &self.tokens[position]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}
