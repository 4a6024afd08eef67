//! Reference scope matcher.
//!
//! Derives a [`ScopeTable`] from a token stream the way a host
//! tokenizer would: braced scopes for control keywords and
//! declarations, and colon-delimited scopes for the `case`/`default`
//! branches of every `switch`. Anything it cannot match is left out of
//! the table, which the checkers treat as "not analyzable".

use crate::scope::{Scope, ScopeTable};
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// Build the scope table for a token stream.
#[must_use]
pub fn parse(stream: &TokenStream) -> ScopeTable {
    Matcher::new(stream).run()
}

const INSIGNIFICANT: &[TokenKind] = &[TokenKind::Whitespace, TokenKind::Comment];

/// Bracket pairs by position: each opener maps to its closer and
/// back. Unbalanced brackets map to `None`.
fn match_brackets(stream: &TokenStream) -> Vec<Option<usize>> {
    let mut pairs = vec![None; stream.len()];
    let mut stack: Vec<usize> = Vec::new();

    for token in stream {
        let open_kind = match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                stack.push(token.position);
                continue;
            }
            TokenKind::CloseParen => TokenKind::OpenParen,
            TokenKind::CloseBracket => TokenKind::OpenBracket,
            TokenKind::CloseBrace => TokenKind::OpenBrace,
            _ => continue,
        };

        // pop down to the nearest opener of the same type; a closer
        // without one is ignored
        if let Some(depth) = stack.iter().rposition(|&p| stream[p].kind == open_kind) {
            let opener = stack[depth];
            stack.truncate(depth);
            pairs[opener] = Some(token.position);
            pairs[token.position] = Some(opener);
        }
    }

    pairs
}

struct Matcher<'a> {
    stream: &'a TokenStream,
    pairs: Vec<Option<usize>>,
    table: ScopeTable,
}

impl<'a> Matcher<'a> {
    fn new(stream: &'a TokenStream) -> Self {
        Self {
            stream,
            pairs: match_brackets(stream),
            table: ScopeTable::new(),
        }
    }

    fn run(mut self) -> ScopeTable {
        let stream = self.stream;

        for token in stream {
            if !matches!(token.kind, TokenKind::Switch | TokenKind::Keyword) {
                continue;
            }
            let Some(opener) = self.brace_opener(token.position) else {
                continue;
            };
            let Some(closer) = self.pairs[opener] else {
                continue;
            };

            self.record(Scope {
                condition: token.position,
                opener,
                closer,
            });

            if token.kind == TokenKind::Switch {
                self.branch_scopes(opener, closer);
            }
        }

        self.table
    }

    fn record(&mut self, scope: Scope) {
        // matched positions always satisfy the table invariants
        let inserted = self.table.insert(scope);
        debug_assert!(inserted.is_ok(), "{inserted:?}");
    }

    fn significant(&self, from: usize) -> Option<usize> {
        self.stream.next_not_of_kind(INSIGNIFICANT, from, None)
    }

    /// The `{` opening the body owned by a keyword, if any.
    fn brace_opener(&self, condition: usize) -> Option<usize> {
        let token = &self.stream[condition];
        if token.kind == TokenKind::Switch {
            return self.brace_after_parens(condition);
        }

        match token.text.to_ascii_lowercase().as_str() {
            "if" | "elseif" | "for" | "foreach" | "while" | "catch" | "declare" => {
                self.brace_after_parens(condition)
            }
            "else" | "do" | "try" | "finally" => self.brace_next(condition),
            _ => self.declaration_brace(condition),
        }
    }

    fn brace_next(&self, position: usize) -> Option<usize> {
        let next = self.significant(position + 1)?;
        (self.stream[next].kind == TokenKind::OpenBrace).then_some(next)
    }

    /// `keyword (...) {`
    fn brace_after_parens(&self, condition: usize) -> Option<usize> {
        let open = self.significant(condition + 1)?;
        if self.stream[open].kind != TokenKind::OpenParen {
            return None;
        }
        self.brace_next(self.pairs[open]?)
    }

    /// `function name(...): type {`, `class A extends B {`, ...
    fn declaration_brace(&self, condition: usize) -> Option<usize> {
        let mut from = condition + 1;
        while let Some(next) = self.significant(from) {
            let token = &self.stream[next];
            match token.kind {
                TokenKind::OpenBrace => return Some(next),
                TokenKind::OpenParen | TokenKind::OpenBracket => from = self.pairs[next]? + 1,
                TokenKind::Semicolon
                | TokenKind::CloseParen
                | TokenKind::CloseBracket
                | TokenKind::CloseBrace => return None,
                TokenKind::Other if token.text == "=" => return None,
                _ => from = next + 1,
            }
        }
        None
    }

    /// Skip past a bracket group starting at `position`, or just the
    /// token when it is not a matched opener.
    fn step_over(&self, position: usize) -> usize {
        match self.stream[position].kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                self.pairs[position].map_or(position + 1, |close| close + 1)
            }
            _ => position + 1,
        }
    }

    /// `case`/`default` tokens directly inside a switch body. Nested
    /// bodies, including nested switches, are stepped over whole.
    fn branches_in(&self, body_open: usize, body_close: usize) -> Vec<usize> {
        let mut branches = Vec::new();
        let mut i = body_open + 1;
        while i < body_close {
            if self.stream[i].kind.is_branch() {
                branches.push(i);
            }
            i = self.step_over(i);
        }
        branches
    }

    fn branch_scopes(&mut self, body_open: usize, body_close: usize) {
        let branches = self.branches_in(body_open, body_close);
        let mut closers: Vec<Option<usize>> = vec![None; branches.len()];

        // back to front, so a fallthrough can borrow the closer of the
        // branch below it and the last branch reaching a shared
        // terminator registers first and owns it
        for (i, &branch) in branches.iter().enumerate().rev() {
            let limit = branches.get(i + 1).copied().unwrap_or(body_close);
            let Some(opener) = self.branch_opener(branch, limit) else {
                continue;
            };

            let closer = if self.stream[opener].kind == TokenKind::OpenBrace {
                self.pairs[opener]
            } else {
                self.branch_closer(opener, body_close, &branches, &closers)
            };
            let Some(closer) = closer else {
                continue;
            };

            closers[i] = Some(closer);
            self.record(Scope {
                condition: branch,
                opener,
                closer,
            });
        }
    }

    /// The `:` ending a branch label. A ternary `?` inside the label
    /// consumes the next colon. `;` and `{` are returned as well so the
    /// checker can flag them.
    fn branch_opener(&self, branch: usize, limit: usize) -> Option<usize> {
        let mut pending_ternaries = 0usize;
        let mut i = branch + 1;
        while i < limit {
            match self.stream[i].kind {
                TokenKind::OpenParen | TokenKind::OpenBracket => {
                    i = self.pairs[i]? + 1;
                    continue;
                }
                TokenKind::Question => pending_ternaries += 1,
                TokenKind::Colon if pending_ternaries > 0 => pending_ternaries -= 1,
                TokenKind::Colon | TokenKind::Semicolon | TokenKind::OpenBrace => return Some(i),
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// First terminator after a branch opener; a branch running into
    /// the next one shares its closer, a branch running into the end of
    /// the switch ends at the switch's `}`.
    fn branch_closer(
        &self,
        opener: usize,
        body_close: usize,
        branches: &[usize],
        closers: &[Option<usize>],
    ) -> Option<usize> {
        let mut i = opener + 1;
        while i < body_close {
            let kind = self.stream[i].kind;
            if kind.is_terminator() || kind == TokenKind::Exit {
                return Some(i);
            }
            if kind.is_branch() {
                let next = branches.iter().position(|&b| b == i)?;
                return closers[next];
            }
            i = self.step_over(i);
        }
        Some(body_close)
    }
}
