//! Checker interface and the registry that drives checkers over a
//! token stream.

use crate::Error;
use crate::closing_brace::ScopeClosingBrace;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::scope::ScopeTable;
use crate::stream::TokenStream;
use crate::switch_declaration::SwitchDeclaration;
use crate::token::TokenKind;

/// A style check invoked once per token of an interesting kind.
///
/// Implementations are pure: everything they report comes back as
/// diagnostics, and the stream and table are only read.
pub trait Checker: Send + Sync {
    /// Name used as the prefix of full diagnostic codes.
    fn name(&self) -> &'static str;

    /// Token kinds this checker wants to be called for.
    fn interested_kinds(&self) -> &'static [TokenKind];

    /// Check the construct starting at `position`.
    fn check(
        &self,
        stream: &TokenStream,
        scopes: &ScopeTable,
        position: usize,
        config: &Config,
    ) -> Vec<Diagnostic>;
}

/// All built-in checkers.
#[must_use]
pub fn all_checkers() -> Vec<Box<dyn Checker>> {
    vec![Box::new(SwitchDeclaration), Box::new(ScopeClosingBrace)]
}

/// Ordered set of checkers dispatched by token kind.
pub struct Registry {
    checkers: Vec<Box<dyn Checker>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// A registry holding every built-in checker.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            checkers: all_checkers(),
        }
    }

    /// Add a checker.
    #[must_use]
    pub fn with(mut self, checker: Box<dyn Checker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Names of the registered checkers, in dispatch order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checkers.iter().map(|c| c.name())
    }

    /// Run every checker over every token it is interested in.
    ///
    /// Diagnostics come back ordered by position; for one position,
    /// in checker registration order and then emission order.
    /// Suppressed codes are dropped.
    ///
    /// # Errors
    ///
    /// Fails before checking anything if the configuration is invalid
    /// or the scope table points outside the stream.
    pub fn run(
        &self,
        stream: &TokenStream,
        scopes: &ScopeTable,
        config: &Config,
    ) -> Result<Vec<Diagnostic>, Error> {
        config.validate()?;
        scopes.check_bounds(stream.len())?;

        let mut diagnostics = Vec::new();
        for checker in &self.checkers {
            let kinds = checker.interested_kinds();
            for token in stream {
                if kinds.contains(&token.kind) {
                    diagnostics.extend(checker.check(stream, scopes, token.position, config));
                }
            }
        }

        diagnostics.retain(|d| !config.is_suppressed(d));
        diagnostics.sort_by_key(|d| d.position);
        Ok(diagnostics)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
