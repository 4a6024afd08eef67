//! Closing brace placement for every scoped block.

use crate::checker::Checker;
use crate::config::Config;
use crate::diagnostic::{Code, Diagnostic};
use crate::scope::ScopeTable;
use crate::stream::TokenStream;
use crate::token::TokenKind;

const NAME: &str = "ScopeClosingBrace";

/// Checks that a scope's closer sits on its own line, aligned with the
/// line that opened the scope. For `case`/`default` the closer is the
/// terminating statement and sits one level deeper.
pub struct ScopeClosingBrace;

impl Checker for ScopeClosingBrace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested_kinds(&self) -> &'static [TokenKind] {
        &[
            TokenKind::Switch,
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::Keyword,
        ]
    }

    fn check(
        &self,
        stream: &TokenStream,
        scopes: &ScopeTable,
        position: usize,
        config: &Config,
    ) -> Vec<Diagnostic> {
        let Some(&scope) = scopes.scope_of(position) else {
            return Vec::new();
        };
        // a shared closer is checked once, by its owner
        if !scopes.is_canonical_owner(position, scope.closer) {
            return Vec::new();
        }

        let closer = &stream[scope.closer];

        // `public function`, `} else {`: align with what starts the line
        let line_start = stream.first_on_line(position).unwrap_or(position);
        let start_column = stream[line_start].column();

        let last_content = stream
            .previous_not_of_kind(&[TokenKind::Whitespace], scope.closer - 1, Some(scope.opener))
            .unwrap_or(scope.opener);
        if stream[last_content].end_line() == closer.line() {
            return vec![Diagnostic::error(
                NAME,
                Code::CloseBraceLine,
                "Closing brace must be on a line by itself",
                closer,
            )];
        }

        let brace_column = closer.column();
        if stream[position].kind.is_branch() {
            let expected = start_column + config.indent;
            if brace_column != expected {
                return vec![Diagnostic::error(
                    NAME,
                    Code::CaseCloserIndent,
                    format!(
                        "Case breaking statement indented incorrectly; \
                         expected {} spaces, found {}",
                        expected - 1,
                        brace_column - 1
                    ),
                    closer,
                )];
            }
        } else if brace_column != start_column {
            return vec![Diagnostic::error(
                NAME,
                Code::CloseBraceIndent,
                format!(
                    "Closing brace indented incorrectly; expected {} spaces, found {}",
                    start_column - 1,
                    brace_column - 1
                ),
                closer,
            )];
        }

        Vec::new()
    }
}
