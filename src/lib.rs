//! Scope and structure checks for `switch` statements and closing
//! braces in PHP/JS-style source.
//!
//! The checkers run over an immutable [`TokenStream`] and a
//! [`ScopeTable`] of opener/closer/owner relations, and report
//! [`Diagnostic`]s, some of which carry an [`Edit`] that fixes them.
//! A lossless reference lexer, a scope matcher, and a fix applier are
//! included so the crate can be used on plain text.
//!
//! # Quick start
//!
//! ## Check a source string
//!
//! ```
//! use scopelint::{Config, check_str};
//!
//! let input = "switch ($x) {\n    case 1:\n        break;\n}\n";
//! let diagnostics = check_str(input, &Config::default()).unwrap();
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code.to_string(), "MissingDefault");
//! ```
//!
//! ## Fix what can be fixed
//!
//! ```
//! use scopelint::{Config, fix_str};
//!
//! let input = "switch ($x) {\n    CASE 1:\n        break;\n    default:\n        a();\n}\n";
//! let report = fix_str(input, &Config::default()).unwrap();
//! assert!(report.source.contains("    case 1:"));
//! assert!(report.remaining.is_empty());
//! ```
//!
//! ## Bring your own tokens
//!
//! ```
//! use scopelint::{Config, Registry, parse, tokenize};
//!
//! let stream = tokenize("if ($a) {\n  }\n").unwrap();
//! let scopes = parse(&stream);
//! let diagnostics = Registry::builtin()
//!     .run(&stream, &scopes, &Config::new().suppress("Indent"))
//!     .unwrap();
//! assert!(diagnostics.is_empty());
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod checker;
pub mod closing_brace;
pub mod config;
pub mod diagnostic;
pub mod fixer;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod stream;
pub mod switch_declaration;
pub mod token;

pub use checker::{Checker, Registry, all_checkers};
pub use closing_brace::ScopeClosingBrace;
pub use config::{Config, ConfigError, DEFAULT_INDENT};
pub use diagnostic::{Branch, Code, Diagnostic, Edit, Severity};
pub use fixer::{FixOutcome, FixReport, MAX_FIX_PASSES, apply_fixes, fix_str};
pub use lexer::{LexError, LexErrorKind, tokenize, tokenize_with_tab_width};
pub use parser::parse;
pub use scope::{Scope, ScopeError, ScopeTable};
pub use stream::TokenStream;
pub use switch_declaration::SwitchDeclaration;
pub use token::{Span, Token, TokenKind};

/// Unified error type for every fallible entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The reference lexer rejected the input.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// The configuration is unusable.
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// The scope table does not fit the stream.
    #[error("{0}")]
    Scope(#[from] ScopeError),
}

/// Run the built-in checkers over an already tokenized unit.
pub fn check(
    stream: &TokenStream,
    scopes: &ScopeTable,
    config: &Config,
) -> Result<Vec<Diagnostic>, Error> {
    Registry::builtin().run(stream, scopes, config)
}

/// Tokenize, match scopes, and check a source string in one step.
pub fn check_str(input: &str, config: &Config) -> Result<Vec<Diagnostic>, Error> {
    config.validate()?;
    let stream = tokenize_with_tab_width(input, config.tab_width)?;
    let scopes = parse(&stream);
    check(&stream, &scopes, config)
}
