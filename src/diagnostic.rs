//! Diagnostic records and edit descriptors produced by the checkers.

use std::fmt;

use crate::token::{Span, Token};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Structural problem: missing `default`, wrong opener, misaligned
    /// closer.
    Error,
    /// Cosmetic problem such as blank-line spacing.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Which branch keyword a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Case,
    Default,
}

impl Branch {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Default => "default",
        }
    }

    #[must_use]
    pub const fn upper(self) -> &'static str {
        match self {
            Self::Case => "CASE",
            Self::Default => "DEFAULT",
        }
    }
}

/// Stable diagnostic code, used by callers to suppress or configure
/// individual checks. `Display` yields the code string, e.g.
/// `caseNotLower` or `SpaceBeforeColonCASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// `caseNotLower` / `defaultNotLower`.
    NotLower(Branch),
    /// `caseIndent` / `defaultIndent`.
    BranchIndent(Branch),
    SpacingAfterCase,
    /// `SpaceBeforeColonCASE` / `SpaceBeforeColonDEFAULT`.
    SpaceBeforeColon(Branch),
    /// `WrongOpenercase` / `WrongOpenerdefault`.
    WrongOpener(Branch),
    BreakIndent,
    DefaultNoBreak,
    DefaultNotLastInSwitch,
    DuplicateDefault,
    SpacingBeforeBreak,
    /// `SpacingAftercase`: blank line after the `case` label.
    BlankLineAfterCase,
    FoundMultipleBreaksPerCase,
    CaseWithoutBreakNoCommentFound,
    MissingDefault,
    MissingCase,
    CloseBraceAlign,
    /// `Line`: closing brace shares its line with other content.
    CloseBraceLine,
    /// `Indent`: closing brace not aligned with its scope.
    CloseBraceIndent,
    /// `BreakIdent`: `case`/`default` closer not one level in.
    CaseCloserIndent,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLower(b) => write!(f, "{}NotLower", b.as_str()),
            Self::BranchIndent(b) => write!(f, "{}Indent", b.as_str()),
            Self::SpacingAfterCase => write!(f, "SpacingAfterCase"),
            Self::SpaceBeforeColon(b) => write!(f, "SpaceBeforeColon{}", b.upper()),
            Self::WrongOpener(b) => write!(f, "WrongOpener{}", b.as_str()),
            Self::BreakIndent => write!(f, "BreakIndent"),
            Self::DefaultNoBreak => write!(f, "DefaultNoBreak"),
            Self::DefaultNotLastInSwitch => write!(f, "DefaultNotLastInSwitch"),
            Self::DuplicateDefault => write!(f, "DuplicateDefault"),
            Self::SpacingBeforeBreak => write!(f, "SpacingBeforeBreak"),
            Self::BlankLineAfterCase => write!(f, "SpacingAftercase"),
            Self::FoundMultipleBreaksPerCase => write!(f, "FoundMultipleBreaksPerCase"),
            Self::CaseWithoutBreakNoCommentFound => write!(f, "CaseWithoutBreakNoCommentFound"),
            Self::MissingDefault => write!(f, "MissingDefault"),
            Self::MissingCase => write!(f, "MissingCase"),
            Self::CloseBraceAlign => write!(f, "CloseBraceAlign"),
            Self::CloseBraceLine => write!(f, "Line"),
            Self::CloseBraceIndent => write!(f, "Indent"),
            Self::CaseCloserIndent => write!(f, "BreakIdent"),
        }
    }
}

/// Proposed change to a single token: drop the first `delete_len`
/// characters of its text and put `insert` in front of the rest.
///
/// Edits address one token each, so edits on distinct positions never
/// overlap and can be applied in one pass without re-tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub position: usize,
    pub delete_len: usize,
    pub insert: String,
}

impl Edit {
    /// Replace the whole text of `token`.
    #[must_use]
    pub fn replace(token: &Token, text: impl Into<String>) -> Self {
        Self {
            position: token.position,
            delete_len: token.text.chars().count(),
            insert: text.into(),
        }
    }

    /// Insert `text` in front of the token at `position`.
    #[must_use]
    pub fn insert_before(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            delete_len: 0,
            insert: text.into(),
        }
    }

    /// Remove `len` leading characters of the token at `position`.
    #[must_use]
    pub const fn trim_start(position: usize, len: usize) -> Self {
        Self {
            position,
            delete_len: len,
            insert: String::new(),
        }
    }
}

/// A style violation found by a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the checker that produced it.
    pub source: &'static str,
    pub code: Code,
    pub message: String,
    /// Token the diagnostic points at.
    pub position: usize,
    pub span: Span,
    pub fix: Option<Edit>,
}

impl Diagnostic {
    /// Create an error pointing at `token`.
    #[must_use]
    pub fn error(
        source: &'static str,
        code: Code,
        message: impl Into<String>,
        token: &Token,
    ) -> Self {
        Self::new(Severity::Error, source, code, message, token)
    }

    /// Create a warning pointing at `token`.
    #[must_use]
    pub fn warning(
        source: &'static str,
        code: Code,
        message: impl Into<String>,
        token: &Token,
    ) -> Self {
        Self::new(Severity::Warning, source, code, message, token)
    }

    fn new(
        severity: Severity,
        source: &'static str,
        code: Code,
        message: impl Into<String>,
        token: &Token,
    ) -> Self {
        Self {
            severity,
            source,
            code,
            message: message.into(),
            position: token.position,
            span: token.span,
            fix: None,
        }
    }

    /// Attach a proposed edit.
    #[must_use]
    pub fn with_fix(mut self, fix: Edit) -> Self {
        self.fix = Some(fix);
        self
    }

    #[must_use]
    pub const fn fixable(&self) -> bool {
        self.fix.is_some()
    }

    /// `Checker.code`, e.g. `SwitchDeclaration.MissingDefault`.
    #[must_use]
    pub fn full_code(&self) -> String {
        format!("{}.{}", self.source, self.code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) at line {}, column {}",
            self.severity,
            self.message,
            self.full_code(),
            self.span.line,
            self.span.column
        )
    }
}
