/// Source location for diagnostics and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// Token kinds understood by the checkers.
///
/// Keywords are recognised regardless of case, so `CASE` is still
/// a [`TokenKind::Case`] token; the checkers look at `text` to judge
/// casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `switch`.
    Switch,
    /// `case`.
    Case,
    /// `default`.
    Default,
    /// `break`.
    Break,
    /// `return`.
    Return,
    /// `continue`.
    Continue,
    /// `throw`.
    Throw,
    /// `exit` or `die`.
    Exit,
    /// Any other keyword that can own a braced scope (`if`, `else`,
    /// `function`, `class`, ...).
    Keyword,
    /// Identifier, variable, or number.
    Word,
    /// Quoted string literal, quotes included.
    String,
    /// Run of spaces/tabs, or a single line break.
    Whitespace,
    /// Line or block comment.
    Comment,
    /// `:`.
    Colon,
    /// `;`.
    Semicolon,
    /// `{`.
    OpenBrace,
    /// `}`.
    CloseBrace,
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// `[`.
    OpenBracket,
    /// `]`.
    CloseBracket,
    /// Ternary `?`.
    Question,
    /// Any other operator or punctuation.
    Other,
}

impl TokenKind {
    /// `case` or `default`.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Case | Self::Default)
    }

    /// `break`, `return`, `continue`, or `throw`.
    #[must_use]
    pub const fn is_terminator(self) -> bool {
        matches!(
            self,
            Self::Break | Self::Return | Self::Continue | Self::Throw
        )
    }
}

/// A single token with its kind, raw text, location, and index
/// in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub position: usize,
}

impl Token {
    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.line
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.span.column
    }

    /// Line holding the last content character of the token.
    ///
    /// Differs from [`Token::line`] only for comments and strings
    /// spanning several lines. A trailing line break does not count.
    #[must_use]
    pub fn end_line(&self) -> usize {
        let content = self.text.trim_end_matches(['\r', '\n']);
        self.span.line + content.matches('\n').count()
    }

    /// Whether the token is a line break.
    #[must_use]
    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Whitespace && self.text.contains(['\n', '\r'])
    }
}
