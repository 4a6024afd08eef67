use std::fmt;

use crate::stream::TokenStream;
use crate::token::{Span, Token, TokenKind};

/// Tab width used by [`tokenize`].
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// String literal never closed by its quote character.
    UnterminatedString { quote: char },
    /// `/*` comment never closed by `*/`.
    UnterminatedComment,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString { quote } => {
                write!(f, "unterminated string, expected closing {quote}")
            }
            Self::UnterminatedComment => {
                write!(f, "unterminated block comment")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize PHP/JS-style source into a lossless token stream.
///
/// Tabs advance the column to the next multiple of
/// [`DEFAULT_TAB_WIDTH`].
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or block comments.
pub fn tokenize(input: &str) -> Result<TokenStream, LexError> {
    tokenize_with_tab_width(input, DEFAULT_TAB_WIDTH)
}

/// Like [`tokenize`], with an explicit tab width. A width of 0 counts
/// a tab as a single column.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or block comments.
pub fn tokenize_with_tab_width(input: &str, tab_width: usize) -> Result<TokenStream, LexError> {
    Lexer::new(input, tab_width)
        .tokenize()
        .map(TokenStream::new)
}

/// Keywords that can own a braced scope, besides the dedicated kinds.
const SCOPE_KEYWORDS: &[&str] = &[
    "if",
    "elseif",
    "else",
    "for",
    "foreach",
    "while",
    "do",
    "try",
    "catch",
    "finally",
    "declare",
    "function",
    "class",
    "interface",
    "trait",
    "enum",
    "namespace",
];

fn keyword_kind(word: &str) -> Option<TokenKind> {
    let lower = word.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "break" => TokenKind::Break,
        "return" => TokenKind::Return,
        "continue" => TokenKind::Continue,
        "throw" => TokenKind::Throw,
        "exit" | "die" => TokenKind::Exit,
        other if SCOPE_KEYWORDS.contains(&other) => TokenKind::Keyword,
        _ => return None,
    };
    Some(kind)
}

const fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '\\') || !ch.is_ascii()
}

struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    tab_width: usize,
}

impl Lexer {
    fn new(input: &str, tab_width: usize) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            tab_width,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();

        // byte order mark: kept for lossless output, takes no column
        if self.peek() == Some('\u{feff}') {
            tokens.push(self.make_token(TokenKind::Whitespace, "\u{feff}".to_string()));
            self.pos += 1;
        }

        while let Some(ch) = self.peek() {
            let token = match ch {
                '\n' | '\r' => self.read_newline(),
                ' ' | '\t' => self.read_blanks(),
                '#' => self.read_line_comment(),
                '/' if self.peek_at(1) == Some('/') => self.read_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.read_block_comment()?,
                '"' | '\'' | '`' => self.read_string(ch)?,
                '{' => self.read_char(TokenKind::OpenBrace),
                '}' => self.read_char(TokenKind::CloseBrace),
                '(' => self.read_char(TokenKind::OpenParen),
                ')' => self.read_char(TokenKind::CloseParen),
                '[' => self.read_char(TokenKind::OpenBracket),
                ']' => self.read_char(TokenKind::CloseBracket),
                ';' => self.read_char(TokenKind::Semicolon),
                ':' if self.peek_at(1) == Some(':') => self.read_fixed(TokenKind::Other, 2),
                ':' => self.read_char(TokenKind::Colon),
                '?' => self.read_question(),
                '<' if self.peek_at(1) == Some('?') => self.read_open_tag(),
                '-' | '=' if self.peek_at(1) == Some('>') => self.read_fixed(TokenKind::Other, 2),
                c if is_word_char(c) => self.read_word(&tokens),
                _ => self.read_char(TokenKind::Other),
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    const fn make_token(&self, kind: TokenKind, text: String) -> Token {
        Token {
            kind,
            text,
            span: self.span(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        let Some(ch) = self.peek() else {
            return;
        };
        match ch {
            '\n' => {
                self.line += 1;
                self.col = 1;
            }
            // lone carriage return is a line break too
            '\r' if self.peek_at(1) != Some('\n') => {
                self.line += 1;
                self.col = 1;
            }
            '\t' if self.tab_width > 0 => {
                self.col = ((self.col - 1) / self.tab_width + 1) * self.tab_width + 1;
            }
            _ => self.col += 1,
        }
        self.pos += 1;
    }

    fn text_since(&self, start: usize) -> String {
        self.input[start..self.pos].iter().collect()
    }

    fn read_fixed(&mut self, kind: TokenKind, len: usize) -> Token {
        let span = self.span();
        let start = self.pos;
        for _ in 0..len {
            self.advance();
        }
        Token {
            kind,
            text: self.text_since(start),
            span,
            position: 0,
        }
    }

    fn read_char(&mut self, kind: TokenKind) -> Token {
        self.read_fixed(kind, 1)
    }

    fn read_newline(&mut self) -> Token {
        let len = if self.peek() == Some('\r') && self.peek_at(1) == Some('\n') {
            2
        } else {
            1
        };
        self.read_fixed(TokenKind::Whitespace, len)
    }

    fn read_blanks(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
        Token {
            kind: TokenKind::Whitespace,
            text: self.text_since(start),
            span,
            position: 0,
        }
    }

    fn read_line_comment(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        while !matches!(self.peek(), None | Some('\n' | '\r')) {
            self.advance();
        }
        Token {
            kind: TokenKind::Comment,
            text: self.text_since(start),
            span,
            position: 0,
        }
    }

    fn read_block_comment(&mut self) -> Result<Token, LexError> {
        let span = self.span();
        let start = self.pos;
        self.advance(); // skip /
        self.advance(); // skip *

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedComment,
                        span,
                    });
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }

        Ok(Token {
            kind: TokenKind::Comment,
            text: self.text_since(start),
            span,
            position: 0,
        })
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let span = self.span();
        let start = self.pos;
        self.advance(); // skip opening quote

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString { quote },
                        span,
                    });
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }

        Ok(Token {
            kind: TokenKind::String,
            text: self.text_since(start),
            span,
            position: 0,
        })
    }

    fn read_question(&mut self) -> Token {
        match (self.peek_at(1), self.peek_at(2)) {
            (Some('-'), Some('>')) => self.read_fixed(TokenKind::Other, 3),
            (Some('?' | '>'), _) => self.read_fixed(TokenKind::Other, 2),
            _ => self.read_char(TokenKind::Question),
        }
    }

    /// `<?php`, `<?=`, or a bare `<?`.
    fn read_open_tag(&mut self) -> Token {
        let rest: String = self.input[self.pos + 2..]
            .iter()
            .take(3)
            .collect::<String>()
            .to_ascii_lowercase();
        let len = if rest == "php" {
            5
        } else if rest.starts_with('=') {
            3
        } else {
            2
        };
        self.read_fixed(TokenKind::Other, len)
    }

    fn read_word(&mut self, previous: &[Token]) -> Token {
        let span = self.span();
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.advance();
        }
        let text = self.text_since(start);

        // `$obj->default` and `Foo::CASE` are member names
        let member_access = previous
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Whitespace)
            .is_some_and(|t| matches!(t.text.as_str(), "->" | "?->" | "::"));

        let kind = if member_access {
            TokenKind::Word
        } else {
            keyword_kind(&text).unwrap_or(TokenKind::Word)
        };

        Token {
            kind,
            text,
            span,
            position: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("should tokenize")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn switch_header() {
        let stream = tokenize("switch ($x) {").expect("should tokenize");
        let texts: Vec<_> = stream.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["switch", " ", "(", "$x", ")", " ", "{"]);
        assert_eq!(stream[0].kind, TokenKind::Switch);
        assert_eq!(stream[3].kind, TokenKind::Word);
        assert_eq!(stream[6].kind, TokenKind::OpenBrace);
    }

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(
            kinds("CASE Default BREAK"),
            [
                TokenKind::Case,
                TokenKind::Whitespace,
                TokenKind::Default,
                TokenKind::Whitespace,
                TokenKind::Break
            ]
        );
    }

    #[test]
    fn member_names_are_words() {
        let stream = tokenize("$a->default; Foo::CASE;").expect("should tokenize");
        assert_eq!(stream[2].text, "default");
        assert_eq!(stream[2].kind, TokenKind::Word);
        assert_eq!(stream[7].text, "CASE");
        assert_eq!(stream[7].kind, TokenKind::Word);
    }

    #[test]
    fn double_colon_is_not_a_colon() {
        assert!(!kinds("Foo::BAR").contains(&TokenKind::Colon));
    }

    #[test]
    fn ternary_question_mark() {
        assert_eq!(
            kinds("a ? b : c ?? d")
                .into_iter()
                .filter(|k| matches!(k, TokenKind::Question | TokenKind::Colon))
                .count(),
            2
        );
    }

    #[test]
    fn newline_is_its_own_token() {
        let stream = tokenize("a  \n  b").expect("should tokenize");
        let texts: Vec<_> = stream.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["a", "  ", "\n", "  ", "b"]);
        assert!(stream[2].is_newline());
        assert_eq!(stream[4].span, Span { line: 2, column: 3 });
    }

    #[test]
    fn crlf_newline() {
        let stream = tokenize("a\r\nb").expect("should tokenize");
        assert_eq!(stream[1].text, "\r\n");
        assert_eq!(stream[2].line(), 2);
        assert_eq!(stream[2].column(), 1);
    }

    #[test]
    fn tab_expands_to_tab_stop() {
        let stream = tokenize("\tcase").expect("should tokenize");
        assert_eq!(stream[1].column(), 5);
        let stream = tokenize("  \tcase").expect("should tokenize");
        assert_eq!(stream[1].column(), 5);
        let stream = tokenize_with_tab_width("\tcase", 0).expect("should tokenize");
        assert_eq!(stream[1].column(), 2);
    }

    #[test]
    fn comments() {
        let stream = tokenize("// one\n# two\n/* three\n four */x").expect("should tokenize");
        let comments: Vec<_> = stream
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .collect();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].text, "// one");
        assert_eq!(comments[2].line(), 3);
        assert_eq!(comments[2].end_line(), 4);
        assert_eq!(stream[stream.len() - 1].line(), 4);
    }

    #[test]
    fn strings_keep_quotes_and_escapes() {
        let stream = tokenize(r#"'it\'s' "a\"b""#).expect("should tokenize");
        assert_eq!(stream[0].text, r"'it\'s'");
        assert_eq!(stream[2].text, r#""a\"b""#);
        assert_eq!(stream[2].kind, TokenKind::String);
    }

    #[test]
    fn keyword_inside_string_is_string() {
        assert_eq!(kinds("'case'"), [TokenKind::String]);
    }

    #[test]
    fn open_tag() {
        let stream = tokenize("<?php\n").expect("should tokenize");
        assert_eq!(stream[0].text, "<?php");
        assert_eq!(stream[0].kind, TokenKind::Other);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("'open").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString { quote: '\'' });
        assert_eq!(err.span, Span { line: 1, column: 1 });
    }

    #[test]
    fn unterminated_comment() {
        let err = tokenize("x /* open").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.span.column, 3);
    }

    #[test]
    fn lossless() {
        let input = "\u{feff}<?php\r\nswitch ($a) {\n\tcase 'x': // c\n\t\tbreak;\n}\n";
        let stream = tokenize(input).expect("should tokenize");
        assert_eq!(stream.source(), input);
    }

    #[test]
    fn positions_match_indices() {
        let stream = tokenize("a b c").expect("should tokenize");
        for (i, token) in stream.iter().enumerate() {
            assert_eq!(token.position, i);
        }
    }
}
