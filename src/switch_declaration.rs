//! `switch` statement formatting.
//!
//! Walks the `case`/`default` branches of one switch and checks keyword
//! casing, label indentation and spacing, the terminator of each branch,
//! fallthrough comments, and that a `default` exists and comes last.
//! Nested switches are skipped here and checked on their own call.

use crate::checker::Checker;
use crate::config::Config;
use crate::diagnostic::{Branch, Code, Diagnostic, Edit};
use crate::scope::{Scope, ScopeTable};
use crate::stream::TokenStream;
use crate::token::TokenKind;

const NAME: &str = "SwitchDeclaration";

const WHITESPACE: &[TokenKind] = &[TokenKind::Whitespace];

/// Checks the layout of `switch` statements.
pub struct SwitchDeclaration;

impl Checker for SwitchDeclaration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested_kinds(&self) -> &'static [TokenKind] {
        &[TokenKind::Switch]
    }

    fn check(
        &self,
        stream: &TokenStream,
        scopes: &ScopeTable,
        position: usize,
        config: &Config,
    ) -> Vec<Diagnostic> {
        // without a matched body there is nothing to walk
        let Some(&switch) = scopes.scope_of(position) else {
            return Vec::new();
        };
        SwitchCheck::new(stream, scopes, switch, config.indent).run()
    }
}

struct SwitchCheck<'a> {
    stream: &'a TokenStream,
    scopes: &'a ScopeTable,
    switch: Scope,
    indent: usize,
    case_column: usize,
    break_column: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> SwitchCheck<'a> {
    fn new(stream: &'a TokenStream, scopes: &'a ScopeTable, switch: Scope, indent: usize) -> Self {
        let case_column = stream[switch.condition].column() + indent;
        Self {
            stream,
            scopes,
            switch,
            indent,
            case_column,
            break_column: case_column + indent,
            diagnostics: Vec::new(),
        }
    }

    fn error(&mut self, code: Code, message: String, position: usize) -> &mut Diagnostic {
        let diagnostic = Diagnostic::error(NAME, code, message, &self.stream[position]);
        self.push(diagnostic)
    }

    fn warning(&mut self, code: Code, message: String, position: usize) -> &mut Diagnostic {
        let diagnostic = Diagnostic::warning(NAME, code, message, &self.stream[position]);
        self.push(diagnostic)
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    fn run(mut self) -> Vec<Diagnostic> {
        let branches = self.branches();
        let mut case_count = 0usize;
        let mut found_default = false;

        for (i, &branch) in branches.iter().enumerate() {
            let kind = if self.stream[branch].kind == TokenKind::Default {
                if found_default {
                    self.error(
                        Code::DuplicateDefault,
                        "SWITCH statements must contain only one DEFAULT case".to_string(),
                        branch,
                    );
                }
                found_default = true;
                Branch::Default
            } else {
                case_count += 1;
                Branch::Case
            };

            self.check_label(branch, kind);

            let Some(&scope) = self.scopes.scope_of(branch) else {
                continue;
            };
            self.check_opener(branch, kind, scope);

            match kind {
                Branch::Default => self.check_default_end(branch, scope),
                Branch::Case => {
                    self.check_case_end(branch, scope);
                    let next_case = branches[i + 1..]
                        .iter()
                        .copied()
                        .find(|&b| self.stream[b].kind == TokenKind::Case);
                    if let Some(next) = next_case {
                        self.check_fallthrough(branch, scope, next);
                    }
                }
            }
        }

        let switch = self.switch.condition;
        if !found_default {
            self.error(
                Code::MissingDefault,
                "All SWITCH statements must contain a DEFAULT case".to_string(),
                switch,
            );
        }

        if self.stream[self.switch.closer].column() != self.stream[switch].column() {
            self.error(
                Code::CloseBraceAlign,
                "Closing brace of SWITCH statement must be aligned with SWITCH keyword"
                    .to_string(),
                self.switch.closer,
            );
        }

        if case_count == 0 {
            self.error(
                Code::MissingCase,
                "SWITCH statements must contain at least one CASE statement".to_string(),
                switch,
            );
        }

        self.diagnostics
    }

    /// Branch keywords of this switch in stream order.
    fn branches(&self) -> Vec<usize> {
        let mut branches = Vec::new();
        let mut from = self.switch.opener + 1;
        while let Some(branch) = self.find_next_branch(from) {
            branches.push(branch);
            from = branch + 1;
        }
        branches
    }

    /// Next `case`/`default` before the switch closer, jumping over
    /// nested switches at the point they are found.
    fn find_next_branch(&self, mut from: usize) -> Option<usize> {
        let kinds = &[TokenKind::Case, TokenKind::Default, TokenKind::Switch];
        while let Some(found) = self.stream.next_of_kind(kinds, from, Some(self.switch.closer)) {
            if self.stream[found].kind != TokenKind::Switch {
                return Some(found);
            }
            from = self.scopes.closer_of(found).map_or(found + 1, |closer| closer + 1);
        }
        None
    }

    /// Casing, indentation, and the space after `case`.
    fn check_label(&mut self, branch: usize, kind: Branch) {
        let token = &self.stream[branch];

        let expected = token.text.to_lowercase();
        if token.text != expected {
            let message = format!(
                "{} keyword must be lowercase; expected \"{expected}\" but found \"{}\"",
                kind.upper(),
                token.text
            );
            let fix = Edit::replace(token, expected);
            self.error(Code::NotLower(kind), message, branch).fix = Some(fix);
        }

        if self.stream[branch].column() != self.case_column {
            let message = format!(
                "{} keyword must be indented {} spaces from SWITCH keyword",
                kind.upper(),
                self.indent
            );
            self.error(Code::BranchIndent(kind), message, branch);
        }

        if kind == Branch::Case {
            let fix = match self.stream.get(branch + 1) {
                Some(next) if next.kind == TokenKind::Whitespace && next.text == " " => None,
                Some(next) if next.kind == TokenKind::Whitespace => Some(Edit::replace(next, " ")),
                Some(next) => Some(Edit::insert_before(next.position, " ")),
                None => None,
            };
            if let Some(fix) = fix {
                self.error(
                    Code::SpacingAfterCase,
                    "CASE keyword should be followed by a single space".to_string(),
                    branch,
                )
                .fix = Some(fix);
            }
        }
    }

    /// The label must end in a colon with nothing before it.
    fn check_opener(&mut self, branch: usize, kind: Branch, scope: Scope) {
        let opener = &self.stream[scope.opener];

        if opener.kind != TokenKind::Colon {
            let message = if opener.kind == TokenKind::OpenBrace {
                format!("{} statements must not be defined using curly braces", kind.upper())
            } else {
                format!(
                    "{} statements must end with a colon, found \"{}\"",
                    kind.upper(),
                    opener.text
                )
            };
            self.error(Code::WrongOpener(kind), message, branch);
            return;
        }

        // whitespace right after `case` belongs to the label spacing
        let before = scope.opener - 1;
        let first_allowed = if kind == Branch::Case { branch + 2 } else { branch + 1 };
        if before >= first_allowed && self.stream[before].kind == TokenKind::Whitespace {
            let fix = Edit::replace(&self.stream[before], "");
            let message = format!(
                "There must be no space before the colon in a {} statement",
                kind.upper()
            );
            self.error(Code::SpaceBeforeColon(kind), message, branch).fix = Some(fix);
        }
    }

    /// `default` must come last and must not `break`.
    fn check_default_end(&mut self, branch: usize, scope: Scope) {
        let closer = self.stream[scope.closer].kind;
        if closer == TokenKind::Break {
            self.error(
                Code::DefaultNoBreak,
                "The \"default\" statement must not have a \"break\" statement".to_string(),
                branch,
            );
        } else if scope.closer != self.switch.closer
            && !matches!(
                closer,
                TokenKind::Throw | TokenKind::Exit | TokenKind::Continue | TokenKind::Return
            )
        {
            // a default ending in throw/exit/continue/return may sit
            // anywhere, its terminator is its closer
            self.error(
                Code::DefaultNotLastInSwitch,
                "The \"default\" statement must be the last in the switch".to_string(),
                branch,
            );
        }
    }

    /// Placement of the terminator, checked once per shared closer.
    fn check_case_end(&mut self, branch: usize, scope: Scope) {
        let closer = scope.closer;
        if !self.stream[closer].kind.is_terminator()
            || !self.scopes.is_canonical_owner(branch, closer)
        {
            return;
        }

        if self.stream[closer].column() != self.break_column {
            let fix = self.indent_fix(closer, self.break_column);
            let message = format!(
                "Case breaking statement must be indented {} spaces from CASE keyword",
                self.indent
            );
            self.error(Code::BreakIndent, message, closer).fix = fix;
        }

        let closer_line = self.stream[closer].line();
        let previous_line = self
            .stream
            .previous_not_of_kind(WHITESPACE, closer - 1, Some(self.switch.condition + 1))
            .map_or(0, |p| self.stream[p].end_line());
        if previous_line + 1 != closer_line {
            self.warning(
                Code::SpacingBeforeBreak,
                "There should be no blank lines before case breaking statements".to_string(),
                closer,
            );
        }

        let end = Some(self.switch.closer);
        if let Some(semicolon) = self.stream.next_of_kind(&[TokenKind::Semicolon], closer, end) {
            if let Some(next) = self.stream.next_not_of_kind(WHITESPACE, semicolon + 1, end) {
                if self.stream[next].kind == TokenKind::Break {
                    self.error(
                        Code::FoundMultipleBreaksPerCase,
                        "Only one break statement is allowed per case".to_string(),
                        next,
                    );
                }
            }
        }

        let first = self
            .stream
            .next_not_of_kind(WHITESPACE, scope.opener + 1, Some(closer))
            .unwrap_or(closer);
        if self.stream[first].line() != self.stream[branch].line() + 1 {
            self.warning(
                Code::BlankLineAfterCase,
                "There should be no blank lines after CASE statements".to_string(),
                branch,
            );
        }
    }

    /// A case falling into the next `case` needs a comment on the line
    /// directly above it.
    fn check_fallthrough(&mut self, branch: usize, scope: Scope, next: usize) {
        let shares_closer = self
            .scopes
            .scope_of(next)
            .is_some_and(|next_scope| next_scope.closer == scope.closer);
        if !shares_closer {
            return;
        }

        let next_line = self.stream[next].line();
        let commented = self
            .stream
            .previous_of_kind(&[TokenKind::Comment], next - 1, Some(branch + 1))
            .is_some_and(|c| self.stream[c].end_line() + 1 == next_line);
        if !commented {
            self.error(
                Code::CaseWithoutBreakNoCommentFound,
                "If one case block has to pass control into another case block without \
                 having a break, there must be a comment about it in the code"
                    .to_string(),
                branch,
            );
        }
    }

    /// Shift a terminator that starts its line to `expected`. Too deep
    /// is only fixable when the indentation is plain spaces.
    fn indent_fix(&self, position: usize, expected: usize) -> Option<Edit> {
        if self.stream.first_on_line(position) != Some(position) {
            return None;
        }

        let actual = self.stream[position].column();
        if expected > actual {
            return Some(Edit::insert_before(position, " ".repeat(expected - actual)));
        }

        let excess = actual - expected;
        let indentation = self.stream.get(position.checked_sub(1)?)?;
        let plain_spaces = indentation.kind == TokenKind::Whitespace
            && !indentation.is_newline()
            && indentation.text.len() >= excess
            && indentation.text.bytes().all(|b| b == b' ');
        plain_spaces.then(|| Edit::trim_start(indentation.position, excess))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn check(input: &str) -> Vec<Diagnostic> {
        let stream = tokenize(input).expect("tokenize failed");
        let scopes = parse(&stream);
        let config = Config::default();
        stream
            .iter()
            .filter(|t| t.kind == TokenKind::Switch)
            .flat_map(|t| SwitchDeclaration.check(&stream, &scopes, t.position, &config))
            .collect()
    }

    fn codes(input: &str) -> Vec<String> {
        check(input).iter().map(|d| d.code.to_string()).collect()
    }

    #[test]
    fn well_formed_switch_is_clean() {
        let input = "\
switch ($x) {
    case 1:
        a();
        break;
    default:
        b();
}
";
        assert!(codes(input).is_empty(), "{:?}", codes(input));
    }

    #[test]
    fn empty_switch() {
        assert_eq!(codes("switch ($x) {\n}\n"), ["MissingDefault", "MissingCase"]);
    }

    #[test]
    fn unmatched_switch_is_skipped() {
        assert!(codes("switch ($x) {\n    case 1:\n").is_empty());
    }

    #[test]
    fn nested_switch_branches_belong_to_inner_switch() {
        let input = "\
switch ($a) {
    case 1:
        switch ($b) {
            case 2:
                x();
                break;
            default:
                y();
        }
        break;
    default:
        z();
}
";
        assert!(codes(input).is_empty(), "{:?}", codes(input));
    }

    #[test]
    fn too_deep_terminator_fix_trims_spaces() {
        let input = "\
switch ($x) {
    case 1:
        a();
          break;
    default:
        b();
}
";
        let diagnostics = check(input);
        assert_eq!(diagnostics.len(), 1);
        let fix = diagnostics[0].fix.as_ref().expect("fixable");
        assert_eq!(fix.delete_len, 2);
        assert_eq!(fix.insert, "");
    }

    #[test]
    fn terminator_sharing_a_line_is_not_fixable() {
        let input = "\
switch ($x) {
    case 1:
        a(); break;
    default:
        b();
}
";
        let diagnostics = check(input);
        let indent = diagnostics
            .iter()
            .find(|d| d.code == Code::BreakIndent)
            .expect("BreakIndent");
        assert!(!indent.fixable());
    }
}
