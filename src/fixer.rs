//! Applies the edits carried by diagnostics and re-checks until the
//! source is stable.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::Error;
use crate::checker::Registry;
use crate::config::Config;
use crate::diagnostic::{Diagnostic, Edit};
use crate::lexer::tokenize_with_tab_width;
use crate::parser::parse;
use crate::stream::TokenStream;

/// Upper bound on check/apply rounds in [`fix_str`].
pub const MAX_FIX_PASSES: usize = 8;

/// Result of rendering one round of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub source: String,
    pub applied: usize,
    /// Edits left out because their token already had one, or because
    /// they did not fit the token they addressed.
    pub skipped: usize,
}

/// Render `stream` with the fixes of `diagnostics` applied.
///
/// At most one edit is applied per token; the first one wins.
#[must_use]
pub fn apply_fixes(stream: &TokenStream, diagnostics: &[Diagnostic]) -> FixOutcome {
    let mut edits: BTreeMap<usize, &Edit> = BTreeMap::new();
    let mut skipped = 0;

    for edit in diagnostics.iter().filter_map(|d| d.fix.as_ref()) {
        let fits = stream
            .get(edit.position)
            .is_some_and(|t| t.text.chars().count() >= edit.delete_len);
        if !fits {
            skipped += 1;
            continue;
        }
        match edits.entry(edit.position) {
            Entry::Vacant(entry) => {
                entry.insert(edit);
            }
            Entry::Occupied(_) => skipped += 1,
        }
    }

    let mut out = String::new();
    for token in stream {
        let Some(edit) = edits.get(&token.position) else {
            out.push_str(&token.text);
            continue;
        };
        out.push_str(&edit.insert);
        let rest = token
            .text
            .char_indices()
            .nth(edit.delete_len)
            .map_or("", |(i, _)| &token.text[i..]);
        out.push_str(rest);
    }

    FixOutcome {
        source: out,
        applied: edits.len(),
        skipped,
    }
}

/// Result of [`fix_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    /// The fixed source.
    pub source: String,
    /// Rounds that applied at least one edit.
    pub passes: usize,
    /// Edits applied over all rounds.
    pub applied: usize,
    /// Diagnostics of the final source.
    pub remaining: Vec<Diagnostic>,
}

/// Check `input`, apply every available fix, and repeat until nothing
/// fixable is left, nothing applies, or [`MAX_FIX_PASSES`] is reached.
pub fn fix_str(input: &str, config: &Config) -> Result<FixReport, Error> {
    let registry = Registry::builtin();
    let mut source = input.to_string();
    let mut passes = 0;
    let mut applied = 0;

    loop {
        let stream = tokenize_with_tab_width(&source, config.tab_width)?;
        let diagnostics = registry.run(&stream, &parse(&stream), config)?;

        if passes == MAX_FIX_PASSES || !diagnostics.iter().any(Diagnostic::fixable) {
            return Ok(FixReport {
                source,
                passes,
                applied,
                remaining: diagnostics,
            });
        }

        let outcome = apply_fixes(&stream, &diagnostics);
        if outcome.applied == 0 {
            return Ok(FixReport {
                source,
                passes,
                applied,
                remaining: diagnostics,
            });
        }

        source = outcome.source;
        applied += outcome.applied;
        passes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Code;
    use crate::lexer::tokenize;

    fn fixable(stream: &TokenStream, position: usize, edit: Edit) -> Diagnostic {
        Diagnostic::error("Test", Code::BreakIndent, "m", &stream[position]).with_fix(edit)
    }

    #[test]
    fn applies_edits_per_token() {
        let stream = tokenize("CASE  1").expect("tokenize failed");
        let diagnostics = [
            fixable(&stream, 0, Edit::replace(&stream[0], "case")),
            fixable(&stream, 1, Edit::replace(&stream[1], " ")),
        ];
        let outcome = apply_fixes(&stream, &diagnostics);
        assert_eq!(outcome.source, "case 1");
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn second_edit_on_a_token_is_skipped() {
        let stream = tokenize("    break;").expect("tokenize failed");
        let diagnostics = [
            fixable(&stream, 0, Edit::trim_start(0, 2)),
            fixable(&stream, 0, Edit::insert_before(0, "x")),
        ];
        let outcome = apply_fixes(&stream, &diagnostics);
        assert_eq!(outcome.source, "  break;");
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn oversized_and_out_of_range_edits_are_skipped() {
        let stream = tokenize("  a").expect("tokenize failed");
        let diagnostics = [
            fixable(&stream, 0, Edit::trim_start(0, 5)),
            fixable(&stream, 1, Edit::insert_before(9, "x")),
        ];
        let outcome = apply_fixes(&stream, &diagnostics);
        assert_eq!(outcome.source, "  a");
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn fix_str_converges() {
        let input = "\
switch ($x) {
    CASE  1 :
        a();
            break;
    Default :
        b();
}
";
        let report = fix_str(input, &Config::default()).expect("fix failed");
        assert_eq!(
            report.source,
            "\
switch ($x) {
    case 1:
        a();
        break;
    default:
        b();
}
"
        );
        assert!(report.remaining.is_empty(), "{:?}", report.remaining);
        assert!(report.passes >= 1);
    }

    #[test]
    fn clean_input_is_untouched() {
        let input = "switch ($x) {\n    case 1:\n        break;\n    default:\n        a();\n}\n";
        let report = fix_str(input, &Config::default()).expect("fix failed");
        assert_eq!(report.source, input);
        assert_eq!(report.passes, 0);
        assert_eq!(report.applied, 0);
    }

    #[test]
    fn lex_errors_propagate() {
        let result = fix_str("switch ($x) { case 'a", &Config::default());
        assert!(matches!(result, Err(Error::Lex(_))));
    }
}
