mod common;

use scopelint::{
    Code, Config, MAX_FIX_PASSES, Registry, apply_fixes, check_str, fix_str, parse, tokenize,
};

#[test]
fn casing_fix_removes_not_lower() {
    let input = "switch ($x) {\n    CASE 1:\n        break;\n    DEFAULT:\n        a();\n}\n";
    let stream = tokenize(input).expect("tokenize failed");
    let diagnostics = Registry::builtin()
        .run(&stream, &parse(&stream), &Config::default())
        .expect("check failed");
    let outcome = apply_fixes(&stream, &diagnostics);
    assert_eq!(outcome.applied, 2);

    let after = check_str(&outcome.source, &Config::default()).expect("check failed");
    assert!(
        !after
            .iter()
            .any(|d| matches!(d.code, Code::NotLower(_))),
        "{}",
        common::render(&after)
    );
    assert_eq!(
        outcome.source,
        "switch ($x) {\n    case 1:\n        break;\n    default:\n        a();\n}\n"
    );
}

#[test]
fn fixes_are_idempotent() {
    let input = "\
switch ($x) {
    case  1 :
        a();
    break;
    default:
        b();
}
";
    let first = fix_str(input, &Config::default()).expect("fix failed");
    let second = fix_str(&first.source, &Config::default()).expect("fix failed");
    assert_eq!(first.source, second.source);
    assert_eq!(second.applied, 0);
    assert!(first.remaining.is_empty(), "{}", common::render(&first.remaining));
}

#[test]
fn unfixable_problems_remain() {
    let input = "switch ($x) {\n    CASE 1:\n        break;\n}\n";
    let report = fix_str(input, &Config::default()).expect("fix failed");
    assert_eq!(report.passes, 1);
    let codes: Vec<String> = report.remaining.iter().map(|d| d.code.to_string()).collect();
    assert_eq!(codes, ["MissingDefault"]);
}

#[test]
fn tab_indented_terminator_is_left_alone() {
    // too deep behind a tab: no safe trim
    let input = "switch ($x) {\n    case 1:\n\t\t\tbreak;\n    default:\n        a();\n}\n";
    let report = fix_str(input, &Config::default()).expect("fix failed");
    assert_eq!(report.source, input);
    assert!(report
        .remaining
        .iter()
        .any(|d| d.code == Code::BreakIndent && !d.fixable()));
}

#[test]
fn pass_limit() {
    assert_eq!(MAX_FIX_PASSES, 8);
    let input = "switch ($x) {\n    CASE 1:\n        break;\n    default:\n        a();\n}\n";
    let report = fix_str(input, &Config::default()).expect("fix failed");
    assert!(report.passes <= MAX_FIX_PASSES);
}

#[test]
fn suppressed_fixes_are_not_applied() {
    let input = "switch ($x) {\n    CASE 1:\n        break;\n    default:\n        a();\n}\n";
    let report = fix_str(input, &Config::new().suppress("caseNotLower")).expect("fix failed");
    assert_eq!(report.source, input);
    assert!(report.remaining.is_empty());
}
