#![allow(dead_code)]

use scopelint::{Config, Diagnostic, check_str};

/// Check with the default configuration.
pub fn check(input: &str) -> Vec<Diagnostic> {
    check_with(input, &Config::default())
}

pub fn check_with(input: &str, config: &Config) -> Vec<Diagnostic> {
    check_str(input, config).unwrap_or_else(|e| panic!("check failed: {e}\n--- input ---\n{input}"))
}

/// Short codes of the diagnostics, in report order.
pub fn codes(input: &str) -> Vec<String> {
    check(input).iter().map(|d| d.code.to_string()).collect()
}

/// Assert that `input` produces no diagnostics at all.
pub fn assert_clean(input: &str) {
    let diagnostics = check(input);
    assert!(
        diagnostics.is_empty(),
        "expected no diagnostics, got:\n{}\n--- input ---\n{input}",
        render(&diagnostics)
    );
}

/// Assert that exactly `expected` codes are reported, in order.
pub fn assert_codes(input: &str, expected: &[&str]) {
    let diagnostics = check(input);
    let got: Vec<String> = diagnostics.iter().map(|d| d.code.to_string()).collect();
    assert_eq!(
        got,
        expected,
        "\n{}\n--- input ---\n{input}",
        render(&diagnostics)
    );
}

pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
