//! Settings shared by every checker in a run.

use crate::diagnostic::Diagnostic;
use crate::lexer::DEFAULT_TAB_WIDTH;

/// Width of one indentation level used when none is configured.
pub const DEFAULT_INDENT: usize = 4;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("indent must be at least 1 column")]
    ZeroIndent,
}

/// Checker configuration shared by every checker in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Columns per indentation level.
    pub indent: usize,
    /// Columns a tab advances to; 0 counts a tab as one column.
    pub tab_width: usize,
    /// Codes whose diagnostics are dropped. Accepts short codes
    /// (`MissingDefault`) and full codes (`SwitchDeclaration.MissingDefault`).
    pub suppressed: Vec<String>,
}

impl Config {
    /// Default configuration: 4-column indent, 4-column tabs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            tab_width: DEFAULT_TAB_WIDTH,
            suppressed: Vec::new(),
        }
    }

    /// Set the indentation width.
    #[must_use]
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the tab width used for column computation.
    #[must_use]
    pub const fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Drop diagnostics with this code.
    #[must_use]
    pub fn suppress(mut self, code: &str) -> Self {
        self.suppressed.push(code.to_string());
        self
    }

    /// Check the configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroIndent` when `indent` is 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.indent == 0 {
            return Err(ConfigError::ZeroIndent);
        }
        Ok(())
    }

    /// Whether `diagnostic` is suppressed by its short or full code.
    #[must_use]
    pub fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        if self.suppressed.is_empty() {
            return false;
        }
        let short = diagnostic.code.to_string();
        let full = diagnostic.full_code();
        self.suppressed.iter().any(|c| *c == short || *c == full)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
