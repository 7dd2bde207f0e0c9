//! Check results and their text/JSON rendering.

use std::fmt::Write as _;

use serde::Serialize;

use crate::checks::CheckKind;
use crate::error::Error;
use crate::types::Violation;

/// Output format for `check` and `watch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON report on stdout.
    Json,
    /// One PASS/FAIL line per check with violations listed underneath.
    Text,
}

/// Outcome of one check: passed when no violations were collected.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Which check ran.
    pub check: CheckKind,
    /// Every violation found, across all documents.
    pub violations: Vec<Violation>,
}

/// Outcome of a whole run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Reports in the order the checks ran.
    pub checks: Vec<CheckReport>,
    /// Number of documents that were parsed and checked.
    pub documents: usize,
    /// Build output root as given.
    pub root: String,
}

impl CheckReport {
    /// No violations.
    pub fn passed(&self) -> bool {
        return self.violations.is_empty();
    }
}

impl RunReport {
    /// Number of checks with at least one violation.
    pub fn failed(&self) -> usize {
        return self.checks.iter().filter(|c| return !c.passed()).count();
    }

    /// Every check passed.
    pub fn passed(&self) -> bool {
        return self.checks.iter().all(CheckReport::passed);
    }

    /// Render in the requested format.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if JSON serialization fails.
    pub fn render(&self, format: Format) -> Result<String, Error> {
        return match format {
            Format::Json => Ok(serde_json::to_string_pretty(self)?),
            Format::Text => Ok(self.render_text()),
        };
    }

    /// `PASS`/`FAIL` per check, failing checks followed by their violations,
    /// then a one-line summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for report in &self.checks {
            let name = report.check.name();
            if report.passed() {
                let _ = writeln!(out, "PASS  {name}");
                continue;
            }
            let count = report.violations.len();
            let _ = writeln!(out, "FAIL  {name} ({count})");
            for violation in &report.violations {
                let _ = writeln!(out, "  {violation}");
            }
        }

        let failed = self.failed();
        let passed = self.checks.len().saturating_sub(failed);
        let documents = self.documents;
        let _ = write!(out, "\n{passed} passed, {failed} failed ({documents} documents in {})\n", self.root);
        return out;
    }
}
