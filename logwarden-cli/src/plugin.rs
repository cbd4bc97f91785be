//! Monitoring plugin output
//!
//! Renders a [`Report`] the way Nagios-compatible monitoring systems read it:
//!
//! ```text
//! WARNING: auth/errors, web/5xx | 'errors'=6c;@5:;@20:;; 'auth_lines'=1003c;;;;
//! Value 6 for rule errors in search auth exceeds threshold >=5
//!    excerpt line
//! ...
//! ```
//!
//! The first line lists the messages of every result at the worst state.
//! Long texts of all results follow in report order. The process exit code
//! is the worst state's ordinal.

use std::io::Write;

use serde::Serialize;

use logwarden_check::{PerfDatum, Report};
use logwarden_core::CheckState;

use crate::output::Render;

/// Plugin output for one `check` invocation.
#[derive(Debug, Serialize)]
pub struct PluginOutput<'a> {
    state: CheckState,
    exit_code: i32,
    #[serde(flatten)]
    report: &'a Report,
}

impl<'a> PluginOutput<'a> {
    pub fn new(report: &'a Report) -> Self {
        let state = report.worst_state();
        Self {
            state,
            exit_code: state.exit_code(),
            report,
        }
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// The first output line.
    pub fn status_line(&self) -> String {
        let messages: Vec<&str> = self
            .report
            .results()
            .iter()
            .filter(|r| r.state == self.state)
            .map(|r| r.message.as_str())
            .collect();

        let mut line = if messages.is_empty() {
            format!("{}: no results", self.state)
        } else {
            format!("{}: {}", self.state, messages.join(", "))
        };

        if !self.report.perf().is_empty() {
            let perf: Vec<String> = self.report.perf().iter().map(format_perf).collect();
            line.push_str(" | ");
            line.push_str(&perf.join(" "));
        }
        line
    }
}

impl Render for PluginOutput<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", self.status_line())?;
        for result in self.report.results() {
            if let Some(text) = &result.long_text {
                writeln!(w, "{text}")?;
            }
        }
        Ok(())
    }
}

/// `'label'=value[uom];[warn];[crit];;`
pub fn format_perf(datum: &PerfDatum) -> String {
    format!(
        "'{}'={}{};{};{};;",
        datum.label.replace('\'', "''"),
        datum.value,
        datum.uom,
        datum.warn.as_deref().unwrap_or(""),
        datum.crit.as_deref().unwrap_or(""),
    )
}
