//! `logwarden list`, `logwarden handle` and `logwarden rm` command handlers

use std::io::Write;

use serde::Serialize;

use logwarden_check::{ActionHistory, Check};
use logwarden_core::config::LogwardenConfig;

use crate::cli::{HistoryArgs, ListArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `list` command.
pub async fn execute_list(
    args: ListArgs,
    config: &LogwardenConfig,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let check = super::load_check(config).await?;
    let listing = list(&check, &args.filter.actions, args.highlight_uuid).await?;
    if args.highlight_uuid {
        colored::control::set_override(true);
    }
    writer.render(&listing)?;
    Ok(0)
}

/// Execute the `handle` command.
pub async fn execute_handle(
    args: HistoryArgs,
    config: &LogwardenConfig,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let check = super::load_check(config).await?;
    let report = handle(&check, &args).await?;
    writer.render(&report)?;
    Ok(0)
}

/// Execute the `rm` command.
pub async fn execute_remove(
    args: HistoryArgs,
    config: &LogwardenConfig,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let check = super::load_check(config).await?;
    let report = remove(&check, &args).await?;
    writer.render(&report)?;
    Ok(0)
}

pub async fn list(
    check: &Check,
    actions: &[String],
    highlight_uuid: bool,
) -> Result<HistoryListing, CliError> {
    Ok(HistoryListing {
        actions: check.list_history(actions).await?,
        highlight_uuid,
    })
}

pub async fn handle(check: &Check, args: &HistoryArgs) -> Result<HistoryUpdate, CliError> {
    let affected = check
        .handle_history(&args.filter.actions, &args.uuids, args.all)
        .await?;
    Ok(HistoryUpdate {
        operation: "handled",
        affected,
    })
}

pub async fn remove(check: &Check, args: &HistoryArgs) -> Result<HistoryUpdate, CliError> {
    let affected = check
        .remove_history(&args.filter.actions, &args.uuids, args.all)
        .await?;
    Ok(HistoryUpdate {
        operation: "removed",
        affected,
    })
}

/// History of the selected actions.
#[derive(Debug, Serialize)]
pub struct HistoryListing {
    pub actions: Vec<ActionHistory>,
    #[serde(skip)]
    pub highlight_uuid: bool,
}

impl Render for HistoryListing {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for (i, history) in self.actions.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            writeln!(
                w,
                "Action {} (status file {}, checkpoint {})",
                history.action.bold(),
                history.status_file.display(),
                history.status.timestamp
            )?;
            writeln!(
                w,
                "{:<36} {:<24} {:<8} {:>6} {:1} {:<16}",
                "UUID", "Date/Time", "State", "#", "Handled", "Rule"
            )?;

            for entry in &history.status.history {
                let uuid = format!("{:<36}", entry.uuid);
                let uuid = if self.highlight_uuid {
                    uuid.bold().to_string()
                } else {
                    uuid
                };
                writeln!(
                    w,
                    "{} {:<24} {:<8} {:>6} {:1} {:<16}",
                    uuid,
                    entry.timestamp,
                    entry.state.as_str(),
                    entry.counter,
                    if entry.handled { "Y" } else { "N" },
                    entry.rule
                )?;
                for line in &entry.lines {
                    writeln!(w, "   {line}")?;
                }
            }
        }
        Ok(())
    }
}

/// Result of a `handle` or `rm` command.
#[derive(Debug, Serialize)]
pub struct HistoryUpdate {
    pub operation: &'static str,
    pub affected: usize,
}

impl Render for HistoryUpdate {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{} {} history entries", self.affected, self.operation)
    }
}
