//! `logwarden init` command handler

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use logwarden_check::Check;
use logwarden_check::status::format_timestamp;
use logwarden_core::config::LogwardenConfig;

use crate::cli::InitArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `init` command.
pub async fn execute(
    args: InitArgs,
    config: &LogwardenConfig,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let check = super::load_check(config).await?;
    let report = init_checkpoints(&check, &args.filter.actions, args.timestamp).await?;
    writer.render(&report)?;
    Ok(0)
}

/// Set the checkpoint of the selected actions, defaulting to now.
pub async fn init_checkpoints(
    check: &Check,
    actions: &[String],
    timestamp: Option<String>,
) -> Result<InitReport, CliError> {
    let timestamp = timestamp.unwrap_or_else(|| format_timestamp(Utc::now()));
    let updated = check.init_checkpoint(actions, &timestamp).await?;
    tracing::info!(timestamp = %timestamp, updated, "checkpoint initialized");
    Ok(InitReport { timestamp, updated })
}

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub timestamp: String,
    pub updated: usize,
}

impl Render for InitReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "Checkpoint set to {} for {} action(s)",
            self.timestamp, self.updated
        )
    }
}
