//! `logwarden check` command handler

use logwarden_core::config::LogwardenConfig;
use logwarden_search::ElasticsearchClient;

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::OutputWriter;
use crate::plugin::PluginOutput;

/// Execute the `check` command and return the plugin exit code.
pub async fn execute(
    args: CheckArgs,
    config: &LogwardenConfig,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    let check = super::load_check(config).await?;
    let client = ElasticsearchClient::new(&config.elasticsearch)?;
    let keep_alive = keep_alive(config);

    tracing::info!(
        base_url = %client.base_url(),
        actions = ?args.filter.actions,
        "starting check"
    );

    let report = check.run(&client, &args.filter.actions, &keep_alive).await;
    let output = PluginOutput::new(&report);
    writer.render(&output)?;

    tracing::info!(state = %output.state(), results = report.results().len(), "check finished");
    Ok(output.exit_code())
}

/// PIT keep-alive, the request timeout as an Elasticsearch duration.
fn keep_alive(config: &LogwardenConfig) -> String {
    format!("{}s", config.elasticsearch.timeout_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_alive_uses_timeout() {
        let mut config = LogwardenConfig::default();
        assert_eq!(keep_alive(&config), "120s");
        config.elasticsearch.timeout_secs = 30;
        assert_eq!(keep_alive(&config), "30s");
    }
}
