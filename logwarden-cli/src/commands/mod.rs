//! Command handlers -- one module per subcommand

pub mod check;
pub mod history;
pub mod init;

use logwarden_check::Check;
use logwarden_core::config::{DEFAULT_CONFIG_PATH, LogwardenConfig};

use crate::cli::Cli;
use crate::error::CliError;

/// Load the effective configuration: file, then env, then CLI flags.
///
/// An explicitly given `--config` path must exist; the default path is
/// optional.
pub async fn load_config(cli: &Cli) -> Result<LogwardenConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => LogwardenConfig::load(path).await?,
        None => LogwardenConfig::load_or_default(DEFAULT_CONFIG_PATH).await?,
    };
    apply_cli_overrides(cli, &mut config);
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config)
}

fn apply_cli_overrides(cli: &Cli, config: &mut LogwardenConfig) {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(action_file) = &cli.action_file {
        config.check.action_file = action_file.clone();
    }
    if let Some(host) = &cli.host {
        config.elasticsearch.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.elasticsearch.port = port;
    }
    if let Some(timeout) = cli.timeout {
        config.elasticsearch.timeout_secs = timeout;
    }
}

/// Load the action definition file named by the configuration.
pub async fn load_check(config: &LogwardenConfig) -> Result<Check, CliError> {
    tracing::debug!(path = %config.check.action_file, "loading action file");
    Ok(Check::load(&config.check.action_file).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_replace_file_values() {
        let cli = Cli::try_parse_from([
            "logwarden",
            "--host",
            "es02",
            "--port",
            "9300",
            "--timeout",
            "15",
            "--log-level",
            "debug",
            "--action-file",
            "/tmp/a.yaml",
            "check",
        ])
        .expect("parse succeeded");

        let mut config = LogwardenConfig::default();
        apply_cli_overrides(&cli, &mut config);

        assert_eq!(config.elasticsearch.host, "es02");
        assert_eq!(config.elasticsearch.port, 9300);
        assert_eq!(config.elasticsearch.timeout_secs, 15);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.check.action_file, "/tmp/a.yaml");
    }

    #[test]
    fn test_absent_overrides_keep_defaults() {
        let cli = Cli::try_parse_from(["logwarden", "check"]).expect("parse succeeded");
        let mut config = LogwardenConfig::default();
        apply_cli_overrides(&cli, &mut config);
        assert_eq!(config.elasticsearch.host, "localhost");
        assert_eq!(config.elasticsearch.port, 9200);
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_an_error() {
        let cli = Cli::try_parse_from(["logwarden", "-c", "/nonexistent/logwarden.toml", "check"])
            .expect("parse succeeded");
        assert!(load_config(&cli).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_override_fails_validation() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logwarden.toml");
        std::fs::write(&path, "[elasticsearch]\nhost = \"es01\"\n").expect("write config");

        let cli = Cli::try_parse_from([
            "logwarden",
            "-c",
            path.to_str().expect("utf-8 path"),
            "--port",
            "0",
            "check",
        ])
        .expect("parse succeeded");
        let err = load_config(&cli).await.expect_err("port 0 is invalid");
        assert!(matches!(err, CliError::Config(_)));
    }
}
