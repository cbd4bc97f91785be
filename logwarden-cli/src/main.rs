use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use logwarden_cli::cli::{Cli, Commands};
use logwarden_cli::commands;
use logwarden_cli::error::CliError;
use logwarden_cli::logging::init_tracing;
use logwarden_cli::output::OutputWriter;
use logwarden_core::CheckState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            println!("UNKNOWN: invalid command line");
            return exit_code(CheckState::Unknown.exit_code());
        }
    };

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            println!("UNKNOWN: {e}");
            e.exit_code()
        }
    };
    exit_code(code)
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    let config = commands::load_config(&cli).await?;
    let _guard = init_tracing(&config.general).map_err(|e| CliError::Logging(e.to_string()))?;
    logwarden_core::metrics::describe_all();

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args, &config, &writer).await,
        Commands::List(args) => commands::history::execute_list(args, &config, &writer).await,
        Commands::Handle(args) => commands::history::execute_handle(args, &config, &writer).await,
        Commands::Rm(args) => commands::history::execute_remove(args, &config, &writer).await,
        Commands::Init(args) => commands::init::execute(args, &config, &writer).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    result
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(3))
}
