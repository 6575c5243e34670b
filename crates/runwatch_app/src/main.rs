use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use runwatch_app::cli::{Cli, Command};
use runwatch_app::render::render_runs;
use runwatch_app::{logging, watch_run, Confirmation, MonitorConfig, WatchOptions};
use runwatch_engine::{CreateRunRequest, JobClient, ReqwestJobClient};
use runwatch_logging::{monitor_error, monitor_info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log_destination, cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            monitor_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = MonitorConfig::load_from(&cli.config)?;
    config.apply_env();
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }
    config.validate()?;
    monitor_info!("Using backend {}", config.api_base_url);

    let client = Arc::new(
        ReqwestJobClient::new(config.client_settings()).context("failed to build HTTP client")?,
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let result = runtime.block_on(execute(cli.command, client));
    // An interrupted prompt leaves a blocking stdin read behind.
    runtime.shutdown_background();
    result
}

async fn execute(command: Command, client: Arc<ReqwestJobClient>) -> anyhow::Result<ExitCode> {
    let mut stdout = io::stdout();
    match command {
        Command::Watch {
            id,
            publish,
            yes,
            expand,
        } => {
            let options = WatchOptions {
                publish,
                confirmation: if yes {
                    Confirmation::AssumeYes
                } else {
                    Confirmation::Prompt
                },
                expand_steps: expand,
            };
            let outcome = watch_run(client, id, options, &mut stdout).await?;
            monitor_info!("Watch of run {} ended: {:?}", id, outcome);
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Command::Trigger {
            instrument,
            timeframe,
            watch,
        } => {
            let request = CreateRunRequest {
                instrument,
                timeframe,
            };
            let created = client
                .create_run(&request)
                .await
                .with_context(|| format!("failed to queue run for {}", request.instrument))?;
            println!(
                "Queued run #{} for {} {}",
                created.id, request.instrument, request.timeframe
            );
            if !watch {
                return Ok(ExitCode::SUCCESS);
            }
            let outcome = watch_run(client, created.id, WatchOptions::default(), &mut stdout).await?;
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Command::Runs { limit } => {
            let runs = client
                .list_runs(limit)
                .await
                .context("failed to list runs")?;
            print!("{}", render_runs(&runs));
            Ok(ExitCode::SUCCESS)
        }
    }
}
