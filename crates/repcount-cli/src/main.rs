//! repcount binary.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use repcount_cli::{execute, init_tracing, AnalysisRequest, Cli, CliConfig, Commands};
use repcount_models::AssessmentOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = CliConfig::from_env();
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout_secs(secs);
    }

    init_tracing(config.log_format)?;

    let request = match cli.command {
        Commands::Schema => {
            let schema = schemars::schema_for!(AssessmentOutcome);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Analyze { video, assessment } => AnalysisRequest::video(video, assessment),
        Commands::Replay {
            landmarks,
            assessment,
        } => AnalysisRequest::landmarks(landmarks, assessment),
    };

    let metrics_handle = if cli.print_metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install metrics recorder")?,
        )
    } else {
        None
    };

    info!("Starting repcount");
    let outcome = execute(request, &config).await;

    let document = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{document}");

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(if outcome.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
