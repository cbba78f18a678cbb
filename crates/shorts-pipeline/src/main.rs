//! Shorts clipper binary.

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shorts_pipeline::{shared_rng, Cli, Orchestrator, PipelineConfig, RunReport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    info!("Starting shorts-clipper");

    let mut config = PipelineConfig::from_env();
    cli.apply_overrides(&mut config);
    let request = cli.run_request(&config);

    let orchestrator = Orchestrator::from_config(&config, shared_rng(cli.seed))
        .context("Failed to set up the pipeline")?;

    let report = orchestrator.run(&request).await;
    print_summary(&report);

    Ok(())
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::builder()
        .with_default_directive(
            default_directive
                .parse()
                .with_context(|| format!("Invalid log level: {}", default_directive))?,
        )
        .from_env_lossy();

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("Run {} for \"{}\"", report.run_id, report.topic);
    println!(
        "  {} clips created ({} videos considered, {} skipped)",
        report.clip_count(),
        report.candidates_considered,
        report.candidates_skipped
    );
    for produced in &report.clips {
        println!(
            "  {} ({:.1}s) + {}",
            produced.clip.path.display(),
            produced.clip.duration,
            produced.metadata_path.display()
        );
    }
    if report.catalog_rejected {
        println!("  YouTube refused the search: check YOUTUBE_API_KEY and the daily quota");
    }
    if report.toolkit_unavailable {
        println!("  FFmpeg/ffprobe not found: install them to render clips");
    }
}
