//! clvforge: Customer Lifetime Value prediction CLI
//!
//! Entrypoint that loads configuration and the model, then runs the
//! overview, prediction or analytics command.

use anyhow::{Context, Result};
use clap::Parser;
use clvforge::{
    analytics, load_model, logging, viz, AppConfig, Args, ClvReport, Command, PredictArgs,
    Scorer,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logger(&config.logging.level, &config.logging.format, args.verbose);
    debug!(?config, "Configuration resolved");

    match &args.command {
        Command::Overview => {
            print!("{}", analytics::render_overview());
            Ok(())
        }
        Command::Predict(predict) => run_prediction(&config, predict),
        Command::Analytics => run_analytics(&config),
    }
}

/// Configuration file (explicit or default), then CLI overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    if let Some(model) = &args.model {
        config.model.path = model.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.charts.output_dir = output_dir.clone();
    }

    Ok(config)
}

/// Score one customer and print the CLV report
fn run_prediction(config: &AppConfig, predict: &PredictArgs) -> Result<()> {
    let start_time = Instant::now();

    // Loaded once; a missing or corrupt artifact is fatal.
    let model = load_model(&config.model.path)
        .with_context(|| format!("Cannot serve predictions without {}", config.model.path.display()))?;
    let scorer = Scorer::with_mae(Arc::new(model), config.scoring.mae);

    let request = predict.to_request()?;
    info!(
        recency = request.recency,
        invoice_count = request.invoice_count,
        total_spend = request.total_spend,
        "Generating CLV report"
    );

    let report = ClvReport::generate(&scorer, request)?;
    println!("{}", report.render(predict.format)?);

    if config.charts.enabled && !predict.no_charts {
        let charts = viz::generate_prediction_charts(&report.contributions, &config.charts.output_dir)?;
        for chart in charts {
            info!(path = %chart.display(), "Chart written");
        }
    }

    info!(
        clv = report.result.clv,
        confidence = report.result.confidence_percent,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "CLV report complete"
    );

    Ok(())
}

/// Render the analytics charts
fn run_analytics(config: &AppConfig) -> Result<()> {
    println!("=== Business Insights & Visual Analysis ===\n");

    for (segment, share) in analytics::segment_shares() {
        println!("  {:<13} {:>5.1}%", segment, share);
    }

    let charts = viz::generate_analytics_report(&config.charts.output_dir)?;

    println!();
    for chart in &charts {
        println!("Chart saved to: {}", chart.display());
    }

    Ok(())
}
