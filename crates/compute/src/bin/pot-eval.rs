//! pot-eval: evaluate anomaly scores with a POT threshold and segment credit.
//!
//! Reads one or more JSON inputs (`init_score`, `score`, `label`), runs the
//! SPOT estimator per input and prints the evaluation reports as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};

use tsad_compute::input::load_inputs;
use tsad_compute::pipeline::{EvaluationSettings, Evaluator};
use tsad_compute::Spot;
use tsad_core::config::{self, level_for_dataset, Config};

// ── CLI ─────────────────────────────────────────────────────────────

/// Threshold anomaly scores with peaks-over-threshold and report segment-credited metrics.
#[derive(Parser, Debug)]
#[command(name = "pot-eval", version, about)]
struct Cli {
    /// JSON file with one input object or an array of them.
    #[arg(long, short)]
    input: PathBuf,

    /// Dataset preset for the initial level (SMAP, MSL, SMD-1, SMD-2, SMD-3, TELENOR).
    #[arg(long)]
    dataset: Option<String>,

    /// Initial-threshold probability; overrides the dataset preset.
    #[arg(long)]
    level: Option<f64>,

    /// Risk quantile.
    #[arg(long)]
    q: Option<f64>,

    /// Steps of early detection credit.
    #[arg(long)]
    advance: Option<usize>,

    /// Steps of late detection credit.
    #[arg(long)]
    delay: Option<usize>,

    /// Write reports here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the env config.
    fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(dataset) = &self.dataset {
            let Some(level) = level_for_dataset(dataset) else {
                bail!("unknown dataset preset: {dataset}");
            };
            config.pot.level = level;
            config.pot.dataset = Some(dataset.clone());
        }
        if let Some(level) = self.level {
            config.pot.level = level;
        }
        if let Some(q) = self.q {
            config.pot.risk_q = q;
        }
        if let Some(advance) = self.advance {
            config.tolerance.advance = advance;
        }
        if let Some(delay) = self.delay {
            config.tolerance.delay = delay;
        }
        config.validate()?;
        Ok(config)
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = cli.apply(Config::from_env())?;
    config.log_summary();

    let inputs = load_inputs(&cli.input)
        .with_context(|| format!("failed to load inputs from {}", cli.input.display()))?;
    info!(path = %cli.input.display(), count = inputs.len(), "loaded inputs");

    let settings = EvaluationSettings::from(&config);
    let evaluator = Evaluator::new(settings);
    let results = evaluator.evaluate_many(&inputs, || Spot::new(settings.risk_q));

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(report) => {
                info!(
                    name = input.display_name(),
                    f1 = report.metrics().f1,
                    threshold = report.threshold(),
                    "evaluated"
                );
                reports.push(serde_json::json!({
                    "name": input.name,
                    "report": report,
                }));
            }
            Err(e) => {
                error!(name = input.display_name(), error = %e, "evaluation failed");
                failures += 1;
                reports.push(serde_json::json!({
                    "name": input.name,
                    "error": e.to_string(),
                }));
            }
        }
    }

    let rendered = serde_json::to_string_pretty(&reports)?;
    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if failures > 0 {
        bail!("{failures} of {} evaluations failed", inputs.len());
    }
    Ok(())
}
