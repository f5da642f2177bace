use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use segeval_cli::{
    backend::{evaluation_device, SelectedBackend, BACKEND_NAME},
    run_evaluation, EvaluationSettings,
};
use segeval_burn::report::render_table;

/// Evaluate predicted segmentation masks against ground truth.
#[derive(Parser, Debug)]
#[command(name = "segeval", version)]
struct Args {
    /// JSON settings file; the flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ground-truth root directory (masks at <gt-path>/<dataset>/mask/).
    #[arg(long)]
    gt_path: Option<PathBuf>,

    /// Prediction root directory (maps at <pred-path>/<dataset>/).
    #[arg(long)]
    pred_path: Option<PathBuf>,

    /// Directory receiving result_<dataset>.csv.
    #[arg(long)]
    result_path: Option<PathBuf>,

    /// Comma-separated dataset names.
    #[arg(long, value_delimiter = ',')]
    datasets: Option<Vec<String>>,

    /// Method name written to each record.
    #[arg(long)]
    method: Option<String>,

    /// Number of thresholds swept from 1.0 down to 0.0.
    #[arg(long)]
    thresholds: Option<usize>,

    /// Evaluate images one at a time instead of on the worker pool.
    #[arg(long)]
    sequential: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_settings(self) -> Result<EvaluationSettings> {
        let mut settings = match &self.config {
            Some(path) => EvaluationSettings::from_json(path)?,
            None => EvaluationSettings::default(),
        };

        if let Some(gt_path) = self.gt_path {
            settings.gt_root = gt_path;
        }
        if let Some(pred_path) = self.pred_path {
            settings.pred_root = pred_path;
        }
        if let Some(result_path) = self.result_path {
            settings.result_path = result_path;
        }
        if let Some(datasets) = self.datasets {
            settings.datasets = datasets;
        }
        if self.method.is_some() {
            settings.method = self.method;
        }
        if let Some(thresholds) = self.thresholds {
            settings.evaluator.num_thresholds = thresholds;
        }
        if self.sequential {
            settings.evaluator.parallel = false;
        }

        if settings.datasets.is_empty() {
            anyhow::bail!("No datasets to evaluate");
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let settings = args.into_settings()?;
    let device = evaluation_device();
    tracing::info!(backend = BACKEND_NAME, ?device, "using backend");

    let records = run_evaluation::<SelectedBackend>(&settings, &device)?;

    println!("{}", render_table(&records));
    Ok(())
}
