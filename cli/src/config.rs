//! Run settings of the `segeval` binary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use segeval_burn::EvaluatorConfig;
use serde::{Deserialize, Serialize};

/// Datasets of the standard polyp segmentation benchmark.
pub const DEFAULT_DATASETS: [&str; 5] = [
    "CVC-300",
    "CVC-ClinicDB",
    "Kvasir",
    "CVC-ColonDB",
    "ETIS-LaribPolypDB",
];

/// Where to read masks from, where to write records to and how to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Ground-truth root; masks live at `<gt_root>/<dataset>/mask/`.
    pub gt_root: PathBuf,
    /// Prediction root; predictions live at `<pred_root>/<dataset>/`.
    pub pred_root: PathBuf,
    /// Directory receiving `result_<dataset>.csv`.
    pub result_path: PathBuf,
    /// Datasets to evaluate, in order.
    pub datasets: Vec<String>,
    /// Method name written to each record. Defaults to the last component of `pred_root`.
    pub method: Option<String>,
    /// Engine parameters.
    pub evaluator: EvaluatorConfig,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            gt_root: PathBuf::from("./data/TestDataset"),
            pred_root: PathBuf::from("./results/OurNet/"),
            result_path: PathBuf::from("./EvaluateResults/OurNet/"),
            datasets: DEFAULT_DATASETS.iter().map(|&name| name.to_owned()).collect(),
            method: None,
            evaluator: EvaluatorConfig::new(),
        }
    }
}

impl EvaluationSettings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Method name of the run.
    pub fn method_name(&self) -> String {
        self.method
            .clone()
            .unwrap_or_else(|| segeval_burn::dataset::method_name(&self.pred_root))
    }
}
