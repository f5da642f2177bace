//! Persisting and printing metric records.
//!
//! Records are appended to `<result_dir>/result_<dataset>.csv`. The header row is written
//! only when the file is created, so repeated runs of different methods accumulate in one
//! file per dataset.

use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use tabled::{builder::Builder, settings::Style};

use crate::{
    error::{SegEvalError, SegEvalResult},
    metrics::{MetricRecord, RECORD_HEADERS},
};

/// Path of the record file of `dataset` inside `result_dir`.
pub fn record_path(result_dir: &Path, dataset: &str) -> PathBuf {
    result_dir.join(format!("result_{dataset}.csv"))
}

/// The fields of one record row: the method name followed by 4-decimal values.
pub fn record_fields(record: &MetricRecord) -> Vec<String> {
    std::iter::once(record.method.clone())
        .chain(record.values().into_iter().map(|value| format!("{value:.4}")))
        .collect()
}

/// Appends `record` to its dataset file, creating the directory and header as needed.
///
/// # Errors
///
/// Returns [`SegEvalError::ReportWriteFailed`] if the directory or file cannot be written.
pub fn append_record(result_dir: &Path, record: &MetricRecord) -> SegEvalResult<PathBuf> {
    fs::create_dir_all(result_dir).map_err(|source| SegEvalError::ReportWriteFailed {
        path: result_dir.to_path_buf(),
        source,
    })?;

    let path = record_path(result_dir, &record.dataset);
    write_record(&path, record).map_err(|source| SegEvalError::ReportWriteFailed {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "appended record");
    Ok(path)
}

fn write_record(path: &Path, record: &MetricRecord) -> io::Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_new {
        writer.write_record(RECORD_HEADERS)?;
    }
    writer.write_record(record_fields(record))?;
    writer.flush()
}

/// Renders `records` as a table with one row per dataset and 3-decimal values.
pub fn render_table(records: &[MetricRecord]) -> String {
    let mut builder = Builder::default();
    builder.push_record(std::iter::once("dataset").chain(RECORD_HEADERS[1..].iter().copied()));
    for record in records {
        builder.push_record(
            std::iter::once(record.dataset.clone())
                .chain(record.values().into_iter().map(|value| format!("{value:.3}"))),
        );
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
