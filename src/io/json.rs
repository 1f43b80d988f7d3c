use crate::config::ProblemParameters;
use crate::convergence::ErrorSummary;
use eyre::WrapErr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Loads problem parameters from a JSON file. Missing fields take their default values.
pub fn load_parameters_from_json_file(path: impl AsRef<Path>) -> eyre::Result<ProblemParameters> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("failed to open parameter file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("failed to parse parameters in {}", path.display()))
}

pub fn write_error_summary(summary: &ErrorSummary, path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = File::create(path).wrap_err_with(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .wrap_err_with(|| format!("failed to write error summary to {}", path.display()))
}
