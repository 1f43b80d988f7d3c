use crate::convergence::ConvergenceTable;
use eyre::WrapErr;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Header of convergence files.
pub const CONVERGENCE_CSV_HEADER: &str = "h,eL2,eH1";

/// Formats the table as comma-separated values, one row per recorded resolution.
pub fn convergence_csv_string(table: &ConvergenceTable) -> String {
    let mut output = String::new();
    output.push_str(CONVERGENCE_CSV_HEADER);
    output.push('\n');
    for record in table.records() {
        // Writing to a String cannot fail
        let _ = writeln!(
            output,
            "{:e},{:e},{:e}",
            record.h, record.l2_error, record.h1_seminorm_error
        );
    }
    output
}

pub fn write_convergence_csv(table: &ConvergenceTable, path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, convergence_csv_string(table))
        .wrap_err_with(|| format!("failed to write convergence table to {}", path.display()))
}
