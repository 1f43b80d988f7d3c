mod non_smooth;
mod smooth;

use fem1d::convergence::ConvergenceTable;
use fem1d::io::csv::write_convergence_csv;
use fem1d::io::json::write_error_summary;
use std::path::PathBuf;

/// Stores the results of a study for later analysis.
pub fn export_table(name: &str, table: &ConvergenceTable) {
    let base_path = PathBuf::from("data/convergence_tests").join(name);
    write_convergence_csv(table, base_path.join("convergence.csv")).expect("Failed to write convergence table");
    write_error_summary(&table.to_summary(name), base_path.join("summary.json"))
        .expect("Failed to write error summary");
}

pub fn assert_errors_decrease_monotonically(table: &ConvergenceTable) {
    for pair in table.records().windows(2) {
        assert!(
            pair[1].l2_error < pair[0].l2_error,
            "L2 error does not decrease from N = {} to N = {}",
            pair[0].resolution,
            pair[1].resolution
        );
        assert!(
            pair[1].h1_seminorm_error < pair[0].h1_seminorm_error,
            "H1 seminorm error does not decrease from N = {} to N = {}",
            pair[0].resolution,
            pair[1].resolution
        );
    }
}
