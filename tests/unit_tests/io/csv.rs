use fem1d::convergence::{ConvergenceTable, ErrorRecord, ErrorSummary};
use fem1d::io::csv::{convergence_csv_string, write_convergence_csv};
use fem1d::io::json::write_error_summary;
use std::fs;

fn example_table() -> ConvergenceTable {
    let mut table = ConvergenceTable::new(1);
    table.push(ErrorRecord {
        resolution: 9,
        h: 0.1,
        l2_error: 4e-3,
        h1_seminorm_error: 0.2,
    });
    table.push(ErrorRecord {
        resolution: 19,
        h: 0.05,
        l2_error: 1e-3,
        h1_seminorm_error: 0.1,
    });
    table
}

#[test]
fn csv_has_header_and_one_row_per_resolution() {
    let csv = convergence_csv_string(&example_table());
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines, vec!["h,eL2,eH1", "1e-1,4e-3,2e-1", "5e-2,1e-3,1e-1"]);
}

#[test]
fn csv_values_parse_back() {
    let csv = convergence_csv_string(&example_table());
    let rows: Vec<Vec<f64>> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows, vec![vec![0.1, 4e-3, 0.2], vec![0.05, 1e-3, 0.1]]);
}

#[test]
fn csv_and_summary_are_written_to_disk() {
    let table = example_table();
    let csv_path = "data/unit_tests/io/convergence.csv";
    write_convergence_csv(&table, csv_path).unwrap();
    assert_eq!(fs::read_to_string(csv_path).unwrap(), convergence_csv_string(&table));

    let summary_path = "data/unit_tests/io/summary.json";
    let summary = table.to_summary("smooth");
    write_error_summary(&summary, summary_path).unwrap();
    let read_back: ErrorSummary = serde_json::from_str(&fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(read_back, summary);
    assert_eq!(read_back.L2_errors, vec![4e-3, 1e-3]);
    assert_eq!(read_back.resolutions, vec![0.1, 0.05]);
}
