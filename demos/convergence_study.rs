//! Runs a convergence study and writes the results to `data/demos/convergence_study`.
//!
//! Usage: `cargo run --example convergence_study [parameters.prm | parameters.json]`
//!
//! Without arguments, the smooth benchmark problem is solved with linear and quadratic elements.
use fem1d::cases;
use fem1d::config::ProblemConfig;
use fem1d::convergence::{ConvergenceStudy, SweepPolicy};
use fem1d::io::csv::write_convergence_csv;
use fem1d::io::json::{load_parameters_from_json_file, write_error_summary};
use fem1d::io::prm::load_prm_file;
use fem1d::io::vtk::SolutionDataSetBuilder;
use fem1d::problem::DiffusionReactionProblem;
use std::path::{Path, PathBuf};

fn load_config(path: &Path) -> eyre::Result<ProblemConfig> {
    let parameters = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_parameters_from_json_file(path)?,
        _ => load_prm_file(path)?,
    };
    Ok(ProblemConfig::from_parameters(&parameters)?)
}

fn run_study(name: &str, config: ProblemConfig, output_dir: &Path) -> eyre::Result<()> {
    let problem = DiffusionReactionProblem::new(&config)?;
    let solution = problem.solve()?;
    SolutionDataSetBuilder::from_solution(problem.space(), &solution.coefficients)
        .with_exact_solution(config.exact_solution())
        .try_export(output_dir.join(format!("{}_solution.vtk", name)))?;

    if config.exact_solution().is_none() {
        println!("{}: no exact solution given, wrote solution only", name);
        return Ok(());
    }

    let table = ConvergenceStudy::new(config)
        .with_policy(SweepPolicy::SkipFailed)
        .run()?;
    println!("{} (degree {})", name, table.degree());
    println!("{}", table);

    write_convergence_csv(&table, output_dir.join(format!("{}_convergence.csv", name)))?;
    write_error_summary(&table.to_summary(name), output_dir.join(format!("{}_summary.json", name)))?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    let output_dir = PathBuf::from("data/demos/convergence_study");

    if let Some(path) = std::env::args().nth(1) {
        let path = PathBuf::from(path);
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string());
        run_study(&name, load_config(&path)?, &output_dir)
    } else {
        for degree in [1, 2] {
            run_study(&format!("smooth_degree_{}", degree), cases::smooth(degree), &output_dir)?;
        }
        Ok(())
    }
}
