//! Mesh-refinement convergence studies.
use crate::config::ProblemConfig;
use crate::problem::DiffusionReactionProblem;
use crate::Error;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The resolutions $N$ of the standard refinement sequence. Each step halves $h = 1 / (N + 1)$.
pub const DEFAULT_RESOLUTIONS: [usize; 6] = [9, 19, 39, 79, 159, 319];

/// What to do when the linear solver fails for a resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPolicy {
    /// Abort the whole study with the solver error.
    #[default]
    Abort,
    /// Record the failure, omit the resolution from the table and continue.
    SkipFailed,
}

/// Errors for a single resolution.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub resolution: usize,
    /// Maximum element size.
    pub h: f64,
    pub l2_error: f64,
    pub h1_seminorm_error: f64,
}

/// A resolution for which the linear solver did not converge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedResolution {
    pub resolution: usize,
    pub iterations: usize,
    pub reason: String,
}

/// Summary of a study in a form suitable for storing as JSON.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub name: String,
    pub degree: usize,
    pub L2_errors: Vec<f64>,
    pub H1_seminorm_errors: Vec<f64>,
    /// Element sizes $h$ of the recorded resolutions.
    pub resolutions: Vec<f64>,
}

/// Error values for a sequence of resolutions, in order of refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceTable {
    degree: usize,
    records: Vec<ErrorRecord>,
    skipped: Vec<SkippedResolution>,
}

/// Empirical order $\log(e_c / e_f) / \log(h_c / h_f)$ between a coarse and a fine record.
///
/// Equals $\log_2(e_c / e_f)$ when the fine mesh halves $h$, and stays meaningful for other
/// refinement ratios, e.g. when a resolution between the two was skipped.
pub fn convergence_rate(coarse_error: f64, fine_error: f64, coarse_h: f64, fine_h: f64) -> f64 {
    (coarse_error / fine_error).ln() / (coarse_h / fine_h).ln()
}

impl ErrorRecord {
    /// $L^2$ and $H^1$ seminorm rates of `self` relative to the coarser record `coarse`.
    pub fn rates_from(&self, coarse: &ErrorRecord) -> (f64, f64) {
        (
            convergence_rate(coarse.l2_error, self.l2_error, coarse.h, self.h),
            convergence_rate(coarse.h1_seminorm_error, self.h1_seminorm_error, coarse.h, self.h),
        )
    }
}

impl ConvergenceTable {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn push(&mut self, record: ErrorRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedResolution] {
        &self.skipped
    }

    /// Rates between consecutive $L^2$ errors. Has one entry less than the table has records.
    ///
    /// See [`convergence_rate`].
    pub fn l2_rates(&self) -> Vec<f64> {
        self.records
            .windows(2)
            .map(|pair| pair[1].rates_from(&pair[0]).0)
            .collect()
    }

    pub fn h1_rates(&self) -> Vec<f64> {
        self.records
            .windows(2)
            .map(|pair| pair[1].rates_from(&pair[0]).1)
            .collect()
    }

    pub fn to_summary(&self, name: impl Into<String>) -> ErrorSummary {
        ErrorSummary {
            name: name.into(),
            degree: self.degree,
            L2_errors: self.records.iter().map(|r| r.l2_error).collect(),
            H1_seminorm_errors: self.records.iter().map(|r| r.h1_seminorm_error).collect(),
            resolutions: self.records.iter().map(|r| r.h).collect(),
        }
    }
}

impl Display for ConvergenceTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>6} {:>12} {:>12} {:>6} {:>12} {:>6}",
            "N", "h", "L2", "rate", "H1", "rate"
        )?;
        for (i, record) in self.records.iter().enumerate() {
            let rates = if i == 0 {
                None
            } else {
                Some(record.rates_from(&self.records[i - 1]))
            };
            let (l2_rate, h1_rate) = match rates {
                Some((l2, h1)) => (format!("{:.2}", l2), format!("{:.2}", h1)),
                None => ("-".to_string(), "-".to_string()),
            };
            writeln!(
                f,
                "{:>6} {:>12.4e} {:>12.4e} {:>6} {:>12.4e} {:>6}",
                record.resolution, record.h, record.l2_error, l2_rate, record.h1_seminorm_error, h1_rate
            )?;
        }
        for skipped in &self.skipped {
            writeln!(
                f,
                "{:>6} skipped after {} iterations: {}",
                skipped.resolution, skipped.iterations, skipped.reason
            )?;
        }
        Ok(())
    }
}

/// Solves a base configuration over a sequence of resolutions and records the errors.
#[derive(Debug, Clone)]
pub struct ConvergenceStudy {
    base: ProblemConfig,
    resolutions: Vec<usize>,
    policy: SweepPolicy,
}

impl ConvergenceStudy {
    /// A study over [`DEFAULT_RESOLUTIONS`] that aborts on solver failure.
    pub fn new(base: ProblemConfig) -> Self {
        Self {
            base,
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            policy: SweepPolicy::default(),
        }
    }

    pub fn with_resolutions(self, resolutions: impl Into<Vec<usize>>) -> Self {
        Self {
            resolutions: resolutions.into(),
            ..self
        }
    }

    pub fn with_policy(self, policy: SweepPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Runs the study. Each resolution gets a fresh mesh, space and linear system.
    ///
    /// Errors other than solver non-convergence always abort the study.
    pub fn run(&self) -> Result<ConvergenceTable, Error> {
        if self.base.exact_solution().is_none() {
            return Err(Error::MissingExactSolution);
        }

        let mut table = ConvergenceTable::new(self.base.degree());
        for &resolution in &self.resolutions {
            let config = self.base.clone().with_resolution(resolution);
            let problem = DiffusionReactionProblem::new(&config)?;
            let solution = match problem.solve() {
                Ok(solution) => solution,
                Err(Error::SolverNonConvergence {
                    iterations, reason, ..
                }) if self.policy == SweepPolicy::SkipFailed => {
                    warn!(
                        "Skipping resolution N = {}: solver did not converge after {} iterations ({})",
                        resolution, iterations, reason
                    );
                    table.skipped.push(SkippedResolution {
                        resolution,
                        iterations,
                        reason,
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };
            let errors = problem.compute_errors(&solution)?;
            let h = problem.space().mesh().max_element_size();
            info!(
                "N = {}, h = {:e}: L2 error {:e}, H1 seminorm error {:e}",
                resolution, h, errors.l2, errors.h1_seminorm
            );
            table.push(ErrorRecord {
                resolution,
                h,
                l2_error: errors.l2,
                h1_seminorm_error: errors.h1_seminorm,
            });
        }
        Ok(table)
    }
}
