//! Parameter files in the `set key = value` format of deal.II's `ParameterHandler`.
//!
//! Each non-empty line has the form `set <key> = <value>`. Everything after a `#` is a comment.
//! Keys that are not set keep their default values from [`ProblemParameters::default`].
//!
//! Recognized keys: `mu`, `f`, `sigma`, `exact_solution`, `exact_derivative`, `degree`, `N`,
//! `node_distribution`, `dirichlet`, `dirichlet_left`, `dirichlet_right`, `tolerance`,
//! `max_iterations`, `preconditioner` and `error_quadrature_points`. An empty value for
//! `exact_solution` or `sigma` unsets it.
use crate::config::{DirichletData, Preconditioner, ProblemParameters};
use crate::element::NodeDistribution;
use eyre::{eyre, WrapErr};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub fn load_prm_file(path: impl AsRef<Path>) -> eyre::Result<ProblemParameters> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read parameter file {}", path.display()))?;
    parse_prm(&text).wrap_err_with(|| format!("invalid parameter file {}", path.display()))
}

pub fn parse_prm(text: &str) -> eyre::Result<ProblemParameters> {
    let mut parameters = ProblemParameters::default();
    let mut dirichlet_choice: Option<String> = None;
    let mut dirichlet_left = None;
    let mut dirichlet_right = None;

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let assignment = content
            .strip_prefix("set ")
            .ok_or_else(|| eyre!("line {}: expected 'set <key> = <value>'", line_number))?;
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| eyre!("line {}: missing '=' in assignment", line_number))?;
        let key = key.trim();
        let value = value.trim();

        let result = match key {
            "mu" => {
                parameters.mu = value.to_string();
                Ok(())
            }
            "f" => {
                parameters.f = value.to_string();
                Ok(())
            }
            "sigma" => {
                parameters.sigma = non_empty(value);
                Ok(())
            }
            "exact_solution" => {
                parameters.exact_solution = non_empty(value);
                Ok(())
            }
            "exact_derivative" => {
                parameters.exact_derivative = non_empty(value);
                Ok(())
            }
            "degree" => parse_value(value).map(|degree| parameters.degree = degree),
            "N" => parse_value(value).map(|resolution| parameters.resolution = resolution),
            "node_distribution" => parse_node_distribution(value).map(|d| parameters.node_distribution = d),
            "dirichlet" => {
                dirichlet_choice = Some(value.to_string());
                Ok(())
            }
            "dirichlet_left" => parse_value(value).map(|v| dirichlet_left = Some(v)),
            "dirichlet_right" => parse_value(value).map(|v| dirichlet_right = Some(v)),
            "tolerance" => parse_value(value).map(|tol| parameters.solver.tolerance = tol),
            "max_iterations" => parse_value(value).map(|max_iter| parameters.solver.max_iterations = Some(max_iter)),
            "preconditioner" => parse_preconditioner(value).map(|p| parameters.solver.preconditioner = p),
            "error_quadrature_points" => {
                parse_value(value).map(|num_points| parameters.error_quadrature_points = Some(num_points))
            }
            _ => Err(eyre!("unknown parameter '{}'", key)),
        };
        result.wrap_err_with(|| format!("line {}", line_number))?;
    }

    let has_values = dirichlet_left.is_some() || dirichlet_right.is_some();
    if let Some(choice @ ("homogeneous" | "exact_solution")) = dirichlet_choice.as_deref() {
        if has_values {
            return Err(eyre!(
                "dirichlet_left and dirichlet_right require dirichlet = values, got dirichlet = {}",
                choice
            ));
        }
    }

    parameters.dirichlet = match dirichlet_choice.as_deref() {
        None if dirichlet_left.is_none() && dirichlet_right.is_none() => None,
        None | Some("values") => Some(DirichletData::Values {
            left: dirichlet_left.unwrap_or(0.0),
            right: dirichlet_right.unwrap_or(0.0),
        }),
        Some("homogeneous") => Some(DirichletData::Homogeneous),
        Some("exact_solution") => Some(DirichletData::ExactSolution),
        Some(other) => {
            return Err(eyre!(
                "invalid Dirichlet choice '{}', expected one of homogeneous, exact_solution, values",
                other
            ))
        }
    };

    Ok(parameters)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_value<T>(value: &str) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .wrap_err_with(|| format!("failed to parse value '{}'", value))
}

fn parse_node_distribution(value: &str) -> eyre::Result<NodeDistribution> {
    match value {
        "gauss_lobatto" => Ok(NodeDistribution::GaussLobatto),
        "equispaced" => Ok(NodeDistribution::Equispaced),
        _ => Err(eyre!("invalid node distribution '{}'", value)),
    }
}

fn parse_preconditioner(value: &str) -> eyre::Result<Preconditioner> {
    match value {
        "none" => Ok(Preconditioner::None),
        "jacobi" => Ok(Preconditioner::Jacobi),
        _ => Err(eyre!("invalid preconditioner '{}'", value)),
    }
}
