//! Test utilities shared by the crates in the `fem1d` workspace.

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

/// Approx assertion for scalars, with either an absolute or a relative tolerance.
#[macro_export]
macro_rules! assert_scalar_approx_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let (x, y): (f64, f64) = ($x, $y);
        let absdiff = (x - y).abs();
        if !(absdiff <= $tol) {
            panic!(
                "assert_scalar_approx_eq failed: left = {:e}, right = {:e}, absdiff = {:e}, abstol = {:e}",
                x, y, absdiff, $tol
            );
        }
    }};
    ($x:expr, $y:expr, reltol = $tol:expr) => {{
        let (x, y): (f64, f64) = ($x, $y);
        let reldiff = (x - y).abs() / f64::max(x.abs(), y.abs());
        if !(reldiff <= $tol) {
            panic!(
                "assert_scalar_approx_eq failed: left = {:e}, right = {:e}, reldiff = {:e}, reltol = {:e}",
                x, y, reldiff, $tol
            );
        }
    }};
}

/// Returns `n` equally spaced points covering the closed interval `[a, b]`.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n)
            .map(|i| a + (b - a) * (i as f64) / ((n - 1) as f64))
            .collect(),
    }
}
