//! Preconditioned Conjugate Gradient for symmetric positive definite operators.
use core::fmt;
use nalgebra::{ClosedAdd, ClosedMul, DVector, DVectorView, DVectorViewMut, RealField, Scalar};
use nalgebra_sparse::ops::serial::spmm_csr_dense;
use nalgebra_sparse::ops::Op;
use nalgebra_sparse::CsrMatrix;
use num::{One, Zero};
use std::error::Error;

use crate::csr::diag_iter;

/// An operator $y = A x$.
pub trait LinearOperator<T: Scalar> {
    fn apply(&self, y: DVectorViewMut<T>, x: DVectorView<T>) -> Result<(), Box<dyn Error>>;
}

impl<'a, T, A> LinearOperator<T> for &'a A
where
    T: Scalar,
    A: ?Sized + LinearOperator<T>,
{
    fn apply(&self, y: DVectorViewMut<T>, x: DVectorView<T>) -> Result<(), Box<dyn Error>> {
        <A as LinearOperator<T>>::apply(self, y, x)
    }
}

impl<T> LinearOperator<T> for CsrMatrix<T>
where
    T: Scalar + Zero + One + ClosedMul + ClosedAdd,
{
    fn apply(&self, mut y: DVectorViewMut<T>, x: DVectorView<T>) -> Result<(), Box<dyn Error>> {
        if self.nrows() != y.len() || self.ncols() != x.len() {
            return Err(Box::from("dimension mismatch in CSR operator"));
        }
        spmm_csr_dense(T::zero(), &mut y, T::one(), Op::NoOp(self), Op::NoOp(&x));
        Ok(())
    }
}

pub struct IdentityOperator;

impl<T: Scalar> LinearOperator<T> for IdentityOperator {
    fn apply(&self, mut y: DVectorViewMut<T>, x: DVectorView<T>) -> Result<(), Box<dyn Error>> {
        y.copy_from(&x);
        Ok(())
    }
}

/// A diagonal operator $y = D x$.
///
/// Mostly used as a Jacobi preconditioner, in which case $D$ holds the reciprocals of the
/// diagonal entries of the system matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalOperator<T: Scalar> {
    diagonal: DVector<T>,
}

impl<T: Scalar> DiagonalOperator<T> {
    pub fn from_diagonal(diagonal: DVector<T>) -> Self {
        Self { diagonal }
    }

    pub fn diagonal(&self) -> &DVector<T> {
        &self.diagonal
    }
}

impl<T: RealField + Copy> DiagonalOperator<T> {
    /// Constructs the Jacobi preconditioner $D = \mathrm{diag}(A)^{-1}$.
    ///
    /// Returns `IndefinitePreconditioner` if any diagonal entry is not strictly positive,
    /// since then `A` cannot be positive definite either.
    pub fn jacobi(matrix: &CsrMatrix<T>) -> Result<Self, SolveErrorKind> {
        let mut diagonal = DVector::zeros(matrix.nrows());
        for (d_i, a_ii) in diagonal.iter_mut().zip(diag_iter(matrix)) {
            if a_ii <= T::zero() {
                return Err(SolveErrorKind::IndefinitePreconditioner);
            }
            *d_i = a_ii.recip();
        }
        Ok(Self { diagonal })
    }
}

impl<T> LinearOperator<T> for DiagonalOperator<T>
where
    T: Scalar + ClosedMul,
{
    fn apply(&self, mut y: DVectorViewMut<T>, x: DVectorView<T>) -> Result<(), Box<dyn Error>> {
        if self.diagonal.len() != x.len() || x.len() != y.len() {
            return Err(Box::from("dimension mismatch in diagonal operator"));
        }
        for ((y_i, x_i), d_i) in y.iter_mut().zip(x.iter()).zip(self.diagonal.iter()) {
            *y_i = x_i.clone() * d_i.clone();
        }
        Ok(())
    }
}

pub trait CgStoppingCriterion<T: Scalar> {
    /// Called by CG at the start of a new solve.
    fn reset(&self, _a: &dyn LinearOperator<T>, _x: DVectorView<T>, _b: DVectorView<T>) {}

    /// Decides convergence from the current iterate and residual.
    ///
    /// Between restarts, `residual` is the residual updated recursively by CG. Whenever this
    /// returns `true` for a recursive residual, CG recomputes the true residual $b - A x$ and asks
    /// again before accepting the iterate.
    fn has_converged(
        &self,
        a: &dyn LinearOperator<T>,
        x: DVectorView<T>,
        b: DVectorView<T>,
        b_norm: T,
        iteration: usize,
        residual: DVectorView<T>,
    ) -> Result<bool, SolveErrorKind>;
}

/// Relative residual tolerance $\norm{b - A x} \leq \mathrm{tol} \cdot \norm{b}$.
///
/// Since CG confirms convergence against the true residual, a tolerance below the accuracy
/// attainable in floating point for the given system cannot be met, and the solve then ends
/// with `MaxIterationsReached`.
#[derive(Debug, Clone)]
pub struct RelativeResidualCriterion<T: Scalar> {
    tol: T,
}

impl<T: Scalar + Zero> RelativeResidualCriterion<T> {
    pub fn new(tol: T) -> Self {
        Self { tol }
    }

    pub fn tolerance(&self) -> &T {
        &self.tol
    }
}

impl Default for RelativeResidualCriterion<f64> {
    fn default() -> Self {
        Self::new(1e-8)
    }
}

impl Default for RelativeResidualCriterion<f32> {
    fn default() -> Self {
        Self::new(1e-4)
    }
}

impl<T> CgStoppingCriterion<T> for RelativeResidualCriterion<T>
where
    T: RealField + Copy,
{
    fn has_converged(
        &self,
        _a: &dyn LinearOperator<T>,
        _x: DVectorView<T>,
        _b: DVectorView<T>,
        b_norm: T,
        _iteration: usize,
        residual: DVectorView<T>,
    ) -> Result<bool, SolveErrorKind> {
        Ok(residual.norm() <= self.tol * b_norm)
    }
}

/// Vectors reused between solves with the same [`ConjugateGradient`] instance.
#[derive(Debug, Clone)]
#[allow(non_snake_case)]
struct CgWorkspace<T: Scalar> {
    r: DVector<T>,
    z: DVector<T>,
    p: DVector<T>,
    Ap: DVector<T>,
}

#[allow(non_snake_case)]
struct Buffers<'a, T: Scalar> {
    r: &'a mut DVector<T>,
    z: &'a mut DVector<T>,
    p: &'a mut DVector<T>,
    Ap: &'a mut DVector<T>,
}

impl<T: Scalar + Zero> Default for CgWorkspace<T> {
    fn default() -> Self {
        Self {
            r: DVector::zeros(0),
            z: DVector::zeros(0),
            p: DVector::zeros(0),
            Ap: DVector::zeros(0),
        }
    }
}

impl<T: Scalar + Zero> CgWorkspace<T> {
    fn prepare_buffers(&mut self, dim: usize) -> Buffers<T> {
        self.r.resize_vertically_mut(dim, T::zero());
        self.z.resize_vertically_mut(dim, T::zero());
        self.p.resize_vertically_mut(dim, T::zero());
        self.Ap.resize_vertically_mut(dim, T::zero());
        Buffers {
            r: &mut self.r,
            z: &mut self.z,
            p: &mut self.p,
            Ap: &mut self.Ap,
        }
    }
}

/// Preconditioned Conjugate Gradient, configured with the builder methods.
///
/// ```ignore
/// let output = ConjugateGradient::new()
///     .with_operator(&matrix)
///     .with_preconditioner(&jacobi)
///     .with_stopping_criterion(RelativeResidualCriterion::new(1e-10))
///     .with_max_iter(1000)
///     .solve_with_guess(&b, &mut x)?;
/// ```
#[derive(Debug)]
pub struct ConjugateGradient<T, A, P, Criterion>
where
    T: Scalar,
{
    workspace: CgWorkspace<T>,
    operator: A,
    preconditioner: P,
    stopping_criterion: Criterion,
    max_iter: Option<usize>,
}

impl<T: Scalar + Zero> ConjugateGradient<T, (), IdentityOperator, ()> {
    pub fn new() -> Self {
        Self {
            workspace: CgWorkspace::default(),
            operator: (),
            preconditioner: IdentityOperator,
            stopping_criterion: (),
            max_iter: None,
        }
    }
}

impl<T: Scalar + Zero> Default for ConjugateGradient<T, (), IdentityOperator, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, P, Criterion> ConjugateGradient<T, (), P, Criterion> {
    pub fn with_operator<A>(self, operator: A) -> ConjugateGradient<T, A, P, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator,
            preconditioner: self.preconditioner,
            stopping_criterion: self.stopping_criterion,
            max_iter: self.max_iter,
        }
    }
}

impl<T: Scalar, A, P, Criterion> ConjugateGradient<T, A, P, Criterion> {
    pub fn with_preconditioner<P2>(self, preconditioner: P2) -> ConjugateGradient<T, A, P2, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator: self.operator,
            preconditioner,
            stopping_criterion: self.stopping_criterion,
            max_iter: self.max_iter,
        }
    }

    /// Without an iteration budget, a solve with an unattainable tolerance does not terminate.
    pub fn with_max_iter(self, max_iter: usize) -> Self {
        Self {
            max_iter: Some(max_iter),
            ..self
        }
    }
}

impl<T: Scalar, A, P> ConjugateGradient<T, A, P, ()> {
    pub fn with_stopping_criterion<Criterion>(self, stopping_criterion: Criterion) -> ConjugateGradient<T, A, P, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator: self.operator,
            preconditioner: self.preconditioner,
            stopping_criterion,
            max_iter: self.max_iter,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum SolveErrorKind {
    OperatorError(Box<dyn Error>),
    PreconditionerError(Box<dyn Error>),
    StoppingCriterionError(Box<dyn Error>),
    IndefiniteOperator,
    IndefinitePreconditioner,
    MaxIterationsReached { max_iter: usize },
}

impl fmt::Display for SolveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorError(err) => write!(f, "failed to apply operator: {}", err),
            Self::PreconditionerError(err) => write!(f, "failed to apply preconditioner: {}", err),
            Self::StoppingCriterionError(err) => write!(f, "failed to evaluate stopping criterion: {}", err),
            Self::IndefiniteOperator => write!(f, "operator appears to be indefinite"),
            Self::IndefinitePreconditioner => write!(f, "indefinite preconditioner"),
            Self::MaxIterationsReached { max_iter } => write!(f, "maximum number of iterations ({}) reached", max_iter),
        }
    }
}

impl std::error::Error for SolveErrorKind {}

#[non_exhaustive]
#[derive(Debug)]
pub struct SolveError<T> {
    pub output: CgOutput<T>,
    pub kind: SolveErrorKind,
}

impl<T> SolveError<T> {
    fn new(output: CgOutput<T>, kind: SolveErrorKind) -> Self {
        Self { output, kind }
    }
}

impl<T> fmt::Display for SolveError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CG failed after {} iterations: {}", self.output.num_iterations, self.kind)
    }
}

impl<T: fmt::Debug> std::error::Error for SolveError<T> {}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct CgOutput<T> {
    /// Number of updates made to the solution vector.
    pub num_iterations: usize,
    /// Norm of the residual when the solver returned.
    ///
    /// After a successful solve this is the true residual $\norm{b - A x}$. When the solve fails
    /// it may be the recursively updated residual.
    pub residual_norm: T,
    pub rhs_norm: T,
    /// Number of times the recursive residual was replaced by the true residual.
    pub num_restarts: usize,
}

impl<T: RealField + Copy> CgOutput<T> {
    /// Ratio $\norm{r} / \norm{b}$, or zero for a vanishing right-hand side.
    pub fn relative_residual(&self) -> T {
        if self.rhs_norm == T::zero() {
            T::zero()
        } else {
            self.residual_norm / self.rhs_norm
        }
    }
}

/// r = b - Ax
fn compute_residual<T, A>(r: &mut DVector<T>, a: &A, x: DVectorView<T>, b: DVectorView<T>) -> Result<(), Box<dyn Error>>
where
    T: RealField + Copy,
    A: LinearOperator<T>,
{
    a.apply((&mut *r).into(), x)?;
    r.zip_apply(&b, |ax_i, b_i| *ax_i = b_i - *ax_i);
    Ok(())
}

impl<T, A, P, Criterion> ConjugateGradient<T, A, P, Criterion>
where
    T: RealField + Copy,
    A: LinearOperator<T>,
    P: LinearOperator<T>,
    Criterion: CgStoppingCriterion<T>,
{
    pub fn solve_with_guess<'b>(
        &mut self,
        b: impl Into<DVectorView<'b, T>>,
        x: impl Into<DVectorViewMut<'b, T>>,
    ) -> Result<CgOutput<T>, SolveError<T>> {
        self.solve_with_guess_(b.into(), x.into())
    }

    #[allow(non_snake_case)]
    fn solve_with_guess_(&mut self, b: DVectorView<T>, mut x: DVectorViewMut<T>) -> Result<CgOutput<T>, SolveError<T>> {
        use SolveErrorKind::*;
        assert_eq!(b.len(), x.len());

        let b_norm = b.norm();
        let mut output = CgOutput {
            num_iterations: 0,
            residual_norm: T::zero(),
            rhs_norm: b_norm,
            num_restarts: 0,
        };

        if b_norm == T::zero() {
            x.fill(T::zero());
            return Ok(output);
        }

        let operator = &self.operator;
        let preconditioner = &self.preconditioner;
        let stopping_criterion = &self.stopping_criterion;
        stopping_criterion.reset(operator, (&x).into(), b);

        let Buffers { r, z, p, Ap } = self.workspace.prepare_buffers(x.len());

        if let Err(err) = compute_residual(r, operator, (&x).into(), b) {
            return Err(SolveError::new(output, OperatorError(err)));
        }
        // The residual is exact initially and after every restart
        let mut residual_is_exact = true;

        // z = Pr
        if let Err(err) = preconditioner.apply((&mut *z).into(), (&*r).into()) {
            return Err(SolveError::new(output, PreconditionerError(err)));
        }
        p.copy_from(&*z);
        let mut zTr = z.dot(&*r);

        loop {
            output.residual_norm = r.norm();
            let mut has_converged = stopping_criterion
                .has_converged(operator, (&x).into(), b, b_norm, output.num_iterations, (&*r).into())
                .map_err(|kind| SolveError::new(output.clone(), kind))?;

            if has_converged && !residual_is_exact {
                // The recursive residual drifts from b - Ax, so confirm convergence with the true
                // residual and restart from it if it is not yet small enough
                if let Err(err) = compute_residual(r, operator, (&x).into(), b) {
                    return Err(SolveError::new(output, OperatorError(err)));
                }
                residual_is_exact = true;
                output.residual_norm = r.norm();
                has_converged = stopping_criterion
                    .has_converged(operator, (&x).into(), b, b_norm, output.num_iterations, (&*r).into())
                    .map_err(|kind| SolveError::new(output.clone(), kind))?;

                if !has_converged {
                    output.num_restarts += 1;
                    if let Err(err) = preconditioner.apply((&mut *z).into(), (&*r).into()) {
                        return Err(SolveError::new(output, PreconditionerError(err)));
                    }
                    p.copy_from(&*z);
                    zTr = z.dot(&*r);
                }
            }

            if has_converged {
                break;
            } else if let Some(max_iter) = self.max_iter {
                if output.num_iterations >= max_iter {
                    return Err(SolveError::new(output, MaxIterationsReached { max_iter }));
                }
            }

            // Ap = A * p
            if let Err(err) = operator.apply((&mut *Ap).into(), (&*p).into()) {
                return Err(SolveError::new(output, OperatorError(err)));
            }
            let pAp = p.dot(&*Ap);

            if pAp <= T::zero() {
                return Err(SolveError::new(output, IndefiniteOperator));
            }
            if zTr <= T::zero() {
                return Err(SolveError::new(output, IndefinitePreconditioner));
            }

            let alpha = zTr / pAp;
            // x <- x + alpha * p
            x.zip_apply(&*p, |x_i, p_i| *x_i += alpha * p_i);
            // r <- r - alpha * Ap
            r.zip_apply(&*Ap, |r_i, Ap_i| *r_i -= alpha * Ap_i);
            residual_is_exact = false;
            output.num_iterations += 1;

            // z <- P r
            if let Err(err) = preconditioner.apply((&mut *z).into(), (&*r).into()) {
                return Err(SolveError::new(output, PreconditionerError(err)));
            }
            let zTr_next = z.dot(&*r);
            let beta = zTr_next / zTr;

            // p <- z + beta * p
            p.zip_apply(&*z, |p_i, z_i| *p_i = z_i + beta * *p_i);

            zTr = zTr_next;
        }

        Ok(output)
    }
}
