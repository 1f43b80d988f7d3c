//! Scalar coefficient functions and exact solutions.
use crate::Error;
use expr_parse::Expression;
use std::sync::Arc;

/// A scalar function of position $x \in [0, 1]$.
///
/// Expressions are parsed once, when the configuration is built, so that evaluation itself
/// cannot fail. Evaluation follows IEEE semantics and may return NaN or infinity.
#[derive(Debug, Clone)]
pub enum ScalarFunction {
    Constant(f64),
    /// A compiled closed-form function.
    ClosedForm(fn(f64) -> f64),
    /// An expression parsed from text.
    Expression(Arc<Expression>),
}

impl ScalarFunction {
    /// Parses the given text as an expression in `x`.
    ///
    /// The parameter name is only used to produce an informative error. Expressions that do
    /// not depend on `x` are stored as constants.
    pub fn parse(parameter: &str, text: &str) -> Result<Self, Error> {
        let expression = expr_parse::parse(text).map_err(|source| Error::Expression {
            parameter: parameter.to_string(),
            source,
        })?;
        Ok(Self::from_expression(expression))
    }

    pub fn from_expression(expression: Expression) -> Self {
        if expression.depends_on_x() {
            Self::Expression(Arc::new(expression))
        } else {
            Self::Constant(expression.evaluate(0.0))
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Constant(c) => *c,
            Self::ClosedForm(f) => f(x),
            Self::Expression(expr) => expr.evaluate(x),
        }
    }

    /// The derivative with respect to `x`, if it can be determined.
    ///
    /// Closed-form functions carry no derivative information and return `None`.
    pub fn derivative(&self) -> Option<ScalarFunction> {
        match self {
            Self::Constant(_) => Some(Self::Constant(0.0)),
            Self::ClosedForm(_) => None,
            Self::Expression(expr) => Some(Self::from_expression(expr.derivative())),
        }
    }
}

impl From<f64> for ScalarFunction {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<fn(f64) -> f64> for ScalarFunction {
    fn from(f: fn(f64) -> f64) -> Self {
        Self::ClosedForm(f)
    }
}

/// An exact solution $u^*$ together with its derivative.
#[derive(Debug, Clone)]
pub struct ExactSolution {
    value: ScalarFunction,
    derivative: ScalarFunction,
}

impl ExactSolution {
    pub fn new(value: ScalarFunction, derivative: ScalarFunction) -> Self {
        Self { value, derivative }
    }

    /// Creates an exact solution whose derivative is obtained by symbolic differentiation.
    ///
    /// Fails for closed-form functions, which need an explicitly given derivative.
    pub fn from_function(value: ScalarFunction) -> Result<Self, Error> {
        let derivative = value.derivative().ok_or_else(|| {
            Error::configuration("The derivative of a closed-form exact solution must be given explicitly")
        })?;
        Ok(Self { value, derivative })
    }

    pub fn value(&self, x: f64) -> f64 {
        self.value.evaluate(x)
    }

    pub fn derivative(&self, x: f64) -> f64 {
        self.derivative.evaluate(x)
    }

    pub fn value_function(&self) -> &ScalarFunction {
        &self.value
    }

    pub fn derivative_function(&self) -> &ScalarFunction {
        &self.derivative
    }
}
