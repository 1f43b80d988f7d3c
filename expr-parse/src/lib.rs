//! Tiny parser for scalar expressions of a single variable `x`.
//!
//! The accepted language is a small subset of the one understood by `muparser`, which is what
//! the parameter files consumed by `fem1d` are written in. For example:
//!
//! ```text
//! 4*pi*pi*sin(2*pi*x)
//! x < 0.5 ? 0 : -sqrt(x - 0.5)
//! if(x > 0.125 && x <= 0.25, -1, 0)
//! ```
//!
//! Supported are numbers (including scientific notation), the variable `x`, the constants `pi`
//! and `e`, the binary operators `+ - * / ^`, unary `+ -`, comparisons `< <= > >= == !=`
//! (evaluating to `1` or `0`), logical `&&` and `||`, the ternary operator `c ? a : b` and the
//! functions
//!
//! - `sin cos tan asin acos atan sinh cosh tanh exp log ln log2 log10 sqrt abs sign floor ceil`
//!   (one argument; `log` is the natural logarithm),
//! - `pow atan2 min max` (two arguments),
//! - `if(c, a, b)` (three arguments).
//!
//! `^` is right-associative and binds tighter than unary minus, so `-2^2` evaluates to `-4`.
//!
//! Unknown identifiers and calls with the wrong number of arguments are rejected when parsing.
//! Evaluation itself never fails, but follows IEEE semantics (`sqrt(-1)` is NaN).

use core::fmt;
use core::fmt::{Display, Formatter};
use std::str::FromStr;

mod expression;
mod parser;

pub use expression::{BinaryOp, Expression, Function1, Function2};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    error: String,
}

impl ParseError {
    fn from_string(error: String) -> Self {
        Self { error }
    }

    fn unexpected_character(c: char, position: usize) -> Self {
        ParseError::from_string(format!("Unexpected character '{}' at position {}", c, position))
    }

    fn invalid_number(str: &str, position: usize) -> Self {
        ParseError::from_string(format!("Failed to parse number '{}' at position {}", str, position))
    }

    fn unexpected_token(found: &str, expected: &str, position: usize) -> Self {
        ParseError::from_string(format!(
            "Unexpected {} at position {}, expected {}",
            found, position, expected
        ))
    }

    fn unknown_identifier(name: &str, position: usize) -> Self {
        ParseError::from_string(format!("Unknown identifier '{}' at position {}", name, position))
    }

    fn unknown_function(name: &str, position: usize) -> Self {
        ParseError::from_string(format!("Unknown function '{}' at position {}", name, position))
    }

    fn wrong_arity(name: &str, num_args_found: usize, num_args_expected: usize) -> Self {
        ParseError::from_string(format!(
            "Function '{}' takes {} argument(s), but {} were given",
            name, num_args_expected, num_args_found
        ))
    }

    fn empty_expression() -> Self {
        ParseError::from_string("Expression is empty".to_string())
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ParseError {}

/// Attempts to parse the given string as an expression in the variable `x`.
pub fn parse(input: &str) -> Result<Expression, ParseError> {
    parser::Parser::new(input)?.parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
