use core::fmt;
use core::fmt::{Display, Formatter};
use std::f64::consts::{LN_10, LN_2};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function1 {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log2,
    Log10,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function2 {
    Pow,
    Atan2,
    Min,
    Max,
}

/// Syntax tree of a parsed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Constant(f64),
    /// The variable `x`.
    Variable,
    Neg(Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    Call1(Function1, Box<Expression>),
    Call2(Function2, Box<Expression>, Box<Expression>),
    /// `condition ? if_true : if_false`, where any non-zero condition counts as true.
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
}

fn from_bool(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn is_true(value: f64) -> bool {
    value != 0.0
}

impl BinaryOp {
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        use BinaryOp::*;
        match self {
            Add => a + b,
            Sub => a - b,
            Mul => a * b,
            Div => a / b,
            Pow => a.powf(b),
            Less => from_bool(a < b),
            LessEqual => from_bool(a <= b),
            Greater => from_bool(a > b),
            GreaterEqual => from_bool(a >= b),
            Equal => from_bool(a == b),
            NotEqual => from_bool(a != b),
            And => from_bool(is_true(a) && is_true(b)),
            Or => from_bool(is_true(a) || is_true(b)),
        }
    }

    pub fn symbol(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Pow => "^",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "&&",
            Or => "||",
        }
    }

    /// Whether the result of the operation is piecewise constant in its operands.
    fn is_logical(&self) -> bool {
        !matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow)
    }
}

impl Function1 {
    pub fn from_name(name: &str) -> Option<Self> {
        use Function1::*;
        let function = match name {
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "sinh" => Sinh,
            "cosh" => Cosh,
            "tanh" => Tanh,
            "exp" => Exp,
            "log" | "ln" => Ln,
            "log2" => Log2,
            "log10" => Log10,
            "sqrt" => Sqrt,
            "abs" => Abs,
            "sign" => Sign,
            "floor" => Floor,
            "ceil" => Ceil,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(&self) -> &'static str {
        use Function1::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Exp => "exp",
            Ln => "ln",
            Log2 => "log2",
            Log10 => "log10",
            Sqrt => "sqrt",
            Abs => "abs",
            Sign => "sign",
            Floor => "floor",
            Ceil => "ceil",
        }
    }

    pub fn apply(&self, a: f64) -> f64 {
        use Function1::*;
        match self {
            Sin => a.sin(),
            Cos => a.cos(),
            Tan => a.tan(),
            Asin => a.asin(),
            Acos => a.acos(),
            Atan => a.atan(),
            Sinh => a.sinh(),
            Cosh => a.cosh(),
            Tanh => a.tanh(),
            Exp => a.exp(),
            Ln => a.ln(),
            Log2 => a.log2(),
            Log10 => a.log10(),
            Sqrt => a.sqrt(),
            Abs => a.abs(),
            // f64::signum maps 0 to 1, but sign(0) should be 0
            Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    a
                }
            }
            Floor => a.floor(),
            Ceil => a.ceil(),
        }
    }
}

impl Function2 {
    pub fn from_name(name: &str) -> Option<Self> {
        use Function2::*;
        match name {
            "pow" => Some(Pow),
            "atan2" => Some(Atan2),
            "min" => Some(Min),
            "max" => Some(Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        use Function2::*;
        match self {
            Pow => "pow",
            Atan2 => "atan2",
            Min => "min",
            Max => "max",
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> f64 {
        use Function2::*;
        match self {
            Pow => a.powf(b),
            Atan2 => a.atan2(b),
            Min => a.min(b),
            Max => a.max(b),
        }
    }
}

// Constructors that fold constants and drop neutral elements, so that derivatives stay
// reasonably small.

fn constant(value: f64) -> Expression {
    Expression::Constant(value)
}

fn neg(a: Expression) -> Expression {
    match a {
        Expression::Constant(c) => constant(-c),
        Expression::Neg(inner) => *inner,
        a => Expression::Neg(Box::new(a)),
    }
}

fn binary(op: BinaryOp, a: Expression, b: Expression) -> Expression {
    use BinaryOp::*;
    use Expression::Constant;
    match (op, a, b) {
        (op, Constant(a), Constant(b)) => constant(op.apply(a, b)),
        (Add, Constant(z), b) if z == 0.0 => b,
        (Add | Sub, a, Constant(z)) if z == 0.0 => a,
        (Sub, Constant(z), b) if z == 0.0 => neg(b),
        (Mul, Constant(z), _) | (Mul, _, Constant(z)) if z == 0.0 => constant(0.0),
        (Mul, Constant(one), b) if one == 1.0 => b,
        (Mul | Div | Pow, a, Constant(one)) if one == 1.0 => a,
        (Div, Constant(z), _) if z == 0.0 => constant(0.0),
        (op, a, b) => Expression::Binary(op, Box::new(a), Box::new(b)),
    }
}

fn add(a: Expression, b: Expression) -> Expression {
    binary(BinaryOp::Add, a, b)
}

fn sub(a: Expression, b: Expression) -> Expression {
    binary(BinaryOp::Sub, a, b)
}

fn mul(a: Expression, b: Expression) -> Expression {
    binary(BinaryOp::Mul, a, b)
}

fn div(a: Expression, b: Expression) -> Expression {
    binary(BinaryOp::Div, a, b)
}

fn pow(a: Expression, b: Expression) -> Expression {
    binary(BinaryOp::Pow, a, b)
}

fn call1(function: Function1, a: Expression) -> Expression {
    match a {
        Expression::Constant(c) => constant(function.apply(c)),
        a => Expression::Call1(function, Box::new(a)),
    }
}

fn conditional(condition: Expression, if_true: Expression, if_false: Expression) -> Expression {
    match condition {
        Expression::Constant(c) if is_true(c) => if_true,
        Expression::Constant(_) => if_false,
        _ if if_true == if_false => if_true,
        condition => Expression::Conditional(Box::new(condition), Box::new(if_true), Box::new(if_false)),
    }
}

impl Expression {
    pub fn evaluate(&self, x: f64) -> f64 {
        use Expression::*;
        match self {
            Constant(c) => *c,
            Variable => x,
            Neg(a) => -a.evaluate(x),
            Binary(op, a, b) => match op {
                // Short-circuit logical operators
                BinaryOp::And => from_bool(is_true(a.evaluate(x)) && is_true(b.evaluate(x))),
                BinaryOp::Or => from_bool(is_true(a.evaluate(x)) || is_true(b.evaluate(x))),
                op => op.apply(a.evaluate(x), b.evaluate(x)),
            },
            Call1(function, a) => function.apply(a.evaluate(x)),
            Call2(function, a, b) => function.apply(a.evaluate(x), b.evaluate(x)),
            Conditional(condition, if_true, if_false) => {
                if is_true(condition.evaluate(x)) {
                    if_true.evaluate(x)
                } else {
                    if_false.evaluate(x)
                }
            }
        }
    }

    /// Whether the expression refers to the variable `x` anywhere.
    pub fn depends_on_x(&self) -> bool {
        use Expression::*;
        match self {
            Constant(_) => false,
            Variable => true,
            Neg(a) | Call1(_, a) => a.depends_on_x(),
            Binary(_, a, b) | Call2(_, a, b) => a.depends_on_x() || b.depends_on_x(),
            Conditional(c, a, b) => c.depends_on_x() || a.depends_on_x() || b.depends_on_x(),
        }
    }

    /// Computes the derivative with respect to `x` by symbolic differentiation.
    ///
    /// Comparisons, logical operators and the functions `sign`, `floor` and `ceil` are treated
    /// as piecewise constant, i.e. their derivative is taken to be zero. The two branches of a
    /// conditional are differentiated separately, which gives the one-sided derivatives at
    /// any switching point.
    pub fn derivative(&self) -> Expression {
        use Expression::*;
        match self {
            Constant(_) => constant(0.0),
            Variable => constant(1.0),
            Neg(a) => neg(a.derivative()),
            Binary(op, a, b) => binary_derivative(*op, a, b),
            Call1(function, a) => mul(function1_derivative(*function, a), a.derivative()),
            Call2(Function2::Pow, a, b) => binary_derivative(BinaryOp::Pow, a, b),
            Call2(Function2::Atan2, a, b) => {
                // d/dx atan2(a, b) = (b a' - a b') / (a^2 + b^2)
                let a = a.as_ref().clone();
                let b = b.as_ref().clone();
                let numerator = sub(mul(b.clone(), a.derivative()), mul(a.clone(), b.derivative()));
                let denominator = add(pow(a, constant(2.0)), pow(b, constant(2.0)));
                div(numerator, denominator)
            }
            Call2(Function2::Min, a, b) => conditional(
                binary(BinaryOp::LessEqual, a.as_ref().clone(), b.as_ref().clone()),
                a.derivative(),
                b.derivative(),
            ),
            Call2(Function2::Max, a, b) => conditional(
                binary(BinaryOp::GreaterEqual, a.as_ref().clone(), b.as_ref().clone()),
                a.derivative(),
                b.derivative(),
            ),
            Conditional(condition, if_true, if_false) => {
                conditional(condition.as_ref().clone(), if_true.derivative(), if_false.derivative())
            }
        }
    }
}

fn binary_derivative(op: BinaryOp, a: &Expression, b: &Expression) -> Expression {
    use BinaryOp::*;
    if op.is_logical() {
        return constant(0.0);
    }

    let (da, db) = (a.derivative(), b.derivative());
    let (a, b) = (a.clone(), b.clone());
    match op {
        Add => add(da, db),
        Sub => sub(da, db),
        Mul => add(mul(da, b), mul(a, db)),
        // (a' b - a b') / b^2
        Div => div(sub(mul(da, b.clone()), mul(a, db)), pow(b, constant(2.0))),
        Pow if !b.depends_on_x() => {
            // b a^(b - 1) a'
            let exponent = sub(b.clone(), constant(1.0));
            mul(mul(b, pow(a, exponent)), da)
        }
        Pow => {
            // a^b (b' ln(a) + b a' / a)
            let inner = add(mul(db, call1(Function1::Ln, a.clone())), div(mul(b.clone(), da), a.clone()));
            mul(pow(a, b), inner)
        }
        _ => constant(0.0),
    }
}

/// The derivative of `function` evaluated at `a`, without the chain rule factor.
fn function1_derivative(function: Function1, a: &Expression) -> Expression {
    use Function1::*;
    let a = a.clone();
    let one = || constant(1.0);
    match function {
        Sin => call1(Cos, a),
        Cos => neg(call1(Sin, a)),
        Tan => div(one(), pow(call1(Cos, a), constant(2.0))),
        Asin => div(one(), call1(Sqrt, sub(one(), pow(a, constant(2.0))))),
        Acos => neg(div(one(), call1(Sqrt, sub(one(), pow(a, constant(2.0)))))),
        Atan => div(one(), add(one(), pow(a, constant(2.0)))),
        Sinh => call1(Cosh, a),
        Cosh => call1(Sinh, a),
        Tanh => sub(one(), pow(call1(Tanh, a), constant(2.0))),
        Exp => call1(Exp, a),
        Ln => div(one(), a),
        Log2 => div(one(), mul(a, constant(LN_2))),
        Log10 => div(one(), mul(a, constant(LN_10))),
        Sqrt => div(one(), mul(constant(2.0), call1(Sqrt, a))),
        Abs => call1(Sign, a),
        Sign | Floor | Ceil => constant(0.0),
    }
}

// Fully parenthesized output, which parses back to the same expression.
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use Expression::*;
        match self {
            Constant(c) if *c < 0.0 => write!(f, "({:?})", c),
            Constant(c) => write!(f, "{:?}", c),
            Variable => write!(f, "x"),
            Neg(a) => write!(f, "(-{})", a),
            Binary(op, a, b) => write!(f, "({} {} {})", a, op.symbol(), b),
            Call1(function, a) => write!(f, "{}({})", function.name(), a),
            Call2(function, a, b) => write!(f, "{}({}, {})", function.name(), a, b),
            Conditional(c, a, b) => write!(f, "({} ? {} : {})", c, a, b),
        }
    }
}
