use crate::expression::{BinaryOp, Expression, Function1, Function2};
use crate::ParseError;
use std::f64::consts::{E, PI};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Op(BinaryOp),
    LeftParen,
    RightParen,
    Comma,
    Question,
    Colon,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(value) => format!("number {}", value),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Op(op) => format!("operator '{}'", op.symbol()),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Question => "'?'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::End => "end of expression".to_string(),
        }
    }
}

/// Splits the input into tokens, each paired with its (character) position in the input.
fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Only treat 'e' as an exponent if digits follow, so that e.g. `2*e` still works
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let str: String = chars[start..i].iter().collect();
            let value = str
                .parse::<f64>()
                .map_err(|_| ParseError::invalid_number(&str, start))?;
            tokens.push((Token::Number(value), start));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((Token::Identifier(chars[start..i].iter().collect()), start));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, len) = match (c, next) {
            ('<', Some('=')) => (Token::Op(BinaryOp::LessEqual), 2),
            ('>', Some('=')) => (Token::Op(BinaryOp::GreaterEqual), 2),
            ('=', Some('=')) => (Token::Op(BinaryOp::Equal), 2),
            ('!', Some('=')) => (Token::Op(BinaryOp::NotEqual), 2),
            ('&', Some('&')) => (Token::Op(BinaryOp::And), 2),
            ('|', Some('|')) => (Token::Op(BinaryOp::Or), 2),
            ('<', _) => (Token::Op(BinaryOp::Less), 1),
            ('>', _) => (Token::Op(BinaryOp::Greater), 1),
            ('+', _) => (Token::Op(BinaryOp::Add), 1),
            ('-', _) => (Token::Op(BinaryOp::Sub), 1),
            ('*', _) => (Token::Op(BinaryOp::Mul), 1),
            ('/', _) => (Token::Op(BinaryOp::Div), 1),
            ('^', _) => (Token::Op(BinaryOp::Pow), 1),
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            (',', _) => (Token::Comma, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            _ => return Err(ParseError::unexpected_character(c, start)),
        };
        tokens.push((token, start));
        i += len;
    }

    tokens.push((Token::End, chars.len()));
    Ok(tokens)
}

/// Recursive descent parser. Precedence, from loosest to tightest:
///
/// ```text
/// ?:  ||  &&  comparisons  + -  * /  unary + -  ^
/// ```
pub(crate) struct Parser {
    tokens: Vec<(Token, usize)>,
    current: usize,
}

impl Parser {
    pub(crate) fn new(input: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(input)?,
            current: 0,
        })
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        if self.peek() == &Token::End {
            return Err(ParseError::empty_expression());
        }
        let expression = self.ternary()?;
        self.expect(&Token::End, "operator or end of expression")?;
        Ok(expression)
    }

    fn peek(&self) -> &Token {
        // The token list always ends with Token::End, and we never advance past it
        &self.tokens[self.current].0
    }

    fn position(&self) -> usize {
        self.tokens[self.current].1
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].0.clone();
        if token != Token::End {
            self.current += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected_token(&self.peek().describe(), expected, self.position())
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), ParseError> {
        if self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consumes the next token if it is one of the given binary operators.
    fn next_op_in(&mut self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        match self.peek() {
            Token::Op(op) if ops.contains(op) => {
                let op = *op;
                self.advance();
                Some(op)
            }
            _ => None,
        }
    }

    fn left_associative(
        &mut self,
        ops: &[BinaryOp],
        operand: fn(&mut Self) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.next_op_in(ops) {
            let rhs = operand(self)?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn ternary(&mut self) -> Result<Expression, ParseError> {
        let condition = self.or()?;
        if self.peek() == &Token::Question {
            self.advance();
            let if_true = self.ternary()?;
            self.expect(&Token::Colon, "':'")?;
            let if_false = self.ternary()?;
            Ok(Expression::Conditional(
                Box::new(condition),
                Box::new(if_true),
                Box::new(if_false),
            ))
        } else {
            Ok(condition)
        }
    }

    fn or(&mut self) -> Result<Expression, ParseError> {
        self.left_associative(&[BinaryOp::Or], Self::and)
    }

    fn and(&mut self) -> Result<Expression, ParseError> {
        self.left_associative(&[BinaryOp::And], Self::comparison)
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        use BinaryOp::*;
        self.left_associative(
            &[Less, LessEqual, Greater, GreaterEqual, Equal, NotEqual],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expression, ParseError> {
        self.left_associative(&[BinaryOp::Add, BinaryOp::Sub], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.left_associative(&[BinaryOp::Mul, BinaryOp::Div], Self::unary)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.next_op_in(&[BinaryOp::Add, BinaryOp::Sub]) {
            Some(BinaryOp::Sub) => Ok(Expression::Neg(Box::new(self.unary()?))),
            Some(_) => self.unary(),
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.primary()?;
        if self.next_op_in(&[BinaryOp::Pow]).is_some() {
            // Parsing the exponent as a unary expression makes `^` right-associative
            // and allows `2^-1`
            let exponent = self.unary()?;
            Ok(Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let position = self.position();
        match self.peek().clone() {
            Token::Number(value) => {
                self.advance();
                Ok(Expression::Constant(value))
            }
            Token::LeftParen => {
                self.advance();
                let expression = self.ternary()?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(expression)
            }
            Token::Identifier(name) => {
                self.advance();
                if self.peek() == &Token::LeftParen {
                    self.advance();
                    let args = self.arguments()?;
                    call(&name, args, position)
                } else {
                    match name.as_str() {
                        "x" => Ok(Expression::Variable),
                        "pi" => Ok(Expression::Constant(PI)),
                        "e" => Ok(Expression::Constant(E)),
                        _ => Err(ParseError::unknown_identifier(&name, position)),
                    }
                }
            }
            _ => Err(self.unexpected("number, identifier or '('")),
        }
    }

    /// Parses a comma-separated argument list. The opening parenthesis has already been consumed.
    fn arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut args = Vec::new();
        if self.peek() == &Token::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.ternary()?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RightParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }
}

fn call(name: &str, args: Vec<Expression>, position: usize) -> Result<Expression, ParseError> {
    let num_args = args.len();
    let expected = if Function1::from_name(name).is_some() {
        1
    } else if Function2::from_name(name).is_some() {
        2
    } else if name == "if" {
        3
    } else {
        return Err(ParseError::unknown_function(name, position));
    };

    if num_args != expected {
        return Err(ParseError::wrong_arity(name, num_args, expected));
    }

    let mut args = args.into_iter().map(Box::new);
    let mut next = || args.next().ok_or_else(|| ParseError::wrong_arity(name, num_args, expected));
    if let Some(function) = Function1::from_name(name) {
        Ok(Expression::Call1(function, next()?))
    } else if let Some(function) = Function2::from_name(name) {
        Ok(Expression::Call2(function, next()?, next()?))
    } else {
        Ok(Expression::Conditional(next()?, next()?, next()?))
    }
}
