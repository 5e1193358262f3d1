use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::error::{AgentError, Result};
use crate::tools::TypedTool;

const TOOL_NAME: &str = "calculator";
const MAX_EXPRESSION_LEN: usize = 1024;

/// Either a bare expression string or `{ "expression": "..." }`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CalculatorInput {
    Bare(String),
    Object { expression: String },
}

impl CalculatorInput {
    fn expression(&self) -> &str {
        match self {
            Self::Bare(expression) | Self::Object { expression } => expression,
        }
    }
}

pub struct CalculatorTool;

impl CalculatorTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TypedTool for CalculatorTool {
    type Input = CalculatorInput;

    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses and unary minus. Input is the expression string, e.g. \"(2+3)*4\"."
    }

    async fn execute_typed(&self, input: Self::Input) -> Result<String> {
        let expression = input.expression();
        if expression.len() > MAX_EXPRESSION_LEN {
            return Err(invalid(format!(
                "expression exceeds {MAX_EXPRESSION_LEN} characters"
            )));
        }
        let value = evaluate(expression)?;
        Ok(format_number(value))
    }
}

fn invalid(reason: impl Into<String>) -> AgentError {
    AgentError::InvalidToolInput {
        tool: TOOL_NAME.to_string(),
        reason: reason.into(),
    }
}

pub fn evaluate(expression: &str) -> Result<f64> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(invalid("expression is empty"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected token '{token}'")));
    }
    if !value.is_finite() {
        return Err(AgentError::ToolFailure(format!(
            "result of '{expression}' is not a finite number"
        )));
    }
    Ok(value)
}

/// Integral values print without a fractional part.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Op(c) => write!(f, "{c}"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("invalid number '{literal}'")))?;
                tokens.push(Token::Num(number));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            other => return Err(invalid(format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

// expr   := term (('+' | '-') term)*
// term   := unary (('*' | '/' | '%') unary)*
// unary  := '-' unary | '+' unary | power
// power  := atom ('^' unary)?
// atom   := number | '(' expr ')'
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            if op != '*' && rhs == 0.0 {
                return Err(AgentError::ToolFailure("division by zero".to_string()));
            }
            value = match op {
                '*' => value * rhs,
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.advance();
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.advance();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.advance();
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(invalid("missing closing parenthesis")),
                }
            }
            Some(token) => Err(invalid(format!("unexpected token '{token}'"))),
            None => Err(invalid("unexpected end of expression")),
        }
    }
}
