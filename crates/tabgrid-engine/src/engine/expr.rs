//! Arithmetic evaluation of substituted formula text.
//!
//! By the time text reaches this module the pipeline has replaced every
//! reference and function call with numeric literals, so the grammar is
//! small: numbers, parentheses, unary sign, and `+ - * /`. Evaluation
//! happens during the descent; no syntax tree is built.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("malformed number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected a value")]
    ExpectedValue,
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    #[error("trailing input after expression")]
    TrailingInput,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate an expression of numeric literals, `+ - * /`, unary sign, and
/// parentheses. Division by zero is not an error here; the caller checks
/// the result for finiteness.
pub fn evaluate_expr(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    let (value, pos) = parse_add_sub(&tokens, 0)?;
    if pos != tokens.len() {
        return Err(ExprError::TrailingInput);
    }
    Ok(value)
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = num
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(num.clone()))?;
                tokens.push(Token::Number(value));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

fn parse_add_sub(tokens: &[Token], pos: usize) -> Result<(f64, usize), ExprError> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos)?;
    while let Some(&tok) = tokens.get(pos) {
        match tok {
            Token::Plus => {
                let (right, next) = parse_mul_div(tokens, pos + 1)?;
                left += right;
                pos = next;
            }
            Token::Minus => {
                let (right, next) = parse_mul_div(tokens, pos + 1)?;
                left -= right;
                pos = next;
            }
            _ => break,
        }
    }
    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize) -> Result<(f64, usize), ExprError> {
    let (mut left, mut pos) = parse_unary(tokens, pos)?;
    while let Some(&tok) = tokens.get(pos) {
        match tok {
            Token::Star => {
                let (right, next) = parse_unary(tokens, pos + 1)?;
                left *= right;
                pos = next;
            }
            Token::Slash => {
                let (right, next) = parse_unary(tokens, pos + 1)?;
                left /= right;
                pos = next;
            }
            _ => break,
        }
    }
    Ok((left, pos))
}

fn parse_unary(tokens: &[Token], pos: usize) -> Result<(f64, usize), ExprError> {
    match tokens.get(pos) {
        Some(Token::Minus) => {
            let (value, next) = parse_unary(tokens, pos + 1)?;
            Ok((-value, next))
        }
        Some(Token::Plus) => parse_unary(tokens, pos + 1),
        _ => parse_primary(tokens, pos),
    }
}

fn parse_primary(tokens: &[Token], pos: usize) -> Result<(f64, usize), ExprError> {
    match tokens.get(pos) {
        Some(Token::Number(value)) => Ok((*value, pos + 1)),
        Some(Token::LParen) => {
            let (value, next) = parse_add_sub(tokens, pos + 1)?;
            match tokens.get(next) {
                Some(Token::RParen) => Ok((value, next + 1)),
                Some(_) => Err(ExprError::UnmatchedParen),
                None => Err(ExprError::UnmatchedParen),
            }
        }
        Some(_) => Err(ExprError::ExpectedValue),
        None => Err(ExprError::UnexpectedEnd),
    }
}
