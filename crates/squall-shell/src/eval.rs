//! Sandboxed arithmetic evaluation for `calc`.
//!
//! Accepts numeric literals and the operators `+ - * / % ** ( )` and
//! nothing else: no names, no calls, no attribute access. Tokenize, then
//! recursive descent with standard precedence. Integer arithmetic stays
//! integer until an operation forces floating point (`/` always does;
//! overflow falls back to it).

use std::fmt;

/// Maximum nesting depth for parenthesized sub-expressions and unary chains.
const EXPR_MAX_DEPTH: usize = 64;

/// Why an expression was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// A character outside the allowed set `[0-9+-*/%(). ]`.
    #[error("unexpected character: {0}")]
    DisallowedChar(char),

    /// Division or modulo by zero, or a zero base with a negative exponent.
    #[error("division by zero")]
    DivisionByZero,

    /// Anything syntactically broken: dangling operators, unbalanced
    /// parentheses, bad numeric literals.
    #[error("{0}")]
    Malformed(String),
}

/// A numeric result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // An integral float keeps one decimal so the reader can tell
            // "4" from "4.0".
            Number::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<Number, EvalError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(EvalError::Malformed("empty expression".to_string()));
    }
    let mut pos = 0;
    let value = parse_add_sub(&tokens, &mut pos, 0)?;
    if pos < tokens.len() {
        return Err(EvalError::Malformed(format!(
            "unexpected token: {}",
            tokens[pos]
        )));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn tokenize(expr: &str) -> Result<Vec<String>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' => {
                chars.next();
            },
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        num.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(num);
            },
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push("**".to_string());
                } else {
                    tokens.push("*".to_string());
                }
            },
            '+' | '-' | '/' | '%' | '(' | ')' => {
                chars.next();
                tokens.push(ch.to_string());
            },
            _ => return Err(EvalError::DisallowedChar(ch)),
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser: add_sub -> mul_div -> unary -> power -> primary
// ---------------------------------------------------------------------------

fn parse_add_sub(tokens: &[String], pos: &mut usize, depth: usize) -> Result<Number, EvalError> {
    let mut value = parse_mul_div(tokens, pos, depth)?;
    while *pos < tokens.len() {
        let op = tokens[*pos].as_str();
        if op != "+" && op != "-" {
            break;
        }
        *pos += 1;
        let rhs = parse_mul_div(tokens, pos, depth)?;
        value = if op == "+" {
            add(value, rhs)
        } else {
            sub(value, rhs)
        };
    }
    Ok(value)
}

fn parse_mul_div(tokens: &[String], pos: &mut usize, depth: usize) -> Result<Number, EvalError> {
    let mut value = parse_unary(tokens, pos, depth)?;
    while *pos < tokens.len() {
        let op = tokens[*pos].as_str();
        if op != "*" && op != "/" && op != "%" {
            break;
        }
        *pos += 1;
        let rhs = parse_unary(tokens, pos, depth)?;
        value = match op {
            "*" => mul(value, rhs),
            "/" => div(value, rhs)?,
            _ => rem(value, rhs)?,
        };
    }
    Ok(value)
}

/// Unary minus. Binds looser than `**`, so `-2**2` is `-(2**2)`.
fn parse_unary(tokens: &[String], pos: &mut usize, depth: usize) -> Result<Number, EvalError> {
    if depth >= EXPR_MAX_DEPTH {
        return Err(EvalError::Malformed(
            "expression too deeply nested".to_string(),
        ));
    }
    if *pos < tokens.len() && tokens[*pos] == "-" {
        *pos += 1;
        let value = parse_unary(tokens, pos, depth + 1)?;
        return Ok(neg(value));
    }
    parse_power(tokens, pos, depth)
}

/// `**` is right-associative; the exponent re-enters at unary so that
/// `2**-1` parses.
fn parse_power(tokens: &[String], pos: &mut usize, depth: usize) -> Result<Number, EvalError> {
    let base = parse_primary(tokens, pos, depth)?;
    if *pos < tokens.len() && tokens[*pos] == "**" {
        *pos += 1;
        let exp = parse_unary(tokens, pos, depth + 1)?;
        return pow(base, exp);
    }
    Ok(base)
}

fn parse_primary(tokens: &[String], pos: &mut usize, depth: usize) -> Result<Number, EvalError> {
    let Some(token) = tokens.get(*pos) else {
        return Err(EvalError::Malformed(
            "unexpected end of expression".to_string(),
        ));
    };
    if token == "(" {
        if depth >= EXPR_MAX_DEPTH {
            return Err(EvalError::Malformed(
                "expression too deeply nested".to_string(),
            ));
        }
        *pos += 1;
        let value = parse_add_sub(tokens, pos, depth + 1)?;
        if tokens.get(*pos).map(String::as_str) != Some(")") {
            return Err(EvalError::Malformed(
                "missing closing parenthesis".to_string(),
            ));
        }
        *pos += 1;
        return Ok(value);
    }
    let value = parse_number(token)?;
    *pos += 1;
    Ok(value)
}

fn parse_number(token: &str) -> Result<Number, EvalError> {
    let bad = || EvalError::Malformed(format!("expected number, got: {token}"));
    if token.contains('.') {
        token.parse::<f64>().map(Number::Float).map_err(|_| bad())
    } else if let Ok(v) = token.parse::<i64>() {
        Ok(Number::Int(v))
    } else if let Ok(v) = token.parse::<f64>() {
        // Integer literal too large for i64.
        Ok(Number::Float(v))
    } else {
        Err(bad())
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: ints stay ints, with float fallback on overflow
// ---------------------------------------------------------------------------

fn add(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => match x.checked_add(y) {
            Some(v) => Number::Int(v),
            None => Number::Float(x as f64 + y as f64),
        },
        _ => Number::Float(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => match x.checked_sub(y) {
            Some(v) => Number::Int(v),
            None => Number::Float(x as f64 - y as f64),
        },
        _ => Number::Float(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => match x.checked_mul(y) {
            Some(v) => Number::Int(v),
            None => Number::Float(x as f64 * y as f64),
        },
        _ => Number::Float(a.as_f64() * b.as_f64()),
    }
}

fn neg(a: Number) -> Number {
    match a {
        Number::Int(v) => match v.checked_neg() {
            Some(n) => Number::Int(n),
            None => Number::Float(-(v as f64)),
        },
        Number::Float(v) => Number::Float(-v),
    }
}

/// True division: the result is always a float.
fn div(a: Number, b: Number) -> Result<Number, EvalError> {
    let denom = b.as_f64();
    if denom == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / denom))
}

/// Floored modulo: the result takes the sign of the divisor, so
/// `-5 % 3 == 1` and `7 % -3 == -2`.
fn rem(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            if y == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let Some(r) = x.checked_rem(y) else {
                // i64::MIN % -1 overflows; the mathematical result is 0.
                return Ok(Number::Int(0));
            };
            let r = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
            Ok(Number::Int(r))
        },
        _ => {
            let denom = b.as_f64();
            if denom == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            let r = a.as_f64() % denom;
            let r = if r != 0.0 && (r < 0.0) != (denom < 0.0) {
                r + denom
            } else {
                r
            };
            Ok(Number::Float(r))
        },
    }
}

fn pow(base: Number, exp: Number) -> Result<Number, EvalError> {
    match (base, exp) {
        (Number::Int(b), Number::Int(e)) => {
            if e < 0 {
                // Negative exponent behaves like true division.
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                return Ok(Number::Float((b as f64).powf(e as f64)));
            }
            let Ok(e32) = u32::try_from(e) else {
                return Ok(Number::Float((b as f64).powf(e as f64)));
            };
            match b.checked_pow(e32) {
                Some(v) => Ok(Number::Int(v)),
                None => Ok(Number::Float((b as f64).powf(e as f64))),
            }
        },
        _ => {
            let b = base.as_f64();
            let e = exp.as_f64();
            if b == 0.0 && e < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Number::Float(b.powf(e)))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_addition_stays_int() {
        assert_eq!(evaluate("2+2").unwrap(), Number::Int(4));
    }

    #[test]
    fn division_always_floats() {
        assert_eq!(evaluate("5/2").unwrap(), Number::Float(2.5));
        assert_eq!(evaluate("4/2").unwrap(), Number::Float(2.0));
    }

    #[test]
    fn power_of_ints_stays_int() {
        assert_eq!(evaluate("2**10").unwrap(), Number::Int(1024));
    }

    #[test]
    fn power_is_right_associative() {
        // 2**(3**2), not (2**3)**2.
        assert_eq!(evaluate("2**3**2").unwrap(), Number::Int(512));
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(evaluate("-2**2").unwrap(), Number::Int(-4));
        assert_eq!(evaluate("(-2)**2").unwrap(), Number::Int(4));
    }

    #[test]
    fn negative_exponent_gives_float() {
        assert_eq!(evaluate("2**-1").unwrap(), Number::Float(0.5));
    }

    #[test]
    fn mul_div_before_add_sub() {
        assert_eq!(evaluate("2+3*4").unwrap(), Number::Int(14));
        assert_eq!(evaluate("(2+3)*4").unwrap(), Number::Int(20));
        assert_eq!(evaluate("2*3**2").unwrap(), Number::Int(18));
    }

    #[test]
    fn unary_minus_chains() {
        assert_eq!(evaluate("--5").unwrap(), Number::Int(5));
        assert_eq!(evaluate("2--3").unwrap(), Number::Int(5));
    }

    #[test]
    fn modulo_is_floored() {
        assert_eq!(evaluate("7%3").unwrap(), Number::Int(1));
        assert_eq!(evaluate("-5%3").unwrap(), Number::Int(1));
        assert_eq!(evaluate("5%-3").unwrap(), Number::Int(-1));
        assert_eq!(evaluate("7%-3").unwrap(), Number::Int(-2));
        assert_eq!(evaluate("-7%-3").unwrap(), Number::Int(-1));
    }

    #[test]
    fn float_modulo_is_floored() {
        assert_eq!(evaluate("-5.5%2").unwrap(), Number::Float(0.5));
    }

    #[test]
    fn int_overflow_promotes_to_float() {
        match evaluate("9223372036854775807+1").unwrap() {
            Number::Float(v) => assert!(v > 9.2e18),
            other => panic!("expected float, got {other:?}"),
        }
        match evaluate("9223372036854775807*2").unwrap() {
            Number::Float(_) => {},
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn huge_literal_becomes_float() {
        match evaluate("99999999999999999999").unwrap() {
            Number::Float(_) => {},
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert_eq!(evaluate("1/0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(evaluate("1%0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(evaluate("0**-1").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(evaluate("1/0.0").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn disallowed_characters_rejected() {
        assert_eq!(
            evaluate("__import__('os')").unwrap_err(),
            EvalError::DisallowedChar('_'),
        );
        assert_eq!(evaluate("2+x").unwrap_err(), EvalError::DisallowedChar('x'));
        assert_eq!(evaluate("2;3").unwrap_err(), EvalError::DisallowedChar(';'));
    }

    #[test]
    fn dangling_operator_is_malformed() {
        match evaluate("2+").unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("unexpected end")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_parenthesis_is_malformed() {
        match evaluate("(2+3").unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("missing closing parenthesis")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn empty_parens_are_malformed() {
        match evaluate("()").unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("expected number")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        match evaluate("2 2").unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("unexpected token")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn empty_expression_is_malformed() {
        assert!(matches!(evaluate("").unwrap_err(), EvalError::Malformed(_)));
        assert!(matches!(
            evaluate("   ").unwrap_err(),
            EvalError::Malformed(_)
        ));
    }

    #[test]
    fn bad_literal_is_malformed() {
        match evaluate("1.2.3").unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("expected number")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_rejected() {
        let expr = format!("{}1{}", "(".repeat(80), ")".repeat(80));
        match evaluate(&expr).unwrap_err() {
            EvalError::Malformed(msg) => assert!(msg.contains("too deeply nested")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(evaluate("  2 +  2 ").unwrap(), Number::Int(4));
    }

    #[test]
    fn leading_dot_literal() {
        assert_eq!(evaluate(".5+.5").unwrap(), Number::Float(1.0));
    }

    #[test]
    fn float_operand_infects_result() {
        assert_eq!(evaluate("1.5+1").unwrap(), Number::Float(2.5));
    }

    #[test]
    fn fractional_power() {
        match evaluate("2**0.5").unwrap() {
            Number::Float(v) => assert!((v - std::f64::consts::SQRT_2).abs() < 1e-12),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", evaluate("2+2").unwrap()), "4");
        assert_eq!(format!("{}", evaluate("5/2").unwrap()), "2.5");
        assert_eq!(format!("{}", evaluate("4/2").unwrap()), "2.0");
        assert_eq!(format!("{}", evaluate("-1/2").unwrap()), "-0.5");
    }

    #[test]
    fn error_displays() {
        assert_eq!(
            format!("{}", evaluate("1/0").unwrap_err()),
            "division by zero",
        );
        assert_eq!(
            format!("{}", evaluate("2+x").unwrap_err()),
            "unexpected character: x",
        );
    }

    proptest! {
        #[test]
        fn evaluate_never_panics(s in ".*") {
            let _ = evaluate(&s);
        }

        #[test]
        fn addition_matches_i64(a in -1000i64..1000, b in -1000i64..1000) {
            let expr = format!("{a} + {b}");
            prop_assert_eq!(evaluate(&expr).unwrap(), Number::Int(a + b));
        }

        #[test]
        fn parenthesized_identity(a in -1000i64..1000) {
            let expr = format!("(({a}))");
            prop_assert_eq!(evaluate(&expr).unwrap(), Number::Int(a));
        }
    }
}
