//! Evaluator for serialized expression text.
//!
//! Generated code passes variable initializers and assignment values as
//! unevaluated text; this module tokenizes that text with the Canto lexer
//! and evaluates it by precedence climbing against the live frame stack.

use crate::cell::{Cell, HeapId};
use crate::error::RuntimeError;
use crate::frame::Runtime;
use canto_lexer::{tokenize, Token, TokenKind};

/// The result of evaluating an expression.
///
/// String results distinguish freshly produced text from a share of an
/// existing heap slot: sharing is what drives the reference-count contract
/// when a value is bound to a second name.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Int(i64),
    Float(f64),
    /// A string produced by this evaluation (not yet on the heap).
    NewStr(String),
    /// A share of an existing heap slot (caller must retain on store).
    SharedStr(HeapId),
}

impl EvalValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::Int(_) => "int",
            EvalValue::Float(_) => "float",
            EvalValue::NewStr(_) | EvalValue::SharedStr(_) => "str",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            EvalValue::Int(n) => Some(*n as f64),
            EvalValue::Float(n) => Some(*n),
            _ => None,
        }
    }
}

/// Evaluate expression text against the runtime's current frame stack.
pub fn evaluate(rt: &Runtime, text: &str) -> Result<EvalValue, RuntimeError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(RuntimeError::EmptyExpression);
    }
    let mut ev = Evaluator {
        rt,
        tokens: &tokens,
        pos: 0,
    };
    let value = ev.eval_binding(0)?;
    if ev.pos != tokens.len() {
        return Err(RuntimeError::UnexpectedToken {
            lexeme: tokens[ev.pos].lexeme.clone(),
        });
    }
    Ok(value)
}

fn binding_power(op: &str) -> u8 {
    match op {
        "==" | "!=" => 1,
        "<" | ">" | "<=" | ">=" => 2,
        "+" | "-" => 3,
        "*" | "/" | "%" => 4,
        _ => 0,
    }
}

struct Evaluator<'a> {
    rt: &'a Runtime,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn eval_binding(&mut self, min_bp: u8) -> Result<EvalValue, RuntimeError> {
        let mut lhs = self.eval_primary()?;

        while let Some(tok) = self.peek() {
            if tok.kind != TokenKind::Operator {
                break;
            }
            let bp = binding_power(&tok.lexeme);
            if bp == 0 || bp < min_bp {
                break;
            }
            let op = tok.lexeme.clone();
            self.pos += 1;
            let rhs = self.eval_binding(bp + 1)?;
            lhs = self.apply(&op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn eval_primary(&mut self) -> Result<EvalValue, RuntimeError> {
        let tok = self.advance().ok_or(RuntimeError::EmptyExpression)?;

        match tok.kind {
            TokenKind::Number => {
                if tok.lexeme.contains('.') {
                    tok.lexeme
                        .parse::<f64>()
                        .map(EvalValue::Float)
                        .map_err(|_| RuntimeError::InvalidNumber(tok.lexeme.clone()))
                } else {
                    tok.lexeme
                        .parse::<i64>()
                        .map(EvalValue::Int)
                        .map_err(|_| RuntimeError::InvalidNumber(tok.lexeme.clone()))
                }
            }
            TokenKind::Str => Ok(EvalValue::NewStr(tok.lexeme.clone())),
            TokenKind::Ident => match self.rt.lookup(&tok.lexeme) {
                Some(Cell::Int(n)) => Ok(EvalValue::Int(*n)),
                Some(Cell::Float(n)) => Ok(EvalValue::Float(*n)),
                Some(Cell::Str(id)) | Some(Cell::Ref(id)) => Ok(EvalValue::SharedStr(*id)),
                None => Err(RuntimeError::UndeclaredName {
                    name: tok.lexeme.clone(),
                }),
            },
            TokenKind::Symbol if tok.lexeme == "(" => {
                let inner = self.eval_binding(0)?;
                match self.advance() {
                    Some(close) if close.is_symbol(")") => Ok(inner),
                    _ => Err(RuntimeError::UnexpectedToken {
                        lexeme: tok.lexeme.clone(),
                    }),
                }
            }
            _ => Err(RuntimeError::UnexpectedToken {
                lexeme: tok.lexeme.clone(),
            }),
        }
    }

    /// Read a string value, resolving heap shares.
    fn string_of(&self, value: &EvalValue) -> Result<Option<String>, RuntimeError> {
        match value {
            EvalValue::NewStr(s) => Ok(Some(s.clone())),
            EvalValue::SharedStr(id) => Ok(Some(self.rt.heap().get(*id)?.to_string())),
            _ => Ok(None),
        }
    }

    fn apply(
        &self,
        op: &str,
        lhs: EvalValue,
        rhs: EvalValue,
    ) -> Result<EvalValue, RuntimeError> {
        // String operands: concatenation and equality only.
        if let (Some(a), Some(b)) = (self.string_of(&lhs)?, self.string_of(&rhs)?) {
            return match op {
                "+" => Ok(EvalValue::NewStr(a + &b)),
                "==" => Ok(EvalValue::Int((a == b) as i64)),
                "!=" => Ok(EvalValue::Int((a != b) as i64)),
                _ => Err(RuntimeError::TypeMismatch {
                    op: op.to_string(),
                    lhs: "str",
                    rhs: "str",
                }),
            };
        }

        let mismatch = || RuntimeError::TypeMismatch {
            op: op.to_string(),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        };

        let overflow = || RuntimeError::IntegerOverflow { op: op.to_string() };

        // Integer arithmetic stays integral; any float operand promotes.
        if let (EvalValue::Int(a), EvalValue::Int(b)) = (&lhs, &rhs) {
            let (a, b) = (*a, *b);
            return match op {
                "+" => a.checked_add(b).map(EvalValue::Int).ok_or_else(overflow),
                "-" => a.checked_sub(b).map(EvalValue::Int).ok_or_else(overflow),
                "*" => a.checked_mul(b).map(EvalValue::Int).ok_or_else(overflow),
                "/" => {
                    if b == 0 {
                        Err(RuntimeError::DivisionByZero)
                    } else {
                        a.checked_div(b).map(EvalValue::Int).ok_or_else(overflow)
                    }
                }
                "%" => {
                    if b == 0 {
                        Err(RuntimeError::DivisionByZero)
                    } else {
                        a.checked_rem(b).map(EvalValue::Int).ok_or_else(overflow)
                    }
                }
                "==" => Ok(EvalValue::Int((a == b) as i64)),
                "!=" => Ok(EvalValue::Int((a != b) as i64)),
                "<" => Ok(EvalValue::Int((a < b) as i64)),
                ">" => Ok(EvalValue::Int((a > b) as i64)),
                "<=" => Ok(EvalValue::Int((a <= b) as i64)),
                ">=" => Ok(EvalValue::Int((a >= b) as i64)),
                _ => Err(mismatch()),
            };
        }

        let (a, b) = match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(mismatch()),
        };
        match op {
            "+" => Ok(EvalValue::Float(a + b)),
            "-" => Ok(EvalValue::Float(a - b)),
            "*" => Ok(EvalValue::Float(a * b)),
            "/" => {
                if b == 0.0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(EvalValue::Float(a / b))
                }
            }
            "%" => {
                if b == 0.0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(EvalValue::Float(a % b))
                }
            }
            "==" => Ok(EvalValue::Int((a == b) as i64)),
            "!=" => Ok(EvalValue::Int((a != b) as i64)),
            "<" => Ok(EvalValue::Int((a < b) as i64)),
            ">" => Ok(EvalValue::Int((a > b) as i64)),
            "<=" => Ok(EvalValue::Int((a <= b) as i64)),
            ">=" => Ok(EvalValue::Int((a >= b) as i64)),
            _ => Err(mismatch()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Runtime;

    fn eval_str(rt: &Runtime, text: &str) -> EvalValue {
        evaluate(rt, text).expect(text)
    }

    #[test]
    fn test_arithmetic() {
        let rt = Runtime::new();
        assert_eq!(eval_str(&rt, "1 + 2 * 3"), EvalValue::Int(7));
        assert_eq!(eval_str(&rt, "(1 + 2) * 3"), EvalValue::Int(9));
        assert_eq!(eval_str(&rt, "7 / 2"), EvalValue::Int(3));
        assert_eq!(eval_str(&rt, "7 % 2"), EvalValue::Int(1));
    }

    #[test]
    fn test_float_promotion() {
        let rt = Runtime::new();
        assert_eq!(eval_str(&rt, "1 + 2.5"), EvalValue::Float(3.5));
        assert_eq!(eval_str(&rt, "5.0 / 2"), EvalValue::Float(2.5));
    }

    #[test]
    fn test_comparisons_yield_ints() {
        let rt = Runtime::new();
        assert_eq!(eval_str(&rt, "2 > 1"), EvalValue::Int(1));
        assert_eq!(eval_str(&rt, "2 < 1"), EvalValue::Int(0));
        assert_eq!(eval_str(&rt, "3 == 3"), EvalValue::Int(1));
        assert_eq!(eval_str(&rt, "1.5 >= 1"), EvalValue::Int(1));
    }

    #[test]
    fn test_string_concat_and_equality() {
        let rt = Runtime::new();
        assert_eq!(
            eval_str(&rt, "\"foo\" + \"bar\""),
            EvalValue::NewStr("foobar".to_string())
        );
        assert_eq!(eval_str(&rt, "\"a\" == \"a\""), EvalValue::Int(1));
        assert_eq!(eval_str(&rt, "\"a\" != \"b\""), EvalValue::Int(1));
    }

    #[test]
    fn test_identifier_lookup() {
        let mut rt = Runtime::new();
        rt.declare("x", "int", "4").unwrap();
        assert_eq!(eval_str(&rt, "x * x"), EvalValue::Int(16));
    }

    #[test]
    fn test_string_variable_shares_heap_slot() {
        let mut rt = Runtime::new();
        rt.declare("s", "str", "\"hello\"").unwrap();
        let id = rt.lookup("s").unwrap().heap_id().unwrap();
        assert_eq!(eval_str(&rt, "s"), EvalValue::SharedStr(id));
    }

    #[test]
    fn test_undeclared_name() {
        let rt = Runtime::new();
        assert_eq!(
            evaluate(&rt, "ghost + 1"),
            Err(RuntimeError::UndeclaredName {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_division_by_zero() {
        let rt = Runtime::new();
        assert_eq!(evaluate(&rt, "1 / 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(evaluate(&rt, "1 % 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(evaluate(&rt, "1.5 % 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(evaluate(&rt, "1.5 % 0.0"), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let rt = Runtime::new();
        assert_eq!(
            evaluate(&rt, "9223372036854775807 + 1"),
            Err(RuntimeError::IntegerOverflow {
                op: "+".to_string()
            })
        );
        assert_eq!(
            evaluate(&rt, "9223372036854775807 * 2"),
            Err(RuntimeError::IntegerOverflow {
                op: "*".to_string()
            })
        );
        assert_eq!(
            evaluate(&rt, "0 - 9223372036854775807 - 2"),
            Err(RuntimeError::IntegerOverflow {
                op: "-".to_string()
            })
        );
    }

    #[test]
    fn test_type_mismatch() {
        let rt = Runtime::new();
        assert!(matches!(
            evaluate(&rt, "\"a\" * 2"),
            Err(RuntimeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_expressions() {
        let rt = Runtime::new();
        assert_eq!(evaluate(&rt, ""), Err(RuntimeError::EmptyExpression));
        assert!(evaluate(&rt, "1 +").is_err());
        assert!(evaluate(&rt, "1 2").is_err());
    }
}
