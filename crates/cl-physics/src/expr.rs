//! A minimal arithmetic expression evaluator.
//!
//! Supports `+ - * /`, unary minus, parentheses, float literals, and
//! identifiers resolved from the caller's bindings. This is the shipped
//! [`ConstraintEvaluator`] backend; richer languages can be injected without
//! touching the engine.

use crate::error::{PhysicsError, PhysicsResult};
use crate::eval::ConstraintEvaluator;

/// Stateless evaluator over the minimal expression grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl ConstraintEvaluator for ExprEvaluator {
    fn evaluate(&self, expr: &str, bindings: &[(&str, f64)]) -> PhysicsResult<f64> {
        let mut parser = Parser {
            source: expr,
            chars: expr.char_indices().peekable(),
            bindings,
        };
        let value = parser.expression()?;
        parser.skip_whitespace();
        match parser.chars.peek() {
            None => Ok(value),
            Some((i, c)) => Err(PhysicsError::Parse {
                expr: expr.to_string(),
                what: format!("unexpected `{c}` at offset {i}"),
            }),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    bindings: &'a [(&'a str, f64)],
}

impl<'a> Parser<'a> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if matches!(self.chars.peek(), Some((_, c)) if *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn error(&self, what: impl Into<String>) -> PhysicsError {
        PhysicsError::Parse {
            expr: self.source.to_string(),
            what: what.into(),
        }
    }

    fn expression(&mut self) -> PhysicsResult<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> PhysicsResult<f64> {
        let mut value = self.factor()?;
        loop {
            if self.eat('*') {
                value *= self.factor()?;
            } else if self.eat('/') {
                // Division by zero follows IEEE-754 (inf/NaN), not an error:
                // the sweep engines treat non-finite configs as infeasible.
                value /= self.factor()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn factor(&mut self) -> PhysicsResult<f64> {
        if self.eat('-') {
            return Ok(-self.factor()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> PhysicsResult<f64> {
        self.skip_whitespace();
        if self.eat('(') {
            let value = self.expression()?;
            if !self.eat(')') {
                return Err(self.error("missing closing parenthesis"));
            }
            return Ok(value);
        }

        match self.chars.peek().copied() {
            Some((start, c)) if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                while let Some((i, c)) = self.chars.peek().copied() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
                        end = i + c.len_utf8();
                        self.chars.next();
                        // Exponent sign directly after e/E.
                        if (c == 'e' || c == 'E')
                            && matches!(self.chars.peek(), Some((_, s)) if *s == '+' || *s == '-')
                            && let Some((i, s)) = self.chars.next()
                        {
                            end = i + s.len_utf8();
                        }
                    } else {
                        break;
                    }
                }
                self.source[start..end]
                    .parse::<f64>()
                    .map_err(|e| self.error(format!("bad number literal: {e}")))
            }
            Some((start, c)) if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some((i, c)) = self.chars.peek().copied() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                let name = &self.source[start..end];
                self.bindings
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| PhysicsError::UnknownVariable {
                        name: name.to_string(),
                    })
            }
            Some((i, c)) => Err(self.error(format!("unexpected `{c}` at offset {i}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str, bindings: &[(&str, f64)]) -> f64 {
        ExprEvaluator.evaluate(expr, bindings).unwrap()
    }

    #[test]
    fn literals_and_precedence() {
        assert_eq!(eval("0", &[]), 0.0);
        assert_eq!(eval("2 + 3 * 4", &[]), 14.0);
        assert_eq!(eval("(2 + 3) * 4", &[]), 20.0);
        assert_eq!(eval("1e-2", &[]), 0.01);
        assert_eq!(eval("-x", &[("x", 5.0)]), -5.0);
    }

    #[test]
    fn sweep_style_constraints() {
        assert_eq!(eval("x", &[("x", 10.0)]), 10.0);
        assert_eq!(eval("60 - x - y", &[("x", 10.0), ("y", 20.0)]), 30.0);
        assert_eq!(eval("y", &[("x", 1.0), ("y", 2.0)]), 2.0);
    }

    #[test]
    fn unknown_variable_is_reported() {
        let err = ExprEvaluator.evaluate("a + 1", &[("x", 0.0)]).unwrap_err();
        assert_eq!(
            err,
            PhysicsError::UnknownVariable { name: "a".into() }
        );
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(ExprEvaluator.evaluate("1 2", &[]).is_err());
        assert!(ExprEvaluator.evaluate("(1", &[]).is_err());
        assert!(ExprEvaluator.evaluate("", &[]).is_err());
    }

    #[test]
    fn division_follows_ieee() {
        assert!(eval("1 / 0", &[]).is_infinite());
    }

    proptest::proptest! {
        #[test]
        fn bindings_resolve_exactly(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            proptest::prop_assert_eq!(eval("x + y", &[("x", a), ("y", b)]), a + b);
            proptest::prop_assert_eq!(eval("x", &[("x", a), ("y", b)]), a);
        }
    }
}
