//! Formula evaluation.
//!
//! Evaluation walks the validated token stream once with an operand stack
//! and an operator stack. Multiplicative operators are applied as soon as
//! their right operand is known; additive operators are applied when the
//! next additive operator, a closing parenthesis, or the end of input shows
//! up. Failures are reported as [`EvalError`] values rather than panics, so a
//! sheet can hold some cells in error state while the rest stay usable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formula::{Formula, Op, Token};

/// Why a formula could not produce a number.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalError {
    #[error("Undefined variable {0}")]
    UndefinedVariable(String),

    #[error("Division by zero")]
    DivideByZero,
}

impl EvalError {
    /// Human-readable reason, suitable for display in a cell.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Entries on the operator stack.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Op(Op),
    LParen,
}

fn apply(op: Op, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    match op {
        Op::Add => Ok(lhs + rhs),
        Op::Sub => Ok(lhs - rhs),
        Op::Mul => Ok(lhs * rhs),
        Op::Div if rhs == 0.0 => Err(EvalError::DivideByZero),
        Op::Div => Ok(lhs / rhs),
    }
}

struct Stacks {
    values: Vec<f64>,
    ops: Vec<Pending>,
}

impl Stacks {
    fn top_op(&self) -> Option<Op> {
        match self.ops.last() {
            Some(Pending::Op(op)) => Some(*op),
            _ => None,
        }
    }

    /// Validation guarantees every operator has both operands on the stack
    /// by the time it is applied, so an empty stack here is a bug.
    fn pop_value(&mut self) -> f64 {
        self.values
            .pop()
            .expect("validated formula keeps the operand stack non-empty")
    }

    /// A pending `*` or `/` is applied as soon as its right operand arrives.
    fn push_operand(&mut self, value: f64) -> Result<(), EvalError> {
        self.values.push(value);
        self.reduce_if(Op::is_multiplicative)
    }

    /// Pop the top operator if `wanted` accepts it and fold the top two
    /// operands with it.
    fn reduce_if(&mut self, wanted: impl Fn(Op) -> bool) -> Result<(), EvalError> {
        if let Some(op) = self.top_op()
            && wanted(op)
        {
            self.ops.pop();
            let rhs = self.pop_value();
            let lhs = self.pop_value();
            self.values.push(apply(op, lhs, rhs)?);
        }
        Ok(())
    }
}

impl Formula {
    /// Evaluate the formula. `lookup` receives normalized variable names and
    /// returns `None` for anything undefined.
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, EvalError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut stacks = Stacks {
            values: Vec::new(),
            ops: Vec::new(),
        };

        for token in self.tokens() {
            match token {
                Token::Number(n) => stacks.push_operand(*n)?,
                Token::Variable(name) => {
                    let value =
                        lookup(name).ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?;
                    stacks.push_operand(value)?;
                }
                Token::Op(op) if op.is_multiplicative() => stacks.ops.push(Pending::Op(*op)),
                Token::Op(op) => {
                    stacks.reduce_if(|top| !top.is_multiplicative())?;
                    stacks.ops.push(Pending::Op(*op));
                }
                Token::LParen => stacks.ops.push(Pending::LParen),
                Token::RParen => {
                    stacks.reduce_if(|top| !top.is_multiplicative())?;
                    if stacks.ops.last() == Some(&Pending::LParen) {
                        stacks.ops.pop();
                    }
                    stacks.reduce_if(Op::is_multiplicative)?;
                }
            }
        }

        stacks.reduce_if(|top| !top.is_multiplicative())?;
        Ok(stacks.pop_value())
    }
}
