//! Comparison operators for `where_op`.
//!
//! The [`Op`] enum covers loose and strict equality plus the relational
//! operators. Operators parse from their usual tokens (`"=="`, `"!=="`, ...).

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;

use crate::compare::{loose_cmp, loose_eq, strict_eq};
use crate::error::CollectError;

/// Comparison operator for a `where` clause.
///
/// - **Equality**: `Eq` (loose), `StrictEq`, `Ne` (loose), `StrictNe`
/// - **Relational**: `Lt`, `Lte`, `Gt`, `Gte`, evaluated with loose coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    /// Loose equality (`=` or `==`). The default operator.
    #[default]
    Eq,
    /// Strict equality (`===`).
    StrictEq,
    /// Loose inequality (`!=`).
    Ne,
    /// Strict inequality (`!==`).
    StrictNe,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Lte,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Gte,
}

impl Op {
    /// Evaluates the operator given an ordering result.
    ///
    /// An ordering cannot tell kinds apart, so the strict operators always
    /// evaluate to `false` here; use [`Op::eval`] for values.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Evaluates `left <op> right`.
    ///
    /// Relational operators are false when the operands have no ordering
    /// (a non-numeric string against a number, for instance).
    pub fn eval(self, left: &Value, right: &Value) -> bool {
        match self {
            Op::Eq => loose_eq(left, right),
            Op::Ne => !loose_eq(left, right),
            Op::StrictEq => strict_eq(left, right),
            Op::StrictNe => !strict_eq(left, right),
            Op::Lt | Op::Lte | Op::Gt | Op::Gte => {
                loose_cmp(left, right).is_some_and(|ordering| self.eval_ordering(ordering))
            }
        }
    }

    /// Returns the token for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::StrictEq => "===",
            Op::Ne => "!=",
            Op::StrictNe => "!==",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
        }
    }
}

impl FromStr for Op {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Op::Eq),
            "===" => Ok(Op::StrictEq),
            "!=" | "<>" => Ok(Op::Ne),
            "!==" => Ok(Op::StrictNe),
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Lte),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Gte),
            other => Err(CollectError::UnknownOperator(other.to_string())),
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
