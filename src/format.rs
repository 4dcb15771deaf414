//! Display formatting for numeric cells, with `NA` for missing data.

use anyhow::{Result, bail};
use std::fmt;
use std::str::FromStr;

pub const NA: &str = "NA";

/// An integer-truncated value, or the `NA` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntValue {
    Int(i64),
    Na,
}

impl IntValue {
    pub fn is_na(self) -> bool {
        matches!(self, IntValue::Na)
    }

    /// `$` followed by the amount, or `NA`.
    pub fn dollars(self) -> String {
        match self {
            IntValue::Int(n) => format!("${n}"),
            IntValue::Na => NA.to_string(),
        }
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntValue::Int(n) => write!(f, "{n}"),
            IntValue::Na => f.write_str(NA),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
}

impl FromStr for Op {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Op::Add),
            "subtract" => Ok(Op::Subtract),
            other => bail!("operation should be either \"add\" or \"subtract\", got \"{other}\""),
        }
    }
}

/// Truncates toward zero; missing or non-finite input yields `NA`.
pub fn int_value(x: Option<f64>) -> IntValue {
    match x {
        Some(v) if v.is_finite() => IntValue::Int(v.trunc() as i64),
        _ => IntValue::Na,
    }
}

/// Truncates both operands, then adds or subtracts them. `NA` if either is.
pub fn int_value_op(x: Option<f64>, y: Option<f64>, op: Op) -> IntValue {
    match (int_value(x), int_value(y)) {
        (IntValue::Int(a), IntValue::Int(b)) => IntValue::Int(match op {
            Op::Add => a.saturating_add(b),
            Op::Subtract => a.saturating_sub(b),
        }),
        _ => IntValue::Na,
    }
}

/// One decimal place, or `NA`.
pub fn rate(x: Option<f64>) -> String {
    match x {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => NA.to_string(),
    }
}

/// `$` followed by the truncated amount, or `NA`.
pub fn dollars(x: Option<f64>) -> String {
    int_value(x).dollars()
}
