//! Formulas: standard operators and user-defined operator calls.
//!
//! Both operands are evaluated left to right before the operator runs.
//! A user-defined operator is a routine bound to a slot and is called like
//! any other routine. The standard operators are pure functions of their
//! operand values; INT arithmetic is checked, and overflow or division by
//! zero is a runtime fault.

use std::borrow::Cow;
use std::cmp::Ordering;

use a68_ir::{NodeId, Operator, StdOp};

use super::Genie;
use crate::errors::{
    division_by_zero, index_out_of_bounds, integer_overflow, negative_exponent, object_too_large,
    value_mismatch, Fault, GenieResult,
};
use crate::value::Value;

impl Genie<'_> {
    pub(crate) fn eval_formula(
        &mut self,
        node: NodeId,
        op: Operator,
        left: NodeId,
        right: NodeId,
    ) -> GenieResult {
        self.eval_unit(left)?;
        self.eval_unit(right)?;
        let right = self.stack.pop()?;
        let left = self.stack.pop()?;
        match op {
            Operator::Standard(op) => {
                let value = dyadic(op, left, right, self.config.max_object_size)?;
                self.stack.push(value)?;
                Ok(())
            }
            Operator::User(slot) => {
                let routine = self.frames.load(slot)?;
                self.call_value(routine, vec![left, right], node)
            }
        }
    }

    pub(crate) fn eval_monadic(
        &mut self,
        node: NodeId,
        op: Operator,
        operand: NodeId,
    ) -> GenieResult {
        self.eval_unit(operand)?;
        let operand = self.stack.pop()?;
        match op {
            Operator::Standard(op) => {
                let value = monadic(op, operand)?;
                self.stack.push(value)?;
                Ok(())
            }
            Operator::User(slot) => {
                let routine = self.frames.load(slot)?;
                self.call_value(routine, vec![operand], node)
            }
        }
    }
}

fn compare(op: StdOp, ordering: Option<Ordering>) -> Option<bool> {
    let result = match op {
        StdOp::Eq => ordering == Some(Ordering::Equal),
        StdOp::Ne => ordering != Some(Ordering::Equal),
        StdOp::Lt => ordering == Some(Ordering::Less),
        StdOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        StdOp::Gt => ordering == Some(Ordering::Greater),
        StdOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(result)
}

#[expect(clippy::cast_precision_loss, reason = "INT widens to REAL")]
fn widen(n: i64) -> f64 {
    n as f64
}

fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Str(s) => Some(Cow::Borrowed(s)),
        Value::Char(c) => Some(Cow::Owned(c.to_string())),
        _ => None,
    }
}

/// Apply a standard dyadic operator. Strings it builds hold at most
/// `max_size` characters.
pub(crate) fn dyadic(
    op: StdOp,
    left: Value,
    right: Value,
    max_size: usize,
) -> Result<Value, Fault> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => int_dyadic(op, *a, *b),
        (Value::Real(a), Value::Real(b)) => real_dyadic(op, *a, *b),
        (Value::Int(a), Value::Real(b)) => real_dyadic(op, widen(*a), *b),
        (Value::Real(a), Value::Int(b)) if op == StdOp::Pow => Ok(Value::Real(
            i32::try_from(*b).map_or_else(|_| a.powf(widen(*b)), |e| a.powi(e)),
        )),
        (Value::Real(a), Value::Int(b)) => real_dyadic(op, *a, widen(*b)),
        (Value::Bool(a), Value::Bool(b)) => match op {
            StdOp::And => Ok(Value::Bool(*a && *b)),
            StdOp::Or => Ok(Value::Bool(*a || *b)),
            StdOp::Eq => Ok(Value::Bool(a == b)),
            StdOp::Ne => Ok(Value::Bool(a != b)),
            _ => Err(value_mismatch("INT or REAL operands", &left)),
        },
        (Value::Int(n), Value::Str(_) | Value::Char(_)) if op == StdOp::Mul => {
            repeat(&right, *n, max_size)
        }
        (Value::Str(_) | Value::Char(_), Value::Int(n)) if op == StdOp::Mul => {
            repeat(&left, *n, max_size)
        }
        (Value::Int(d), _) if matches!(op, StdOp::Upb | StdOp::Lwb | StdOp::Elem) => {
            row_query(op, *d, right.clone())
        }
        _ => match (text(&left), text(&right)) {
            (Some(a), Some(b)) => string_dyadic(op, &a, &b, &left, max_size),
            _ => Err(value_mismatch("operands of matching modes", &left)),
        },
    }
}

fn int_dyadic(op: StdOp, a: i64, b: i64) -> Result<Value, Fault> {
    let checked = |r: Option<i64>| {
        r.map(Value::Int)
            .ok_or_else(|| integer_overflow(op.as_symbol()))
    };
    match op {
        StdOp::Add => checked(a.checked_add(b)),
        StdOp::Sub => checked(a.checked_sub(b)),
        StdOp::Mul => checked(a.checked_mul(b)),
        StdOp::Over if b == 0 => Err(division_by_zero()),
        StdOp::Over => checked(a.checked_div(b)),
        StdOp::Mod if b == 0 => Err(division_by_zero()),
        StdOp::Mod => checked(a.checked_rem_euclid(b)),
        StdOp::Div if b == 0 => Err(division_by_zero()),
        StdOp::Div => Ok(Value::Real(widen(a) / widen(b))),
        StdOp::Pow if b < 0 => Err(negative_exponent(b)),
        StdOp::Pow => checked(u32::try_from(b).ok().and_then(|e| a.checked_pow(e))),
        _ => compare(op, Some(a.cmp(&b)))
            .map(Value::Bool)
            .ok_or_else(|| value_mismatch("BOOL operands", &Value::Int(a))),
    }
}

fn real_dyadic(op: StdOp, a: f64, b: f64) -> Result<Value, Fault> {
    match op {
        StdOp::Add => Ok(Value::Real(a + b)),
        StdOp::Sub => Ok(Value::Real(a - b)),
        StdOp::Mul => Ok(Value::Real(a * b)),
        StdOp::Div if b == 0.0 => Err(division_by_zero()),
        StdOp::Div => Ok(Value::Real(a / b)),
        StdOp::Pow => Ok(Value::Real(a.powf(b))),
        _ => compare(op, a.partial_cmp(&b))
            .map(Value::Bool)
            .ok_or_else(|| value_mismatch("INT operands", &Value::Real(a))),
    }
}

fn string_dyadic(
    op: StdOp,
    a: &str,
    b: &str,
    left: &Value,
    max_size: usize,
) -> Result<Value, Fault> {
    match op {
        StdOp::Add | StdOp::Concat => {
            checked_size(a.chars().count() + b.chars().count(), max_size)?;
            Ok(Value::string(&format!("{a}{b}")))
        }
        _ => compare(op, Some(a.cmp(b)))
            .map(Value::Bool)
            .ok_or_else(|| value_mismatch("STRING operands", left)),
    }
}

fn repeat(value: &Value, times: i64, max_size: usize) -> Result<Value, Fault> {
    let text = text(value).ok_or_else(|| value_mismatch("STRING", value))?;
    let times = usize::try_from(times).unwrap_or(0);
    let size = text
        .chars()
        .count()
        .checked_mul(times)
        .ok_or_else(|| object_too_large(max_size))?;
    checked_size(size, max_size)?;
    Ok(Value::string(&text.repeat(times)))
}

fn checked_size(size: usize, max_size: usize) -> Result<(), Fault> {
    if size > max_size {
        return Err(object_too_large(max_size));
    }
    Ok(())
}

/// `d UPB r`, `d LWB r`, `i ELEM s`.
fn row_query(op: StdOp, index: i64, operand: Value) -> Result<Value, Fault> {
    if op == StdOp::Elem {
        let row = operand.into_row()?;
        let flat = row.flat_index(&[index])?;
        return Ok(row.elements[flat].clone());
    }
    let row = operand.into_row()?;
    let dims = i64::try_from(row.dimensions()).unwrap_or(i64::MAX);
    let bounds = index
        .checked_sub(1)
        .and_then(|d| usize::try_from(d).ok())
        .and_then(|d| row.dims.get(d))
        .ok_or_else(|| index_out_of_bounds(index, 1, dims))?;
    Ok(Value::Int(if op == StdOp::Upb {
        bounds.upper
    } else {
        bounds.lower
    }))
}

/// Apply a standard monadic operator.
pub(crate) fn monadic(op: StdOp, operand: Value) -> Result<Value, Fault> {
    match (op, operand) {
        (StdOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("-")),
        (StdOp::Neg, Value::Real(r)) => Ok(Value::Real(-r)),
        (StdOp::Plus, value @ (Value::Int(_) | Value::Real(_))) => Ok(value),
        (StdOp::Abs, Value::Int(n)) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("ABS")),
        (StdOp::Abs, Value::Real(r)) => Ok(Value::Real(r.abs())),
        (StdOp::Abs, Value::Bool(b)) => Ok(Value::Int(i64::from(b))),
        (StdOp::Abs, Value::Char(c)) => Ok(Value::Int(i64::from(u32::from(c)))),
        (StdOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (StdOp::Upb | StdOp::Lwb, Value::Ref(name)) => monadic(op, name.get()?),
        (StdOp::Upb | StdOp::Lwb, operand) => row_query(op, 1, operand),
        (_, operand) => Err(value_mismatch("operand of a monadic operator", &operand)),
    }
}
