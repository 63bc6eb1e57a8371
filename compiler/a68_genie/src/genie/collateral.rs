//! Collateral and parallel clauses.
//!
//! A collateral clause evaluates its units left to right. What happens to
//! the values depends on the clause's mode:
//!
//! - `VOID`: discarded
//! - a structure: packed into one structure value, field by field
//! - a one-dimensional row: a row display with bounds `[1:n]`
//! - an `n`-dimensional row: each unit yields an `(n-1)`-dimensional row;
//!   all must have identical bounds, and a new leading dimension `[1:k]`
//!   is prepended
//! - `STRING`: the characters (or strings) concatenated
//!
//! An empty display builds a well-formed empty row.

use std::rc::Rc;

use a68_ir::{Mode, ModeId, NodeId, NodeKind};
use smallvec::SmallVec;

use super::Genie;
use crate::errors::{ragged_display, unknown_node_kind, value_mismatch, Fault, GenieResult};
use crate::value::{Bounds, RowValue, Value};

impl Genie<'_> {
    pub(crate) fn eval_collateral(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::Collateral { units } = program.tree.kind(node) else {
            return Err(unknown_node_kind("collateral clause").into());
        };
        let mode = program.tree.mode(node);
        let baseline = self.stack.sp();
        for &unit in program.tree.list(units) {
            self.eval_unit(unit)?;
        }
        if mode == ModeId::VOID {
            self.stack.truncate(baseline);
            return Ok(());
        }
        let values = self.stack.pop_n(self.stack.sp() - baseline)?;
        let aggregate = self.aggregate(mode, values)?;
        self.stack.push(aggregate)?;
        Ok(())
    }

    /// `PAR (a, b, c)`. Units run one after another.
    pub(crate) fn eval_parallel(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::Parallel { units } = program.tree.kind(node) else {
            return Err(unknown_node_kind("parallel clause").into());
        };
        tracing::warn!(
            units = units.len(),
            "parallel clause runs its units sequentially"
        );
        let baseline = self.stack.sp();
        for &unit in program.tree.list(units) {
            self.eval_unit(unit)?;
            self.stack.truncate(baseline);
        }
        Ok(())
    }

    fn aggregate(&self, mode: ModeId, values: Vec<Value>) -> Result<Value, Fault> {
        match self.program.modes.get(mode) {
            Mode::Struct(_) => Ok(Value::Struct(Rc::new(values))),
            Mode::Row { dims: 1, .. } => Ok(Value::Row(RowValue::vector(values))),
            Mode::Row { dims, .. } => stack_rows(usize::from(*dims), values).map(Value::Row),
            Mode::String => {
                let mut text = String::new();
                for value in &values {
                    match value {
                        Value::Char(c) => text.push(*c),
                        Value::Str(s) => text.push_str(s),
                        other => return Err(value_mismatch("CHAR", other)),
                    }
                }
                Ok(Value::string(&text))
            }
            _ => match <[Value; 1]>::try_from(values) {
                Ok([single]) => Ok(single),
                Err(values) => Err(value_mismatch(
                    "row or structure display",
                    values.first().unwrap_or(&Value::Void),
                )),
            },
        }
    }
}

/// Build a `dims`-dimensional row from `(dims - 1)`-dimensional rows of
/// identical bounds.
fn stack_rows(dims: usize, values: Vec<Value>) -> Result<RowValue, Fault> {
    if values.is_empty() {
        return Ok(RowValue::empty(dims));
    }
    let count = values.len();
    let mut inner: Option<SmallVec<[Bounds; 2]>> = None;
    let mut elements = Vec::new();
    for value in values {
        let row = value.into_row()?;
        match &inner {
            Some(bounds) if *bounds != row.dims => return Err(ragged_display()),
            Some(_) => {}
            None => inner = Some(row.dims.clone()),
        }
        elements.extend(row.elements.iter().cloned());
    }
    let mut bounds: SmallVec<[Bounds; 2]> = SmallVec::with_capacity(dims);
    bounds.push(Bounds::new(1, i64::try_from(count).unwrap_or(i64::MAX)));
    bounds.extend(inner.unwrap_or_default());
    Ok(RowValue::new(bounds, elements))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::errors::FaultKind;
    use pretty_assertions::assert_eq;

    fn vector(values: &[i64]) -> Value {
        Value::Row(RowValue::vector(values.iter().map(|&n| Value::Int(n)).collect()))
    }

    #[test]
    fn rows_stack_into_a_new_leading_dimension() {
        let matrix = stack_rows(2, vec![vector(&[1, 2, 3]), vector(&[4, 5, 6])]).unwrap();
        assert_eq!(
            matrix.dims.as_slice(),
            &[Bounds::new(1, 2), Bounds::new(1, 3)]
        );
        assert_eq!(matrix.elements[4], Value::Int(5));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = stack_rows(2, vec![vector(&[1, 2]), vector(&[3])]).unwrap_err();
        assert_eq!(err.kind, FaultKind::RaggedDisplay);
    }

    #[test]
    fn empty_display_is_well_formed() {
        let empty = stack_rows(3, Vec::new()).unwrap();
        assert_eq!(empty.dimensions(), 3);
        assert!(empty.is_empty());
    }
}
