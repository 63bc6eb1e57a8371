//! Coercions inserted by the mode checker.

use a68_ir::{CoercionKind, Mode, ModeId, NodeId};
use smallvec::SmallVec;

use super::Genie;
use crate::errors::{value_mismatch, GenieResult};
use crate::value::{Bounds, RowValue, Value};

impl Genie<'_> {
    pub(crate) fn eval_coercion(
        &mut self,
        node: NodeId,
        kind: CoercionKind,
        operand: NodeId,
    ) -> GenieResult {
        let baseline = self.stack.sp();
        self.eval_unit(operand)?;
        let target = self.program.tree.mode(node);
        match kind {
            CoercionKind::Void => {
                self.stack.truncate(baseline);
                Ok(())
            }
            CoercionKind::Deprocedure => {
                let routine = self.stack.pop()?;
                self.call_value(routine, Vec::new(), node)
            }
            CoercionKind::Dereference => {
                let name = self.stack.pop()?;
                let value = name.as_ref_value()?.get()?;
                self.stack.push(value)?;
                Ok(())
            }
            CoercionKind::Unite => {
                let value = self.stack.pop()?;
                let united = match value {
                    union @ Value::Union { .. } => union,
                    value => Value::Union {
                        variant: self.program.tree.mode(operand),
                        payload: Box::new(value),
                    },
                };
                self.stack.push(united)?;
                Ok(())
            }
            CoercionKind::Widen => {
                let value = match self.stack.pop()? {
                    #[expect(clippy::cast_precision_loss, reason = "INT widens to REAL")]
                    Value::Int(n) => Value::Real(n as f64),
                    value @ Value::Real(_) => value,
                    other => return Err(value_mismatch("INT or REAL", &other).into()),
                };
                self.stack.push(value)?;
                Ok(())
            }
            CoercionKind::Row => {
                let value = self.stack.pop()?;
                let rowed = self.rowed(target, value);
                self.stack.push(rowed)?;
                Ok(())
            }
        }
    }

    /// Row a value into `target`: a scalar becomes `[1:1]`, an
    /// `n`-dimensional row gains a leading `[1:1]` dimension.
    fn rowed(&self, target: ModeId, value: Value) -> Value {
        match (self.program.modes.get(target), value) {
            (Mode::String, Value::Char(c)) => Value::string(&c.to_string()),
            (Mode::Row { dims, .. }, Value::Row(row))
                if usize::from(*dims) == row.dimensions() + 1 =>
            {
                let mut bounds: SmallVec<[Bounds; 2]> = SmallVec::with_capacity(row.dims.len() + 1);
                bounds.push(Bounds::new(1, 1));
                bounds.extend(row.dims.iter().copied());
                Value::Row(RowValue {
                    dims: bounds,
                    elements: row.elements,
                })
            }
            (_, value) => Value::Row(RowValue::vector(vec![value])),
        }
    }
}
