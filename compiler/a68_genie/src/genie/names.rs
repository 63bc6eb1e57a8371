//! Names: generators, variable declarations, assignations, field
//! selection and identity relations.

use a68_ir::{Mode, ModeId, NodeId, NodeKind, NodeRange, Slot};
use smallvec::SmallVec;

use super::Genie;
use crate::errors::{
    nil_access, object_too_large, undefined_value, value_mismatch, Fault, GenieResult,
};
use crate::value::{Bounds, RefValue, RowValue, Value};

impl Genie<'_> {
    /// `LOC m` / `HEAP m`, with row bounds for `[l:u] m`. Yields a fresh
    /// name of mode `mode` (a `REF`).
    pub(crate) fn eval_generator(
        &mut self,
        mode: ModeId,
        heap: bool,
        bounds: NodeRange,
    ) -> GenieResult {
        let program = self.program;
        let target = match program.modes.get(mode) {
            Mode::Ref(inner) => *inner,
            _ => mode,
        };
        let mut dims: SmallVec<[Bounds; 2]> = SmallVec::new();
        for &bound in program.tree.list(bounds) {
            let (lower, upper) = match program.tree.kind(bound) {
                NodeKind::Bound { lower, upper } => (lower, upper),
                _ => (NodeId::INVALID, bound),
            };
            let lower = self.optional_int(lower, 1)?;
            let upper = self.optional_int(upper, 0)?;
            dims.push(Bounds::new(lower, upper));
        }
        tracing::trace!(heap, dims = dims.len(), "generator");
        let initial = self.initial_value(target, dims)?;
        self.stack.push(Value::Ref(RefValue::new(initial)))?;
        Ok(())
    }

    /// Undefined contents of a new location, with rows allocated to their
    /// bounds.
    fn initial_value(&self, mode: ModeId, dims: SmallVec<[Bounds; 2]>) -> Result<Value, Fault> {
        let modes = &self.program.modes;
        match modes.get(mode) {
            Mode::Row { dims: n, element } if usize::from(*n) == dims.len() => {
                let limit = self.config.max_object_size;
                let count = dims
                    .iter()
                    .try_fold(1usize, |count, b| count.checked_mul(b.len()))
                    .filter(|&count| count <= limit)
                    .ok_or_else(|| object_too_large(limit))?;
                let elements = (0..count)
                    .map(|_| Value::undefined(*element, modes))
                    .collect();
                Ok(Value::Row(RowValue::new(dims, elements)))
            }
            _ => Ok(Value::undefined(mode, modes)),
        }
    }

    /// `m x := init`: bind a fresh name, then assign the initial value.
    pub(crate) fn declare_variable(
        &mut self,
        slot: Slot,
        generator: NodeId,
        init: NodeId,
    ) -> GenieResult {
        self.eval_unit(generator)?;
        let name = self.stack.pop()?;
        let location = name.as_ref_value()?.clone();
        self.frames.store(slot, name)?;
        if init.is_valid() {
            self.eval_unit(init)?;
            let value = self.stack.pop()?;
            location.set(value)?;
        }
        Ok(())
    }

    /// `destination := source`, yielding the destination name.
    pub(crate) fn eval_assignation(&mut self, destination: NodeId, source: NodeId) -> GenieResult {
        self.eval_unit(destination)?;
        self.eval_unit(source)?;
        let value = self.stack.pop()?;
        let name = self.stack.pop()?;
        name.as_ref_value()?.set(value)?;
        self.stack.push(name)?;
        Ok(())
    }

    pub(crate) fn eval_selection(&mut self, field: u16, secondary: NodeId) -> GenieResult {
        self.eval_unit(secondary)?;
        let value = self.stack.pop()?;
        let selected = select(value, field)?;
        self.stack.push(selected)?;
        Ok(())
    }

    /// `a IS b` / `a ISNT b`: identity of names.
    pub(crate) fn eval_identity_relation(
        &mut self,
        is: bool,
        left: NodeId,
        right: NodeId,
    ) -> GenieResult {
        self.eval_unit(left)?;
        self.eval_unit(right)?;
        let right = self.stack.pop()?;
        let left = self.stack.pop()?;
        let same = match (&left, &right) {
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Ref(_) | Value::Nil, Value::Ref(_) | Value::Nil) => false,
            (Value::Ref(_) | Value::Nil, other) | (other, _) => {
                return Err(value_mismatch("REF", other).into());
            }
        };
        self.stack.push(Value::Bool(same == is))?;
        Ok(())
    }
}

/// Field `field` of a structure; through a name, the field's name; of a
/// row of structures, the row of that field.
fn select(value: Value, field: u16) -> Result<Value, Fault> {
    match value {
        Value::Struct(fields) => fields
            .get(usize::from(field))
            .cloned()
            .ok_or_else(|| value_mismatch("structure field", &Value::Struct(fields.clone()))),
        Value::Ref(name) => Ok(Value::Ref(name.field(field))),
        Value::Row(row) => {
            let elements = row
                .elements
                .iter()
                .map(|element| select(element.clone(), field))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Row(RowValue::new(row.dims.clone(), elements)))
        }
        Value::Nil => Err(nil_access()),
        Value::Undefined(_) => Err(undefined_value("STRUCT")),
        other => Err(value_mismatch("STRUCT", &other)),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::errors::FaultKind;
    use pretty_assertions::assert_eq;

    fn point() -> Value {
        Value::Struct(Rc::new(vec![Value::Int(3), Value::Int(4)]))
    }

    #[test]
    fn select_from_structure_value() {
        assert_eq!(select(point(), 1).unwrap(), Value::Int(4));
    }

    #[test]
    fn select_through_name_assigns_in_place() {
        let name = RefValue::new(point());
        let Value::Ref(y) = select(Value::Ref(name.clone()), 1).unwrap() else {
            panic!("expected a name");
        };
        y.set(Value::Int(40)).unwrap();
        assert_eq!(select(name.get().unwrap(), 1).unwrap(), Value::Int(40));
    }

    #[test]
    fn multiple_selection_over_rows() {
        let row = Value::Row(RowValue::vector(vec![point(), point()]));
        let Value::Row(xs) = select(row, 0).unwrap() else {
            panic!("expected a row");
        };
        assert_eq!(*xs.elements, vec![Value::Int(3), Value::Int(3)]);
    }

    #[test]
    fn select_through_nil_faults() {
        assert_eq!(select(Value::Nil, 0).unwrap_err().kind, FaultKind::NilAccess);
    }
}
