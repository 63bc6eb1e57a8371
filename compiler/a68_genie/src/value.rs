//! Run-time values.
//!
//! Values are cheap to clone: strings, rows and structures share their
//! storage through `Rc` and copy on write. Names (`REF` values) are a shared
//! cell plus a path of field/element steps into it, so a reference to a row
//! element or a structure field stays valid while its container is updated.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use a68_ir::{Mode, ModeId, ModeTable, NodeId, StdProc};
use smallvec::SmallVec;

use crate::errors::{index_out_of_bounds, nil_access, undefined_value, value_mismatch, Fault};

/// Bounds of one row dimension. Empty when `upper < lower`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub lower: i64,
    pub upper: i64,
}

impl Bounds {
    #[inline]
    pub const fn new(lower: i64, upper: i64) -> Self {
        Bounds { lower, upper }
    }

    /// Number of elements in this dimension.
    #[inline]
    pub fn len(self) -> usize {
        let n = i128::from(self.upper) - i128::from(self.lower) + 1;
        usize::try_from(n.max(0)).unwrap_or(usize::MAX)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.upper < self.lower
    }

    #[inline]
    pub fn contains(self, index: i64) -> bool {
        self.lower <= index && index <= self.upper
    }
}

/// Row descriptor: bounds per dimension over row-major element storage.
#[derive(Clone, Debug, PartialEq)]
pub struct RowValue {
    pub dims: SmallVec<[Bounds; 2]>,
    pub elements: Rc<Vec<Value>>,
}

impl RowValue {
    /// One-dimensional row `[1:n]`.
    pub fn vector(elements: Vec<Value>) -> Self {
        let n = i64::try_from(elements.len()).unwrap_or(i64::MAX);
        RowValue {
            dims: SmallVec::from_slice(&[Bounds::new(1, n)]),
            elements: Rc::new(elements),
        }
    }

    /// Well-formed empty row: `[1:0]` in every dimension.
    pub fn empty(dims: usize) -> Self {
        RowValue {
            dims: std::iter::repeat(Bounds::new(1, 0)).take(dims.max(1)).collect(),
            elements: Rc::new(Vec::new()),
        }
    }

    pub fn new(dims: SmallVec<[Bounds; 2]>, elements: Vec<Value>) -> Self {
        debug_assert_eq!(
            dims.iter().map(|b| b.len()).product::<usize>(),
            elements.len()
        );
        RowValue {
            dims,
            elements: Rc::new(elements),
        }
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dims.len()
    }

    /// Distance between consecutive indices of dimension `d`.
    pub fn stride(&self, d: usize) -> usize {
        self.dims[d + 1..].iter().map(|b| b.len()).product()
    }

    /// Row-major position of a full subscript, bounds checked.
    pub fn flat_index(&self, subscripts: &[i64]) -> Result<usize, Fault> {
        debug_assert_eq!(subscripts.len(), self.dims.len());
        let mut flat = 0usize;
        for (d, (&index, bounds)) in subscripts.iter().zip(&self.dims).enumerate() {
            if !bounds.contains(index) {
                return Err(index_out_of_bounds(index, bounds.lower, bounds.upper));
            }
            let offset = usize::try_from(index - bounds.lower).unwrap_or(usize::MAX);
            flat += offset * self.stride(d);
        }
        Ok(flat)
    }
}

/// One step of a name's path into its cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Field(u16),
    Element(usize),
}

/// A name: a location, possibly narrowed to a field or element.
#[derive(Clone, Debug)]
pub struct RefValue {
    cell: Rc<RefCell<Value>>,
    path: Rc<[Step]>,
}

impl PartialEq for RefValue {
    /// Identity, as used by `IS`.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell) && self.path == other.path
    }
}

impl RefValue {
    /// A fresh location holding `value`.
    pub fn new(value: Value) -> Self {
        RefValue {
            cell: Rc::new(RefCell::new(value)),
            path: Rc::from(Vec::new()),
        }
    }

    #[must_use]
    fn extend(&self, step: Step) -> Self {
        let mut path = self.path.to_vec();
        path.push(step);
        RefValue {
            cell: Rc::clone(&self.cell),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn field(&self, index: u16) -> Self {
        self.extend(Step::Field(index))
    }

    #[must_use]
    pub fn element(&self, flat: usize) -> Self {
        self.extend(Step::Element(flat))
    }

    /// Current value at this name.
    pub fn get(&self) -> Result<Value, Fault> {
        let root = self.cell.borrow();
        let mut current: &Value = &root;
        for &step in self.path.iter() {
            current = step_into(current, step)?;
        }
        Ok(current.clone())
    }

    /// Overwrite the value at this name.
    pub fn set(&self, value: Value) -> Result<(), Fault> {
        let mut root = self.cell.borrow_mut();
        let mut current: &mut Value = &mut root;
        for &step in self.path.iter() {
            current = step_into_mut(current, step)?;
        }
        *current = value;
        Ok(())
    }
}

fn step_into(value: &Value, step: Step) -> Result<&Value, Fault> {
    match (value, step) {
        (Value::Struct(fields), Step::Field(i)) => fields
            .get(usize::from(i))
            .ok_or_else(|| value_mismatch("structure field", value)),
        (Value::Row(row), Step::Element(k)) => row
            .elements
            .get(k)
            .ok_or_else(|| index_out_of_bounds(k as i64, 0, row.len() as i64 - 1)),
        (Value::Nil, _) => Err(nil_access()),
        (Value::Undefined(_), _) => Err(undefined_value(value.shape_name())),
        _ => Err(value_mismatch("structure or row", value)),
    }
}

fn step_into_mut(value: &mut Value, step: Step) -> Result<&mut Value, Fault> {
    match (value, step) {
        (Value::Struct(fields), Step::Field(i)) => {
            let fields = Rc::make_mut(fields);
            let len = fields.len() as i64;
            fields
                .get_mut(usize::from(i))
                .ok_or_else(|| index_out_of_bounds(i64::from(i), 0, len - 1))
        }
        (Value::Row(row), Step::Element(k)) => {
            let elements = Rc::make_mut(&mut row.elements);
            let len = elements.len() as i64;
            elements
                .get_mut(k)
                .ok_or_else(|| index_out_of_bounds(k as i64, 0, len - 1))
        }
        (Value::Nil, _) => Err(nil_access()),
        (Value::Undefined(_), _) => Err(undefined_value("structure or row")),
        (other, _) => Err(value_mismatch("structure or row", other)),
    }
}

/// Handle on an activation, checked for liveness before use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameHandle {
    pub index: usize,
    pub serial: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcValue {
    /// A routine text closed over the frame it was elaborated in.
    Routine { text: NodeId, env: FrameHandle },
    Standard(StdProc),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Void,
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Str(Rc<str>),
    Format(Rc<str>),
    Nil,
    Ref(RefValue),
    Row(RowValue),
    Struct(Rc<Vec<Value>>),
    Union { variant: ModeId, payload: Box<Value> },
    Proc(ProcValue),
    /// Placeholder for a value of the given mode that was never assigned.
    Undefined(ModeId),
}

impl Value {
    /// Undefined value of `mode`, structured so that fields and elements can
    /// be assigned through names.
    pub fn undefined(mode: ModeId, modes: &ModeTable) -> Value {
        match modes.get(mode) {
            Mode::Struct(fields) => Value::Struct(Rc::new(
                fields.iter().map(|f| Value::undefined(f.mode, modes)).collect(),
            )),
            Mode::Row { dims, .. } => Value::Row(RowValue::empty(usize::from(*dims))),
            Mode::Void => Value::Void,
            _ => Value::Undefined(mode),
        }
    }

    pub fn string(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    /// Name of the value's shape for diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Void => "VOID",
            Value::Int(_) => "INT",
            Value::Real(_) => "REAL",
            Value::Bool(_) => "BOOL",
            Value::Char(_) => "CHAR",
            Value::Str(_) => "STRING",
            Value::Format(_) => "FORMAT",
            Value::Nil => "NIL",
            Value::Ref(_) => "REF",
            Value::Row(_) => "row",
            Value::Struct(_) => "STRUCT",
            Value::Union { .. } => "UNION",
            Value::Proc(_) => "PROC",
            Value::Undefined(_) => "undefined value",
        }
    }

    pub fn as_int(&self) -> Result<i64, Fault> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Undefined(_) => Err(undefined_value("INT")),
            other => Err(value_mismatch("INT", other)),
        }
    }

    pub fn as_real(&self) -> Result<f64, Fault> {
        match self {
            Value::Real(r) => Ok(*r),
            #[expect(clippy::cast_precision_loss, reason = "INT widens to REAL")]
            Value::Int(n) => Ok(*n as f64),
            Value::Undefined(_) => Err(undefined_value("REAL")),
            other => Err(value_mismatch("REAL", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, Fault> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Undefined(_) => Err(undefined_value("BOOL")),
            other => Err(value_mismatch("BOOL", other)),
        }
    }

    pub fn as_ref_value(&self) -> Result<&RefValue, Fault> {
        match self {
            Value::Ref(r) => Ok(r),
            Value::Nil => Err(nil_access()),
            other => Err(value_mismatch("REF", other)),
        }
    }

    pub fn into_row(self) -> Result<RowValue, Fault> {
        match self {
            Value::Row(row) => Ok(row),
            Value::Str(s) => Ok(RowValue::vector(s.chars().map(Value::Char).collect())),
            Value::Undefined(_) => Err(undefined_value("row")),
            other => Err(value_mismatch("row", &other)),
        }
    }
}

/// Human-readable mode, e.g. `REF [] INT`.
pub fn describe_mode(modes: &ModeTable, mode: ModeId) -> String {
    let mut out = String::new();
    write_mode(modes, mode, &mut out);
    out
}

fn write_mode(modes: &ModeTable, mode: ModeId, out: &mut String) {
    match modes.get(mode) {
        Mode::Void => out.push_str("VOID"),
        Mode::Int => out.push_str("INT"),
        Mode::Real => out.push_str("REAL"),
        Mode::Bool => out.push_str("BOOL"),
        Mode::Char => out.push_str("CHAR"),
        Mode::String => out.push_str("STRING"),
        Mode::Format => out.push_str("FORMAT"),
        Mode::Ref(inner) => {
            out.push_str("REF ");
            write_mode(modes, *inner, out);
        }
        Mode::Row { dims, element } => {
            out.push('[');
            for _ in 1..*dims {
                out.push(',');
            }
            out.push_str("] ");
            write_mode(modes, *element, out);
        }
        Mode::Struct(fields) => {
            out.push_str("STRUCT (");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_mode(modes, field.mode, out);
            }
            out.push(')');
        }
        Mode::Union(variants) => {
            out.push_str("UNION (");
            for (i, &v) in variants.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_mode(modes, v, out);
            }
            out.push(')');
        }
        Mode::Proc { params, result } => {
            out.push_str("PROC ");
            if !params.is_empty() {
                out.push('(');
                for (i, &p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_mode(modes, p, out);
                }
                out.push_str(") ");
            }
            write_mode(modes, *result, out);
        }
    }
}

/// Render a plain value for transput. Rows and structures are walked by the
/// caller; this handles the leaves.
pub fn format_leaf(value: &Value, out: &mut String) {
    match value {
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Real(r) => {
            let _ = write!(out, "{r}");
        }
        Value::Bool(b) => out.push(if *b { 'T' } else { 'F' }),
        Value::Char(c) => out.push(*c),
        Value::Str(s) | Value::Format(s) => out.push_str(s),
        Value::Nil => out.push_str("NIL"),
        Value::Void => {}
        other => out.push_str(other.shape_name()),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
