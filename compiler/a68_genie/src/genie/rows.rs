//! Row operations: slicing, trimming, and the `DIAG`, `TRNSP`, `ROW` and
//! `COL` functions.
//!
//! A slice whose indexers are all subscripts selects one element; through
//! a name it yields the element's name. Any trimmer in the indexer list
//! yields a new row with one dimension per trimmer, each rebased to a
//! lower bound of 1.

use std::rc::Rc;

use a68_ir::{NodeId, NodeKind, NodeRange};
use smallvec::SmallVec;

use super::Genie;
use crate::errors::{dimension_mismatch, index_out_of_bounds, Fault, FaultNote, GenieResult};
use crate::value::{Bounds, RowValue, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Indexer {
    At(i64),
    Trim {
        lower: Option<i64>,
        upper: Option<i64>,
    },
}

impl Genie<'_> {
    pub(crate) fn eval_slice(&mut self, primary: NodeId, indexers: NodeRange) -> GenieResult {
        self.eval_unit(primary)?;
        let base = self.stack.pop()?;
        let program = self.program;
        let mut list: SmallVec<[Indexer; 2]> = SmallVec::new();
        for &indexer in program.tree.list(indexers) {
            let indexer = match program.tree.kind(indexer) {
                NodeKind::Trimmer { lower, upper } => Indexer::Trim {
                    lower: self.optional_bound(lower)?,
                    upper: self.optional_bound(upper)?,
                },
                _ => {
                    self.eval_unit(indexer)?;
                    Indexer::At(self.stack.pop()?.as_int()?)
                }
            };
            list.push(indexer);
        }
        let result =
            slice(base, &list).map_err(|fault| fault.with_note(FaultNote::new("while slicing")))?;
        self.stack.push(result)?;
        Ok(())
    }

    fn optional_bound(&mut self, unit: NodeId) -> GenieResult<Option<i64>> {
        if !unit.is_valid() {
            return Ok(None);
        }
        self.eval_unit(unit)?;
        Ok(Some(self.stack.pop()?.as_int()?))
    }

    /// Pop a row, looking through a name.
    fn pop_row(&mut self) -> Result<RowValue, Fault> {
        match self.stack.pop()? {
            Value::Ref(name) => name.get()?.into_row(),
            other => other.into_row(),
        }
    }

    /// `k DIAG m`: elements `m[i, i + k]`, `k` defaulting to 0.
    pub(crate) fn eval_diagonal(&mut self, offset: NodeId, operand: NodeId) -> GenieResult {
        let k = self.optional_bound(offset)?.unwrap_or(0);
        self.eval_unit(operand)?;
        let row = self.pop_row()?;
        let diagonal = diagonal(&row, k)?;
        self.stack.push(Value::Row(diagonal))?;
        Ok(())
    }

    pub(crate) fn eval_transpose(&mut self, operand: NodeId) -> GenieResult {
        self.eval_unit(operand)?;
        let row = self.pop_row()?;
        let transposed = transpose(&row)?;
        self.stack.push(Value::Row(transposed))?;
        Ok(())
    }

    /// `k ROW v` is `[k:k, LWB v:UPB v]`; `k COL v` is `[LWB v:UPB v, k:k]`.
    /// `k` defaults to 1.
    pub(crate) fn eval_row_function(
        &mut self,
        offset: NodeId,
        operand: NodeId,
        column: bool,
    ) -> GenieResult {
        let k = self.optional_bound(offset)?.unwrap_or(1);
        self.eval_unit(operand)?;
        let vector = self.pop_row()?;
        if vector.dimensions() != 1 {
            return Err(dimension_mismatch(1, vector.dimensions()).into());
        }
        let single = Bounds::new(k, k);
        let dims = if column {
            SmallVec::from_slice(&[vector.dims[0], single])
        } else {
            SmallVec::from_slice(&[single, vector.dims[0]])
        };
        self.stack.push(Value::Row(RowValue {
            dims,
            elements: Rc::clone(&vector.elements),
        }))?;
        Ok(())
    }
}

fn slice(base: Value, indexers: &[Indexer]) -> Result<Value, Fault> {
    let element_only = indexers.iter().all(|i| matches!(i, Indexer::At(_)));
    match base {
        Value::Ref(name) => {
            let row = name.get()?.into_row()?;
            if element_only {
                let flat = row.flat_index(&subscripts(&row, indexers)?)?;
                Ok(Value::Ref(name.element(flat)))
            } else {
                trim(&row, indexers).map(Value::Row)
            }
        }
        Value::Str(text) => {
            let row = Value::Str(text).into_row()?;
            if element_only {
                let flat = row.flat_index(&subscripts(&row, indexers)?)?;
                Ok(row.elements[flat].clone())
            } else {
                let trimmed = trim(&row, indexers)?;
                let text: String = trimmed
                    .elements
                    .iter()
                    .filter_map(|c| match c {
                        Value::Char(c) => Some(*c),
                        _ => None,
                    })
                    .collect();
                Ok(Value::string(&text))
            }
        }
        other => {
            let row = other.into_row()?;
            if element_only {
                let flat = row.flat_index(&subscripts(&row, indexers)?)?;
                Ok(row.elements[flat].clone())
            } else {
                trim(&row, indexers).map(Value::Row)
            }
        }
    }
}

fn subscripts(row: &RowValue, indexers: &[Indexer]) -> Result<SmallVec<[i64; 2]>, Fault> {
    if indexers.len() != row.dimensions() {
        return Err(dimension_mismatch(row.dimensions(), indexers.len()));
    }
    Ok(indexers
        .iter()
        .map(|i| match *i {
            Indexer::At(n) => n,
            Indexer::Trim { lower, .. } => lower.unwrap_or(1),
        })
        .collect())
}

fn offset(start: i64, steps: usize) -> i64 {
    start.saturating_add(i64::try_from(steps).unwrap_or(i64::MAX))
}

fn trim(row: &RowValue, indexers: &[Indexer]) -> Result<RowValue, Fault> {
    if indexers.len() != row.dimensions() {
        return Err(dimension_mismatch(row.dimensions(), indexers.len()));
    }
    // (first subscript, extent) per source dimension
    let mut ranges: SmallVec<[(i64, usize); 2]> = SmallVec::new();
    let mut dims: SmallVec<[Bounds; 2]> = SmallVec::new();
    for (indexer, bounds) in indexers.iter().zip(&row.dims) {
        match *indexer {
            Indexer::At(index) => {
                if !bounds.contains(index) {
                    return Err(index_out_of_bounds(index, bounds.lower, bounds.upper));
                }
                ranges.push((index, 1));
            }
            Indexer::Trim { lower, upper } => {
                let trimmed = Bounds::new(
                    lower.unwrap_or(bounds.lower),
                    upper.unwrap_or(bounds.upper),
                );
                if !trimmed.is_empty() {
                    for end in [trimmed.lower, trimmed.upper] {
                        if !bounds.contains(end) {
                            return Err(index_out_of_bounds(end, bounds.lower, bounds.upper));
                        }
                    }
                }
                ranges.push((trimmed.lower, trimmed.len()));
                dims.push(Bounds::new(1, offset(0, trimmed.len())));
            }
        }
    }
    let total: usize = ranges.iter().map(|r| r.1).product();
    let mut elements = Vec::with_capacity(total);
    let mut steps: SmallVec<[usize; 2]> = SmallVec::from_elem(0, ranges.len());
    'gather: while elements.len() < total {
        let at: SmallVec<[i64; 2]> = ranges
            .iter()
            .zip(&steps)
            .map(|(&(start, _), &step)| offset(start, step))
            .collect();
        elements.push(row.elements[row.flat_index(&at)?].clone());
        for d in (0..ranges.len()).rev() {
            steps[d] += 1;
            if steps[d] < ranges[d].1 {
                continue 'gather;
            }
            steps[d] = 0;
        }
        break;
    }
    Ok(RowValue::new(dims, elements))
}

fn diagonal(row: &RowValue, k: i64) -> Result<RowValue, Fault> {
    if row.dimensions() != 2 {
        return Err(dimension_mismatch(2, row.dimensions()));
    }
    let (rows, cols) = (row.dims[0], row.dims[1]);
    let first = rows.lower.max(cols.lower.saturating_sub(k));
    let last = rows.upper.min(cols.upper.saturating_sub(k));
    let mut elements = Vec::new();
    let mut i = first;
    while i <= last {
        elements.push(row.elements[row.flat_index(&[i, i + k])?].clone());
        i += 1;
    }
    Ok(RowValue::vector(elements))
}

fn transpose(row: &RowValue) -> Result<RowValue, Fault> {
    if row.dimensions() != 2 {
        return Err(dimension_mismatch(2, row.dimensions()));
    }
    let (rows, cols) = (row.dims[0], row.dims[1]);
    let (n, m) = (rows.len(), cols.len());
    let mut elements = Vec::with_capacity(n * m);
    for j in 0..m {
        for i in 0..n {
            elements.push(row.elements[i * m + j].clone());
        }
    }
    Ok(RowValue::new(SmallVec::from_slice(&[cols, rows]), elements))
}
