use super::*;
use a68_ir::Name;
use pretty_assertions::assert_eq;

#[test]
fn empty_row_is_well_formed() {
    let row = RowValue::empty(2);
    assert_eq!(row.len(), 0);
    assert_eq!(row.dimensions(), 2);
    assert!(row.dims.iter().all(|b| b.is_empty()));
}

#[test]
fn flat_index_is_row_major() {
    let dims = SmallVec::from_slice(&[Bounds::new(1, 2), Bounds::new(0, 2)]);
    let row = RowValue::new(dims, (0..6).map(Value::Int).collect());
    assert_eq!(row.flat_index(&[1, 0]), Ok(0));
    assert_eq!(row.flat_index(&[1, 2]), Ok(2));
    assert_eq!(row.flat_index(&[2, 1]), Ok(4));
    assert_eq!(
        row.flat_index(&[3, 0]).map_err(|f| f.kind),
        Err(crate::errors::FaultKind::IndexOutOfBounds {
            index: 3,
            lower: 1,
            upper: 2
        })
    );
}

#[test]
fn bounds_len_never_negative() {
    assert_eq!(Bounds::new(5, 1).len(), 0);
    assert_eq!(Bounds::new(-2, 2).len(), 5);
}

#[test]
fn names_into_rows_write_through() {
    let row = Value::Row(RowValue::vector(vec![Value::Int(1), Value::Int(2)]));
    let name = RefValue::new(row);
    let second = name.element(1);
    second.set(Value::Int(20)).unwrap();
    assert_eq!(second.get(), Ok(Value::Int(20)));
    assert_eq!(
        name.get(),
        Ok(Value::Row(RowValue::vector(vec![Value::Int(1), Value::Int(20)])))
    );
}

#[test]
fn copy_on_write_keeps_earlier_copies() {
    let name = RefValue::new(Value::Row(RowValue::vector(vec![Value::Int(1)])));
    let before = name.get();
    name.element(0).set(Value::Int(9)).unwrap();
    assert_eq!(
        before,
        Ok(Value::Row(RowValue::vector(vec![Value::Int(1)])))
    );
}

#[test]
fn names_compare_by_identity() {
    let a = RefValue::new(Value::Int(1));
    let b = RefValue::new(Value::Int(1));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert_ne!(a.field(0), a.field(1));
}

#[test]
fn undefined_struct_has_assignable_fields() {
    let mut modes = ModeTable::new();
    let pair = modes.struct_of(&[(Name::EMPTY, ModeId::INT), (Name::EMPTY, ModeId::REAL)]);
    let value = Value::undefined(pair, &modes);
    let name = RefValue::new(value);
    name.field(1).set(Value::Real(2.5)).unwrap();
    assert_eq!(name.field(1).get(), Ok(Value::Real(2.5)));
    assert_eq!(name.field(0).get(), Ok(Value::Undefined(ModeId::INT)));
}

#[test]
fn describe_nested_modes() {
    let mut modes = ModeTable::new();
    let row = modes.row_of(ModeId::INT, 2);
    let name = modes.ref_to(row);
    assert_eq!(describe_mode(&modes, name), "REF [,] INT");
    let u = modes.union_of(&[ModeId::INT, ModeId::BOOL]);
    assert_eq!(describe_mode(&modes, u), "UNION (INT, BOOL)");
}

#[test]
fn leaves_format_plainly() {
    let mut out = String::new();
    format_leaf(&Value::Int(-3), &mut out);
    format_leaf(&Value::Bool(true), &mut out);
    format_leaf(&Value::string("ab"), &mut out);
    assert_eq!(out, "-3Tab");
}
