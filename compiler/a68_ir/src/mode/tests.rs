use super::*;
use pretty_assertions::assert_eq;

#[test]
fn primitives_have_fixed_ids() {
    let table = ModeTable::new();
    assert_eq!(table.get(ModeId::VOID), &Mode::Void);
    assert_eq!(table.get(ModeId::INT), &Mode::Int);
    assert_eq!(table.get(ModeId::STRING), &Mode::String);
    assert_eq!(table.len(), 7);
}

#[test]
fn structural_modes_are_hash_consed() {
    let mut table = ModeTable::new();
    let a = table.ref_to(ModeId::INT);
    let b = table.ref_to(ModeId::INT);
    assert_eq!(a, b);
    let row = table.row_of(ModeId::REAL, 2);
    assert_eq!(table.row_dims(row), Some(2));
    assert_eq!(table.row_dims(a), None);
}

#[test]
fn union_variant_order_is_irrelevant() {
    let mut table = ModeTable::new();
    let u1 = table.union_of(&[ModeId::REAL, ModeId::INT]);
    let u2 = table.union_of(&[ModeId::INT, ModeId::REAL, ModeId::INT]);
    assert_eq!(u1, u2);
    assert_eq!(
        table.union_variants(u1),
        Some(&[ModeId::INT, ModeId::REAL][..])
    );
}

#[test]
fn oracle_accepts_exact_and_subset_patterns() {
    let mut table = ModeTable::new();
    let int_or_real = table.union_of(&[ModeId::INT, ModeId::REAL]);
    assert!(table.accepts(ModeId::INT, ModeId::INT));
    assert!(!table.accepts(ModeId::BOOL, ModeId::INT));
    assert!(table.accepts(int_or_real, ModeId::REAL));
    assert!(!table.accepts(int_or_real, ModeId::BOOL));
}
