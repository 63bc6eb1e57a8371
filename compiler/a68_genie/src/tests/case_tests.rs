//! Integer and conformity case clauses.

use super::*;
use a68_ir::ConformityAlt;
use pretty_assertions::assert_eq;

use crate::{ConformityPolicy, FaultKind, Value};

/// `CASE k IN print("a"), print("b") OUT print("z") ESAC`
fn integer_case(k: i64, with_out: bool) -> Program {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let selector = b.int(k);
    let enquiry = b.statements(scope, &[selector], ModeId::INT);
    let a = b.string("a");
    let first = print(&mut b, &[a]);
    let comma = b.node(NodeKind::Punct, ModeId::VOID);
    let bee = b.string("b");
    let second = print(&mut b, &[bee]);
    let alternatives = b.list(&[first, comma, second]);
    let out_part = if with_out {
        let z = b.string("z");
        print(&mut b, &[z])
    } else {
        NodeId::INVALID
    };
    let clause = b.node(
        NodeKind::IntegerCase {
            scope,
            enquiry,
            alternatives,
            out_part,
        },
        ModeId::VOID,
    );
    b.finish(clause)
}

#[test]
fn selector_picks_the_alternative() {
    let (_, output) = run_default(&integer_case(2, true));
    assert_eq!(output, "b");
}

#[test]
fn selector_out_of_range_takes_out_part() {
    let (_, output) = run_default(&integer_case(4, true));
    assert_eq!(output, "z");
    let (_, output) = run_default(&integer_case(0, true));
    assert_eq!(output, "z");
}

#[test]
fn selector_out_of_range_without_out_does_nothing() {
    let (outcome, output) = run_default(&integer_case(-3, false));
    assert_eq!(outcome.unwrap(), RunOutcome::Completed(Value::Void));
    assert_eq!(output, "");
}

/// `CASE u IN (INT i): i * 10, (BOOL b): ABS b ESAC` with `u` holding
/// `payload`; the clause yields INT. With `only_int`, the BOOL
/// alternative is left out.
fn conformity_case(b: &mut ProgramBuilder, payload: NodeId, only_int: bool) -> NodeId {
    let union = b.modes_mut().union_of(&[ModeId::INT, ModeId::BOOL]);
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let united = b.node(
        NodeKind::Coercion {
            kind: CoercionKind::Unite,
            operand: payload,
        },
        union,
    );
    let enquiry = b.statements(scope, &[united], union);

    let int_scope = b.scope(scope);
    let i = b.local(int_scope, ModeId::INT);
    let value = ident(b, i, ModeId::INT);
    let ten = b.int(10);
    let scaled = formula(b, StdOp::Mul, value, ten, ModeId::INT);
    let int_spec = b.mode_list(&[ModeId::INT]);
    let int_alt = b.alternative(ConformityAlt {
        specifiers: int_spec,
        binding: Some(i),
        scope: int_scope,
        unit: scaled,
    });

    let mut alts = vec![int_alt];
    if !only_int {
        let bool_scope = b.scope(scope);
        let flag = b.local(bool_scope, ModeId::BOOL);
        let value = ident(b, flag, ModeId::BOOL);
        let abs = b.node(
            NodeKind::Monadic {
                op: Operator::Standard(StdOp::Abs),
                operand: value,
            },
            ModeId::INT,
        );
        let bool_spec = b.mode_list(&[ModeId::BOOL]);
        alts.push(b.alternative(ConformityAlt {
            specifiers: bool_spec,
            binding: Some(flag),
            scope: bool_scope,
            unit: abs,
        }));
    }
    let alternatives = b.list(&alts);
    b.node(
        NodeKind::ConformityCase {
            scope,
            enquiry,
            alternatives,
            out_part: NodeId::INVALID,
        },
        ModeId::INT,
    )
}

#[test]
fn conformity_binds_the_active_variant() {
    let mut b = ProgramBuilder::new();
    let four = b.int(4);
    let clause = conformity_case(&mut b, four, false);
    let program = b.finish(clause);
    let (outcome, _) = run_default(&program);
    assert_eq!(outcome.unwrap(), RunOutcome::Completed(Value::Int(40)));

    let mut b = ProgramBuilder::new();
    let yes = b.boolean(true);
    let clause = conformity_case(&mut b, yes, false);
    let program = b.finish(clause);
    let (outcome, _) = run_default(&program);
    assert_eq!(outcome.unwrap(), RunOutcome::Completed(Value::Int(1)));
}

#[test]
fn unmatched_conformity_is_undefined_by_default() {
    let mut b = ProgramBuilder::new();
    let yes = b.boolean(true);
    let clause = conformity_case(&mut b, yes, true);
    let program = b.finish(clause);
    let (outcome, _) = run_default(&program);
    assert_eq!(
        outcome.unwrap(),
        RunOutcome::Completed(Value::Undefined(ModeId::INT))
    );
}

#[test]
fn unmatched_conformity_faults_when_strict() {
    let mut b = ProgramBuilder::new();
    let yes = b.boolean(true);
    let clause = conformity_case(&mut b, yes, true);
    let program = b.finish(clause);
    let config = GenieConfig {
        conformity: ConformityPolicy::Strict,
        ..GenieConfig::default()
    };
    let (outcome, _) = run(&program, config);
    assert_eq!(outcome.unwrap_err().kind, FaultKind::UnmatchedConformity);
}
