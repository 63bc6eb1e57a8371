//! Label jumps across statements, clauses and routine calls.

use super::*;
use crate::{FaultKind, Value};
use pretty_assertions::assert_eq;

/// `(INT x := 1; GOTO l; x := 2; l: x := 3; print(x))`
#[test]
fn jump_skips_to_the_labelled_statement() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "l");
    let one = b.int(1);
    let (x, ref_int, decl) = variable(&mut b, scope, ModeId::INT, one);
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let two = b.int(2);
    let skipped = assign(&mut b, x, ref_int, two);
    let three = b.int(3);
    let landing = assign(&mut b, x, ref_int, three);
    let target = b.labeled(label, landing);
    let value = load(&mut b, x, ref_int);
    let show = print(&mut b, &[value]);
    let serial = b.statements(
        scope,
        &[decl, goto, skipped, target, show],
        ModeId::VOID,
    );
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let (outcome, output) = run_default(&program);
    assert_eq!(outcome.unwrap(), RunOutcome::Completed(Value::Void));
    assert_eq!(output, "3");
}

/// `(INT n := 0; l: n := n + 1; (n < 3 | GOTO l); print(n))`
#[test]
fn backward_jump_from_a_nested_clause_repeats() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "l");
    let zero = b.int(0);
    let (n, ref_int, decl) = variable(&mut b, scope, ModeId::INT, zero);

    let current = load(&mut b, n, ref_int);
    let one = b.int(1);
    let next = formula(&mut b, StdOp::Add, current, one, ModeId::INT);
    let step = assign(&mut b, n, ref_int, next);
    let target = b.labeled(label, step);

    let cond_scope = b.scope(scope);
    let current = load(&mut b, n, ref_int);
    let three = b.int(3);
    let below = formula(&mut b, StdOp::Lt, current, three, ModeId::BOOL);
    let enquiry = b.statements(cond_scope, &[below], ModeId::BOOL);
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let conditional = b.node(
        NodeKind::Conditional {
            scope: cond_scope,
            enquiry,
            then_part: goto,
            else_part: NodeId::INVALID,
        },
        ModeId::VOID,
    );

    let value = load(&mut b, n, ref_int);
    let show = print(&mut b, &[value]);
    let serial = b.statements(scope, &[decl, target, conditional, show], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let config = GenieConfig {
        profile: true,
        ..GenieConfig::default()
    };
    let handler = buffer_handler();
    let mut genie = GenieBuilder::new(&program)
        .config(config)
        .print_handler(handler.clone())
        .build();
    genie.run_program().unwrap();
    assert_eq!(handler.get_output(), "3");
    assert_eq!(genie.counters().map(|c| c.jumps), Some(2));
    assert_eq!(genie.frame_depth(), 1);
    assert_eq!(genie.stack_depth(), 0);
}

/// `(PROC p = VOID: GOTO out; p; print(1); out: print(2))`
#[test]
fn jump_out_of_a_routine_unwinds_the_call() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "out");
    let proc_mode = b.modes_mut().proc_of(&[], ModeId::VOID);
    let p = b.local(scope, proc_mode);

    let routine_scope = b.scope(scope);
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let routine = b.node(
        NodeKind::RoutineText {
            scope: routine_scope,
            params: 0,
            body: goto,
        },
        proc_mode,
    );
    let decl = b.node(
        NodeKind::IdentityDeclaration {
            slot: p,
            value: routine,
        },
        ModeId::VOID,
    );
    let primary = ident(&mut b, p, proc_mode);
    let no_args = b.list(&[]);
    let call = b.node(NodeKind::Call { primary, args: no_args }, ModeId::VOID);
    let one = b.int(1);
    let skipped = print(&mut b, &[one]);
    let two = b.int(2);
    let landing = print(&mut b, &[two]);
    let target = b.labeled(label, landing);
    let serial = b.statements(scope, &[decl, call, skipped, target], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let (outcome, output) = run_default(&program);
    assert!(outcome.is_ok());
    assert_eq!(output, "2");
}

#[test]
fn jump_to_an_inactive_range_is_dangling() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "gone");
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let program = b.finish(goto);

    let (outcome, _) = run_default(&program);
    let fault = outcome.unwrap_err();
    assert_eq!(
        fault.kind,
        FaultKind::DanglingJump {
            label: "gone".to_owned()
        }
    );
    assert_eq!(fault.category(), crate::FaultCategory::Internal);
}
