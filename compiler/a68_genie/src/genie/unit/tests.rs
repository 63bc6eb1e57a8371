use super::*;
use a68_ir::{ModeId, Operator, Program, ProgramBuilder, Span, StdOp};
use pretty_assertions::assert_eq;

use crate::config::GenieConfig;
use crate::errors::FaultKind;
use crate::genie::{GenieBuilder, RunOutcome};
use crate::print_handler::silent_handler;

fn genie(program: &Program) -> Genie<'_> {
    GenieBuilder::new(program)
        .config(GenieConfig {
            profile: true,
            ..GenieConfig::default()
        })
        .print_handler(silent_handler())
        .build()
}

/// `(7)`
fn closed_int() -> (Program, NodeId) {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let seven = b.int(7);
    let serial = b.statements(scope, &[seven], ModeId::INT);
    let closed = b.closed(scope, serial);
    (b.finish(closed), seven)
}

#[test]
fn closed_clause_around_one_unit_is_bypassed() {
    let (program, seven) = closed_int();
    let mut g = genie(&program);

    let first = g.run_program().unwrap();
    assert_eq!(first, RunOutcome::Completed(Value::Int(7)));
    assert_eq!(
        g.annotations().strategy(program.root),
        Some(Strategy::new(StrategyKind::Unit, seven))
    );

    let frames_before = g.frame_depth();
    let second = g.run_program().unwrap();
    assert_eq!(second, RunOutcome::Completed(Value::Int(7)));
    assert_eq!(g.frame_depth(), frames_before);
    // The serial clause was linearized once and never replayed.
    let counters = g.counters().cloned().unwrap();
    assert_eq!(counters.linearizations, 1);
    assert_eq!(counters.chain_replays, 0);
}

#[test]
fn closed_clause_with_locals_keeps_its_frame() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let slot = b.local(scope, ModeId::INT);
    let seven = b.int(7);
    let decl = b.node(NodeKind::IdentityDeclaration { slot, value: seven }, ModeId::VOID);
    let load = b.node(NodeKind::Identifier { slot }, ModeId::INT);
    let serial = b.statements(scope, &[decl, load], ModeId::INT);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let mut g = genie(&program);
    assert_eq!(g.run_program().unwrap().value(), Some(&Value::Int(7)));
    assert_eq!(g.run_program().unwrap().value(), Some(&Value::Int(7)));
    assert_eq!(
        g.annotations().strategy(closed),
        Some(Strategy::new(StrategyKind::Closed, closed))
    );
    let counters = g.counters().cloned().unwrap();
    assert_eq!(counters.chain_replays, 1);
}

#[test]
fn structural_node_is_not_a_unit() {
    let mut b = ProgramBuilder::new();
    let separator = b.node(NodeKind::Separator, ModeId::VOID);
    let program = b.finish(separator);

    let err = genie(&program).run_program().unwrap_err();
    assert_eq!(err.kind, FaultKind::UnknownNodeKind { kind: "separator" });
}

#[test]
fn andth_skips_its_right_operand() {
    let mut b = ProgramBuilder::new();
    let lhs = b.boolean(false);
    // 1 % 0 = 0 would fault if evaluated.
    let one = b.int(1);
    let zero = b.int(0);
    let over = b.node(
        NodeKind::Formula {
            op: Operator::Standard(StdOp::Over),
            left: one,
            right: zero,
        },
        ModeId::INT,
    );
    let zero_again = b.int(0);
    let rhs = b.node(
        NodeKind::Formula {
            op: Operator::Standard(StdOp::Eq),
            left: over,
            right: zero_again,
        },
        ModeId::BOOL,
    );
    let and = b.node(NodeKind::AndFunction { left: lhs, right: rhs }, ModeId::BOOL);
    let program = b.finish(and);

    let outcome = genie(&program).run_program().unwrap();
    assert_eq!(outcome, RunOutcome::Completed(Value::Bool(false)));
}

#[test]
fn orel_runs_right_operand_when_left_is_false() {
    let mut b = ProgramBuilder::new();
    let lhs = b.boolean(false);
    let rhs = b.boolean(true);
    let or = b.node(NodeKind::OrFunction { left: lhs, right: rhs }, ModeId::BOOL);
    let program = b.finish(or);

    let outcome = genie(&program).run_program().unwrap();
    assert_eq!(outcome, RunOutcome::Completed(Value::Bool(true)));
}

#[test]
fn fault_takes_the_span_of_the_innermost_unit() {
    let mut b = ProgramBuilder::new();
    let condition = b.boolean(false);
    let span = Span::new(4, 16);
    let assertion = b.node_at(NodeKind::Assertion { condition }, ModeId::VOID, span);
    let program = b.finish(assertion);

    let err = genie(&program).run_program().unwrap_err();
    assert_eq!(err.kind, FaultKind::AssertionFailed);
    assert_eq!(err.span, Some(span));
}

#[test]
fn skip_yields_undefined_of_its_mode() {
    let mut b = ProgramBuilder::new();
    let skip = b.node(NodeKind::Skip, ModeId::INT);
    let program = b.finish(skip);

    let outcome = genie(&program).run_program().unwrap();
    assert_eq!(outcome, RunOutcome::Completed(Value::Undefined(ModeId::INT)));
}
