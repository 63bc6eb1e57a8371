use super::*;
use a68_ir::{Program, ProgramBuilder, ScopeId, StdProc};
use pretty_assertions::assert_eq;

use crate::config::GenieConfig;
use crate::errors::FaultKind;
use crate::genie::{GenieBuilder, RunOutcome};
use crate::print_handler::buffer_handler;
use crate::value::Value;

fn genie(program: &Program) -> Genie<'_> {
    GenieBuilder::new(program)
        .config(GenieConfig {
            profile: true,
            ..GenieConfig::default()
        })
        .print_handler(buffer_handler())
        .build()
}

/// `print(n)`
fn print_int(b: &mut ProgramBuilder, n: i64) -> NodeId {
    let proc_mode = b.modes_mut().proc_of(&[ModeId::INT], ModeId::VOID);
    let print = b.node(NodeKind::Standard(StdProc::Print), proc_mode);
    let arg = b.int(n);
    let args = b.list(&[arg]);
    b.node(NodeKind::Call { primary: print, args }, ModeId::VOID)
}

#[test]
fn flatten_inlines_groups_and_stops_at_exit() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let comma = b.node(NodeKind::Punct, ModeId::VOID);
    let two = b.int(2);
    let inner = b.list(&[one, comma, two]);
    let group = b.node(NodeKind::Group { items: inner }, ModeId::VOID);
    let separator = b.node(NodeKind::Separator, ModeId::VOID);
    let exit = b.node(NodeKind::Exit, ModeId::VOID);
    let three = b.int(3);
    let items = b.list(&[group, separator, exit, three]);
    let program = b.finish(group);

    let mut steps = Vec::new();
    let completed = flatten(&program.tree, items, &mut steps);
    assert!(!completed);
    assert_eq!(
        steps,
        vec![ChainStep::Unit(one), ChainStep::Unit(two), ChainStep::Boundary]
    );
}

#[test]
fn nested_serial_clause_is_inlined() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let one = b.int(1);
    let two = b.int(2);
    let nested = b.statements(scope, &[one, two], ModeId::INT);
    let three = b.int(3);
    let separator = b.node(NodeKind::Separator, ModeId::VOID);
    let items = b.list(&[nested, separator, three]);
    let program = b.finish(three);

    let mut steps = Vec::new();
    assert!(flatten(&program.tree, items, &mut steps));
    assert_eq!(
        steps,
        vec![
            ChainStep::Unit(one),
            ChainStep::Boundary,
            ChainStep::Unit(two),
            ChainStep::Boundary,
            ChainStep::Unit(three),
        ]
    );
}

#[test]
fn label_free_clause_is_linearized_once() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let first = print_int(&mut b, 1);
    let second = print_int(&mut b, 2);
    let serial = b.statements(scope, &[first, second], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let mut g = genie(&program);
    g.run_program().unwrap();
    g.run_program().unwrap();

    assert_eq!(g.print_handler().get_output(), "1 2 1 2");
    let flags = g.annotations().flags(serial);
    assert!(flags.contains(GenieFlags::LINEARIZED | GenieFlags::LABEL_FREE));
    assert!(!flags.contains(GenieFlags::SINGLE_STEP));
    let chain = g.annotations().chain(serial).unwrap();
    assert_eq!(
        &*chain,
        &[ChainStep::Unit(first), ChainStep::Boundary, ChainStep::Unit(second)]
    );
    let counters = g.counters().cloned().unwrap();
    assert_eq!(counters.linearizations, 1);
    assert_eq!(counters.chain_replays, 1);
}

#[test]
fn void_serial_discards_its_values() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let one = b.int(1);
    let two = b.int(2);
    let serial = b.statements(scope, &[one, two], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let mut g = genie(&program);
    assert_eq!(g.run_program().unwrap(), RunOutcome::Completed(Value::Void));
    assert_eq!(g.stack_depth(), 0);
}

#[test]
fn exit_completes_the_clause() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let first = print_int(&mut b, 1);
    let separator = b.node(NodeKind::Separator, ModeId::VOID);
    let exit = b.node(NodeKind::Exit, ModeId::VOID);
    let unreachable = print_int(&mut b, 2);
    let serial = b.serial(scope, &[first, separator, exit, unreachable], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let mut g = genie(&program);
    g.run_program().unwrap();
    assert_eq!(g.print_handler().get_output(), "1");
}

/// `(print(1); GOTO l; print(2); l: print(3))`
#[test]
fn jump_resumes_at_the_label() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "l");
    let first = print_int(&mut b, 1);
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let skipped = print_int(&mut b, 2);
    let third = print_int(&mut b, 3);
    let target = b.labeled(label, third);
    let serial = b.statements(scope, &[first, goto, skipped, target], ModeId::VOID);
    let closed = b.closed(scope, serial);
    let program = b.finish(closed);

    let mut g = genie(&program);
    g.run_program().unwrap();
    assert_eq!(g.print_handler().get_output(), "1 3");
    assert_eq!(g.counters().map(|c| c.jumps), Some(1));
    // Labelled clauses are walked from the tree every time.
    assert!(g.annotations().chain(serial).is_none());
    assert_eq!(g.frame_depth(), 1);
}

#[test]
fn jump_without_active_owner_is_dangling() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let label = b.label(scope, "nowhere");
    let goto = b.node(NodeKind::Jump { label }, ModeId::VOID);
    let program = b.finish(goto);

    let err = genie(&program).run_program().unwrap_err();
    assert_eq!(
        err.kind,
        FaultKind::DanglingJump {
            label: "nowhere".to_owned()
        }
    );
}

#[test]
fn conditional_without_else_yields_undefined() {
    let mut b = ProgramBuilder::new();
    let scope = b.scope(ScopeId::STANDARD_ENVIRON);
    let condition = b.boolean(false);
    let enquiry = b.statements(scope, &[condition], ModeId::BOOL);
    let then_value = b.int(1);
    let conditional = b.node(
        NodeKind::Conditional {
            scope,
            enquiry,
            then_part: then_value,
            else_part: NodeId::INVALID,
        },
        ModeId::INT,
    );
    let program = b.finish(conditional);

    let outcome = genie(&program).run_program().unwrap();
    assert_eq!(outcome, RunOutcome::Completed(Value::Undefined(ModeId::INT)));
}
