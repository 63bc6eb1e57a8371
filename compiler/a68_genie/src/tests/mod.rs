//! Whole-program scenarios.
//!
//! Each test assembles a program tree with [`ProgramBuilder`], the way the
//! parser would, runs it and checks the outcome and the captured output.

mod case_tests;
mod jump_tests;

use a68_ir::{
    CoercionKind, Mode, ModeId, NodeId, NodeKind, NodeRange, Operator, Program, ProgramBuilder,
    ScopeId, Slot, StdOp, StdProc,
};

use crate::{buffer_handler, Fault, GenieBuilder, GenieConfig, RunOutcome};

/// Run `program` with `config`, capturing printed output.
fn run(program: &Program, config: GenieConfig) -> (Result<RunOutcome, Fault>, String) {
    let handler = buffer_handler();
    let mut genie = GenieBuilder::new(program)
        .config(config)
        .print_handler(handler.clone())
        .build();
    let outcome = genie.run_program();
    (outcome, handler.get_output())
}

fn run_default(program: &Program) -> (Result<RunOutcome, Fault>, String) {
    run(program, GenieConfig::default())
}

/// `print((a, b, ...))`
fn print(b: &mut ProgramBuilder, args: &[NodeId]) -> NodeId {
    let params: Vec<ModeId> = args.iter().map(|&arg| b.mode_of(arg)).collect();
    let proc_mode = b.modes_mut().proc_of(&params, ModeId::VOID);
    let primary = b.node(NodeKind::Standard(StdProc::Print), proc_mode);
    let args = b.list(args);
    b.node(NodeKind::Call { primary, args }, ModeId::VOID)
}

fn ident(b: &mut ProgramBuilder, slot: Slot, mode: ModeId) -> NodeId {
    b.node(NodeKind::Identifier { slot }, mode)
}

/// Dereference a name-yielding unit.
fn deref(b: &mut ProgramBuilder, name: NodeId) -> NodeId {
    let name_mode = b.mode_of(name);
    let mode = match b.modes_mut().get(name_mode) {
        Mode::Ref(inner) => *inner,
        _ => name_mode,
    };
    b.node(
        NodeKind::Coercion {
            kind: CoercionKind::Dereference,
            operand: name,
        },
        mode,
    )
}

fn formula(b: &mut ProgramBuilder, op: StdOp, left: NodeId, right: NodeId, mode: ModeId) -> NodeId {
    b.node(
        NodeKind::Formula {
            op: Operator::Standard(op),
            left,
            right,
        },
        mode,
    )
}

/// `mode x := init` in `scope`. Returns the variable's slot, its `REF`
/// mode and the declaration.
fn variable(
    b: &mut ProgramBuilder,
    scope: ScopeId,
    mode: ModeId,
    init: NodeId,
) -> (Slot, ModeId, NodeId) {
    let ref_mode = b.modes_mut().ref_to(mode);
    let slot = b.local(scope, ref_mode);
    let generator = b.node(
        NodeKind::Generator {
            heap: false,
            bounds: NodeRange::EMPTY,
        },
        ref_mode,
    );
    let decl = b.node(
        NodeKind::VariableDeclaration {
            slot,
            generator,
            init,
        },
        ModeId::VOID,
    );
    (slot, ref_mode, decl)
}

/// `x := source`
fn assign(b: &mut ProgramBuilder, slot: Slot, ref_mode: ModeId, source: NodeId) -> NodeId {
    let destination = ident(b, slot, ref_mode);
    b.node(
        NodeKind::Assignation {
            destination,
            source,
        },
        ref_mode,
    )
}

/// Value of variable `x`.
fn load(b: &mut ProgramBuilder, slot: Slot, ref_mode: ModeId) -> NodeId {
    let name = ident(b, slot, ref_mode);
    deref(b, name)
}
