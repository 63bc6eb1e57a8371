//! Unit dispatch.
//!
//! `eval_unit(NodeId)` is the single entry point for evaluating any unit or
//! enclosed clause. The first visit routes on the node kind and memoizes the
//! chosen [`Strategy`]; later visits run the strategy directly. A closed
//! clause that reduced to one unit memoizes that unit instead, so later
//! visits skip the clause's frame altogether.
//!
//! # Borrow Pattern
//!
//! `NodeKind` is `Copy`, and `self.program` is a shared reference that
//! outlives the genie borrow, so each arm copies what it needs out of the
//! tree and recurses through `&mut self` freely.

use std::rc::Rc;

use a68_ir::{Literal, NodeId, NodeKind, ScopeId};

use super::Genie;
use crate::annotation::{ChainStep, GenieFlags, Strategy, StrategyKind};
use crate::errors::{assertion_failed, unknown_node_kind, ControlAction, GenieResult};
use crate::stack::ensure_sufficient_stack;
use crate::value::{ProcValue, Value};

impl Genie<'_> {
    /// Evaluate `node`, leaving its value (if any) on the expression stack.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_unit(&mut self, node: NodeId) -> GenieResult {
        ensure_sufficient_stack(|| {
            self.mode_state.count_unit();
            let result = match self.annotations.strategy(node) {
                Some(strategy) => self.run_strategy(node, strategy),
                None => self
                    .evaluate(node)
                    .map(|strategy| self.annotations.memoize(node, strategy)),
            };
            result.map_err(|action| self.locate(action, node))
        })
    }

    fn run_strategy(&mut self, node: NodeId, strategy: Strategy) -> GenieResult {
        match strategy.kind {
            StrategyKind::Unit if strategy.source == node => self.evaluate(node).map(|_| ()),
            StrategyKind::Unit => self.eval_unit(strategy.source),
            kind => self.run_enclosed(kind, strategy.source),
        }
    }

    /// Run an enclosed clause and check that it left exactly its result.
    fn run_enclosed(&mut self, kind: StrategyKind, node: NodeId) -> GenieResult {
        let baseline = self.stack.sp();
        match kind {
            StrategyKind::Unit => {
                self.evaluate(node)?;
            }
            StrategyKind::Closed => self.eval_closed(node)?,
            StrategyKind::Conditional => self.eval_conditional(node)?,
            StrategyKind::IntegerCase => self.eval_integer_case(node)?,
            StrategyKind::ConformityCase => self.eval_conformity_case(node)?,
            StrategyKind::Loop => self.eval_loop(node)?,
            StrategyKind::Collateral => self.eval_collateral(node)?,
            StrategyKind::Parallel => self.eval_parallel(node)?,
        }
        self.check_yield(self.program.tree.mode(node), baseline)?;
        Ok(())
    }

    fn enclosed(&mut self, kind: StrategyKind, node: NodeId) -> GenieResult<Strategy> {
        self.run_enclosed(kind, node)?;
        Ok(Strategy::new(kind, node))
    }

    /// First-visit dispatch. Handles every `NodeKind` exhaustively.
    fn evaluate(&mut self, node: NodeId) -> GenieResult<Strategy> {
        let program = self.program;
        let kind = program.tree.kind(node);
        let mode = program.tree.mode(node);
        match kind {
            // Enclosed clauses
            NodeKind::Closed { scope, serial } => {
                self.run_enclosed(StrategyKind::Closed, node)?;
                return Ok(self.closed_strategy(node, scope, serial));
            }
            NodeKind::Conditional { .. } => return self.enclosed(StrategyKind::Conditional, node),
            NodeKind::IntegerCase { .. } => return self.enclosed(StrategyKind::IntegerCase, node),
            NodeKind::ConformityCase { .. } => {
                return self.enclosed(StrategyKind::ConformityCase, node);
            }
            NodeKind::Loop(_) => return self.enclosed(StrategyKind::Loop, node),
            NodeKind::Collateral { .. } => return self.enclosed(StrategyKind::Collateral, node),
            NodeKind::Parallel { .. } => return self.enclosed(StrategyKind::Parallel, node),

            // Structure owned by the clause executors
            NodeKind::SerialClause { .. }
            | NodeKind::Group { .. }
            | NodeKind::DeclarationList { .. }
            | NodeKind::Separator
            | NodeKind::Exit
            | NodeKind::Punct
            | NodeKind::Labeled { .. }
            | NodeKind::Trimmer { .. }
            | NodeKind::Bound { .. }
            | NodeKind::ConformityAlternative(_) => {
                return Err(unknown_node_kind(kind.name()).into());
            }

            // Declarations
            NodeKind::IdentityDeclaration { slot, value } => {
                self.eval_unit(value)?;
                let value = self.stack.pop()?;
                self.frames.store(slot, value)?;
            }
            NodeKind::VariableDeclaration {
                slot,
                generator,
                init,
            } => self.declare_variable(slot, generator, init)?,
            NodeKind::ModeDeclaration => {}

            // Primaries
            NodeKind::Denotation(literal) => {
                let value = self.denotation(literal);
                self.stack.push(value)?;
            }
            NodeKind::Identifier { slot } => {
                let value = self.frames.load(slot)?;
                self.stack.push(value)?;
            }
            NodeKind::Standard(proc) => {
                self.stack.push(Value::Proc(ProcValue::Standard(proc)))?;
            }
            NodeKind::FormatText { text } => {
                let text = Rc::from(program.interner.lookup(text));
                self.stack.push(Value::Format(text))?;
            }
            NodeKind::Nihil => self.stack.push(Value::Nil)?,
            NodeKind::Skip => self.push_undefined(mode)?,
            NodeKind::RoutineText { .. } => {
                let environ = self.frames.resolve(program.environ_level(node))?;
                let env = self.frames.handle(environ)?;
                self.stack
                    .push(Value::Proc(ProcValue::Routine { text: node, env }))?;
            }
            NodeKind::Cast { unit } => self.eval_unit(unit)?,
            NodeKind::Call { primary, args } => self.eval_call(node, primary, args)?,
            NodeKind::Slice { primary, indexers } => self.eval_slice(primary, indexers)?,
            NodeKind::Generator { heap, bounds } => self.eval_generator(mode, heap, bounds)?,
            NodeKind::Selection { field, secondary } => self.eval_selection(field, secondary)?,

            // Operations
            NodeKind::Formula { op, left, right } => self.eval_formula(node, op, left, right)?,
            NodeKind::Monadic { op, operand } => self.eval_monadic(node, op, operand)?,
            NodeKind::IdentityRelation { is, left, right } => {
                self.eval_identity_relation(is, left, right)?;
            }
            NodeKind::AndFunction { left, right } => self.eval_short_circuit(left, right, true)?,
            NodeKind::OrFunction { left, right } => self.eval_short_circuit(left, right, false)?,
            NodeKind::Assignation {
                destination,
                source,
            } => self.eval_assignation(destination, source)?,
            NodeKind::Coercion { kind, operand } => self.eval_coercion(node, kind, operand)?,
            NodeKind::Diagonal { offset, operand } => self.eval_diagonal(offset, operand)?,
            NodeKind::Transpose { operand } => self.eval_transpose(operand)?,
            NodeKind::RowFunction { offset, operand } => {
                self.eval_row_function(offset, operand, false)?;
            }
            NodeKind::ColumnFunction { offset, operand } => {
                self.eval_row_function(offset, operand, true)?;
            }

            // Control
            NodeKind::Jump { label } => return Err(self.jump(label)),
            NodeKind::Assertion { condition } => {
                self.eval_unit(condition)?;
                if !self.stack.pop()?.as_bool()? {
                    return Err(assertion_failed().into());
                }
            }
        }
        Ok(Strategy::new(StrategyKind::Unit, node))
    }

    /// A closed clause without locals whose serial clause linearized to a
    /// single unit of the clause's own mode is replaced by that unit.
    fn closed_strategy(&self, node: NodeId, scope: ScopeId, serial: NodeId) -> Strategy {
        let program = self.program;
        let flags = self.annotations.flags(serial);
        if flags.contains(GenieFlags::SINGLE_STEP | GenieFlags::LABEL_FREE)
            && program.scopes.get(scope).locals.is_empty()
        {
            if let Some(chain) = self.annotations.chain(serial) {
                if let [ChainStep::Unit(inner)] = *chain {
                    if program.tree.mode(inner) == program.tree.mode(node) {
                        tracing::trace!(?node, ?inner, "closed clause reduced to its unit");
                        return Strategy::new(StrategyKind::Unit, inner);
                    }
                }
            }
        }
        Strategy::new(StrategyKind::Closed, node)
    }

    /// `ANDTH` (`and_then`) or `OREL`: the right operand only runs when the
    /// left one does not decide the result.
    fn eval_short_circuit(&mut self, left: NodeId, right: NodeId, and_then: bool) -> GenieResult {
        self.eval_unit(left)?;
        let decided = self.stack.pop()?.as_bool()?;
        if decided == and_then {
            return self.eval_unit(right);
        }
        self.stack.push(Value::Bool(decided))?;
        Ok(())
    }

    fn denotation(&self, literal: Literal) -> Value {
        match literal {
            Literal::Int(n) => Value::Int(n),
            Literal::Real(r) => Value::Real(r),
            Literal::Bool(b) => Value::Bool(b),
            Literal::Char(c) => Value::Char(c),
            Literal::Str(name) => Value::string(self.program.interner.lookup(name)),
        }
    }

    /// Give a fault without a position the span of `node`, and the routine
    /// activations live at the fault site.
    fn locate(&self, action: ControlAction, node: NodeId) -> ControlAction {
        match action {
            ControlAction::Fault(mut fault) if fault.span.is_none() => {
                let span = self.program.tree.span(node);
                if !span.is_dummy() {
                    fault.span = Some(span);
                }
                if fault.trace.is_none() && !self.calls.is_empty() {
                    fault.trace = Some(self.calls.capture());
                }
                ControlAction::Fault(fault)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
