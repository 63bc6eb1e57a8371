//! Youngest environ of routine texts.
//!
//! A routine value must stay valid as long as every range holding one of
//! its non-local names is active. The scope resolver records, per routine
//! text, the deepest lexical level among those names; the genie links the
//! routine to the frame at that level when the text is elaborated. A
//! routine without non-locals belongs to the standard environ (level 0).

use rustc_hash::FxHashMap;

use crate::ids::to_u32;
use crate::{LabelTable, NodeId, NodeKind, NodeRange, Operator, ScopeTable, Slot, Tree};

/// Environ level of every routine text in `tree`.
pub(crate) fn routine_environs(
    tree: &Tree,
    scopes: &ScopeTable,
    labels: &LabelTable,
) -> FxHashMap<NodeId, u16> {
    let mut environs = FxHashMap::default();
    for index in 0..tree.len() {
        let node = NodeId::new(to_u32(index, "nodes"));
        if let NodeKind::RoutineText { scope, body, .. } = tree.kind(node) {
            let mut finder = EnvironFinder {
                tree,
                scopes,
                labels,
                own_level: scopes.get(scope).level,
                youngest: 0,
            };
            finder.visit(body);
            environs.insert(node, finder.youngest);
        }
    }
    environs
}

struct EnvironFinder<'t> {
    tree: &'t Tree,
    scopes: &'t ScopeTable,
    labels: &'t LabelTable,
    own_level: u16,
    youngest: u16,
}

impl EnvironFinder<'_> {
    fn note(&mut self, level: u16) {
        if level < self.own_level {
            self.youngest = self.youngest.max(level);
        }
    }

    fn slot(&mut self, slot: Slot) {
        self.note(slot.level);
    }

    fn operator(&mut self, op: Operator) {
        if let Operator::User(slot) = op {
            self.slot(slot);
        }
    }

    fn visit(&mut self, node: NodeId) {
        if !node.is_valid() {
            return;
        }
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::SerialClause { items, .. }
            | NodeKind::Group { items }
            | NodeKind::DeclarationList { items } => self.visit_all(items),
            NodeKind::Collateral { units } | NodeKind::Parallel { units } => {
                self.visit_all(units);
            }
            NodeKind::Labeled { unit, .. } | NodeKind::Cast { unit } => self.visit(unit),
            NodeKind::IdentityDeclaration { value, .. } => self.visit(value),
            NodeKind::VariableDeclaration {
                generator, init, ..
            } => {
                self.visit(generator);
                self.visit(init);
            }
            NodeKind::Identifier { slot } => self.slot(slot),
            NodeKind::Call { primary, args } => {
                self.visit(primary);
                self.visit_all(args);
            }
            NodeKind::Slice { primary, indexers } => {
                self.visit(primary);
                self.visit_all(indexers);
            }
            NodeKind::Trimmer { lower, upper } | NodeKind::Bound { lower, upper } => {
                self.visit(lower);
                self.visit(upper);
            }
            NodeKind::Generator { bounds, .. } => self.visit_all(bounds),
            NodeKind::Selection { secondary, .. } => self.visit(secondary),
            NodeKind::Formula { op, left, right } => {
                self.operator(op);
                self.visit(left);
                self.visit(right);
            }
            NodeKind::Monadic { op, operand } => {
                self.operator(op);
                self.visit(operand);
            }
            NodeKind::IdentityRelation { left, right, .. }
            | NodeKind::AndFunction { left, right }
            | NodeKind::OrFunction { left, right } => {
                self.visit(left);
                self.visit(right);
            }
            NodeKind::Assignation {
                destination,
                source,
            } => {
                self.visit(destination);
                self.visit(source);
            }
            NodeKind::RoutineText { body, .. } => self.visit(body),
            NodeKind::Jump { label } => {
                let scope = self.labels.get(label).scope;
                self.note(self.scopes.get(scope).level);
            }
            NodeKind::Assertion { condition } => self.visit(condition),
            NodeKind::Diagonal { offset, operand }
            | NodeKind::RowFunction { offset, operand }
            | NodeKind::ColumnFunction { offset, operand } => {
                self.visit(offset);
                self.visit(operand);
            }
            NodeKind::Transpose { operand } | NodeKind::Coercion { operand, .. } => {
                self.visit(operand);
            }
            NodeKind::Closed { serial, .. } => self.visit(serial),
            NodeKind::Conditional {
                enquiry,
                then_part,
                else_part,
                ..
            } => {
                self.visit(enquiry);
                self.visit(then_part);
                self.visit(else_part);
            }
            NodeKind::IntegerCase {
                enquiry,
                alternatives,
                out_part,
                ..
            }
            | NodeKind::ConformityCase {
                enquiry,
                alternatives,
                out_part,
                ..
            } => {
                self.visit(enquiry);
                self.visit_all(alternatives);
                self.visit(out_part);
            }
            NodeKind::ConformityAlternative(alt) => self.visit(tree.alternative(alt).unit),
            NodeKind::Loop(id) => {
                let parts = *tree.loop_parts(id);
                for part in [
                    parts.from,
                    parts.by,
                    parts.to,
                    parts.while_part,
                    parts.do_part,
                    parts.until_part,
                ] {
                    self.visit(part);
                }
            }
            NodeKind::Separator
            | NodeKind::Exit
            | NodeKind::Punct
            | NodeKind::ModeDeclaration
            | NodeKind::Denotation(_)
            | NodeKind::Standard(_)
            | NodeKind::FormatText { .. }
            | NodeKind::Nihil
            | NodeKind::Skip => {}
        }
    }

    fn visit_all(&mut self, range: NodeRange) {
        for &node in self.tree.list(range) {
            self.visit(node);
        }
    }
}
