//! Program assembly.
//!
//! [`ProgramBuilder`] is the interface the parser drives: it owns the tree,
//! mode, scope and label tables while they are being filled in, wires labels
//! to their owning serial clauses, and seals everything into a [`Program`].

use rustc_hash::FxHashMap;

use crate::environ::routine_environs;
use crate::ids::{AltId, LabelId, ModeId, ModeRange, NodeId, NodeRange, ScopeId, Slot};
use crate::{
    ConformityAlt, Label, LabelTable, Literal, LoopParts, ModeTable, Name, NodeKind, ScopeTable,
    Span, StringInterner, Tree,
};

/// A complete, mode-checked, scope-resolved program.
#[derive(Clone, Debug)]
pub struct Program {
    pub tree: Tree,
    pub modes: ModeTable,
    pub scopes: ScopeTable,
    pub labels: LabelTable,
    pub interner: StringInterner,
    /// Top-level enclosed clause.
    pub root: NodeId,
    environs: FxHashMap<NodeId, u16>,
}

impl Program {
    /// Lexical level of the youngest range holding a non-local name of the
    /// routine text `routine`; 0 when it has none.
    pub fn environ_level(&self, routine: NodeId) -> u16 {
        self.environs.get(&routine).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    tree: Tree,
    modes: ModeTable,
    scopes: ScopeTable,
    labels: LabelTable,
    interner: StringInterner,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modes_mut(&mut self) -> &mut ModeTable {
        &mut self.modes
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.interner.intern(s)
    }

    // Scopes and labels

    pub fn scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(parent)
    }

    pub fn local(&mut self, scope: ScopeId, mode: ModeId) -> Slot {
        self.scopes.add_local(scope, mode)
    }

    /// Declare a label in `scope`. Its target is bound by [`labeled`](Self::labeled)
    /// and its owner by the serial clause that contains it.
    pub fn label(&mut self, scope: ScopeId, name: &str) -> LabelId {
        let name = self.interner.intern(name);
        self.scopes.mark_labels(scope);
        self.labels.push(Label {
            name,
            scope,
            owner: NodeId::INVALID,
            target: NodeId::INVALID,
        })
    }

    // Nodes

    pub fn node(&mut self, kind: NodeKind, mode: ModeId) -> NodeId {
        self.tree.push(kind, mode, Span::DUMMY)
    }

    pub fn node_at(&mut self, kind: NodeKind, mode: ModeId, span: Span) -> NodeId {
        self.tree.push(kind, mode, span)
    }

    pub fn list(&mut self, ids: &[NodeId]) -> NodeRange {
        self.tree.push_list(ids)
    }

    pub fn mode_list(&mut self, modes: &[ModeId]) -> ModeRange {
        self.tree.push_mode_list(modes)
    }

    pub fn mode_of(&self, node: NodeId) -> ModeId {
        self.tree.mode(node)
    }

    pub fn int(&mut self, v: i64) -> NodeId {
        self.node(NodeKind::Denotation(Literal::Int(v)), ModeId::INT)
    }

    pub fn real(&mut self, v: f64) -> NodeId {
        self.node(NodeKind::Denotation(Literal::Real(v)), ModeId::REAL)
    }

    pub fn boolean(&mut self, v: bool) -> NodeId {
        self.node(NodeKind::Denotation(Literal::Bool(v)), ModeId::BOOL)
    }

    pub fn character(&mut self, c: char) -> NodeId {
        self.node(NodeKind::Denotation(Literal::Char(c)), ModeId::CHAR)
    }

    pub fn string(&mut self, s: &str) -> NodeId {
        let name = self.interner.intern(s);
        self.node(NodeKind::Denotation(Literal::Str(name)), ModeId::STRING)
    }

    /// Attach `label` to `unit`.
    pub fn labeled(&mut self, label: LabelId, unit: NodeId) -> NodeId {
        let mode = self.tree.mode(unit);
        let id = self.node(NodeKind::Labeled { label, unit }, mode);
        self.labels.get_mut(label).target = id;
        id
    }

    /// Serial clause over raw `items`; claims ownership of every label
    /// among them.
    pub fn serial(&mut self, scope: ScopeId, items: &[NodeId], mode: ModeId) -> NodeId {
        let range = self.list(items);
        let id = self.node(NodeKind::SerialClause { scope, items: range }, mode);
        self.claim_labels(items, id);
        id
    }

    /// Serial clause of `units` separated by `;`.
    pub fn statements(&mut self, scope: ScopeId, units: &[NodeId], mode: ModeId) -> NodeId {
        let mut items = Vec::with_capacity(units.len() * 2);
        for (i, &unit) in units.iter().enumerate() {
            if i > 0 {
                items.push(self.node(NodeKind::Separator, ModeId::VOID));
            }
            items.push(unit);
        }
        self.serial(scope, &items, mode)
    }

    pub fn closed(&mut self, scope: ScopeId, serial: NodeId) -> NodeId {
        let mode = self.tree.mode(serial);
        self.node(NodeKind::Closed { scope, serial }, mode)
    }

    pub fn loop_clause(&mut self, parts: LoopParts) -> NodeId {
        let id = self.tree.push_loop(parts);
        self.node(NodeKind::Loop(id), ModeId::VOID)
    }

    pub fn alternative(&mut self, alt: ConformityAlt) -> NodeId {
        let mode = self.tree.mode(alt.unit);
        let id: AltId = self.tree.push_alternative(alt);
        self.node(NodeKind::ConformityAlternative(id), mode)
    }

    fn claim_labels(&mut self, items: &[NodeId], owner: NodeId) {
        for &item in items {
            match self.tree.kind(item) {
                NodeKind::Labeled { label, .. } => self.labels.get_mut(label).owner = owner,
                NodeKind::Group { items } | NodeKind::SerialClause { items, .. } => {
                    let nested = self.tree.list(items).to_vec();
                    self.claim_labels(&nested, owner);
                }
                _ => {}
            }
        }
    }

    /// Seal the program, resolving the environ of every routine text.
    pub fn finish(self, root: NodeId) -> Program {
        let environs = routine_environs(&self.tree, &self.scopes, &self.labels);
        Program {
            tree: self.tree,
            modes: self.modes,
            scopes: self.scopes,
            labels: self.labels,
            interner: self.interner,
            root,
            environs,
        }
    }
}
