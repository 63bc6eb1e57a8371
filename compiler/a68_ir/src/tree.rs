//! Flat, struct-of-arrays program tree.
//!
//! Nodes are appended by the parser (or [`ProgramBuilder`](crate::ProgramBuilder))
//! and never change afterwards. Per-node data the genie writes lazily lives
//! in its own side table, not here.

use crate::ids::{
    to_u16, to_u32, AltId, LoopId, ModeId, ModeRange, NodeId, NodeRange, ScopeId, Slot,
};
use crate::{NodeKind, Span};

/// Parts of a loop clause.
///
/// Absent parts are `NodeId::INVALID`. `scope` is the range holding the FOR
/// counter; `body_scope` the range shared by the WHILE, DO and UNTIL parts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoopParts {
    pub scope: ScopeId,
    pub counter: Option<Slot>,
    pub from: NodeId,
    pub by: NodeId,
    pub to: NodeId,
    pub body_scope: ScopeId,
    /// Enquiry clause yielding BOOL.
    pub while_part: NodeId,
    /// Serial clause.
    pub do_part: NodeId,
    /// Enquiry clause yielding BOOL.
    pub until_part: NodeId,
}

impl LoopParts {
    /// A bare `DO body OD` loop; fill in the optional parts as needed.
    pub fn new(scope: ScopeId, body_scope: ScopeId, do_part: NodeId) -> Self {
        LoopParts {
            scope,
            counter: None,
            from: NodeId::INVALID,
            by: NodeId::INVALID,
            to: NodeId::INVALID,
            body_scope,
            while_part: NodeId::INVALID,
            do_part,
            until_part: NodeId::INVALID,
        }
    }

    /// The counter is only stepped when the loop names it or bounds it.
    #[inline]
    pub fn increments(&self) -> bool {
        self.counter.is_some() || self.to.is_valid()
    }
}

/// One alternative of a conformity case: `(specifiers binding): unit`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConformityAlt {
    pub specifiers: ModeRange,
    pub binding: Option<Slot>,
    pub scope: ScopeId,
    pub unit: NodeId,
}

/// Program tree storage.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    kinds: Vec<NodeKind>,
    spans: Vec<Span>,
    modes: Vec<ModeId>,
    lists: Vec<NodeId>,
    mode_lists: Vec<ModeId>,
    loops: Vec<LoopParts>,
    alternatives: Vec<ConformityAlt>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node.
    pub fn push(&mut self, kind: NodeKind, mode: ModeId, span: Span) -> NodeId {
        let id = NodeId::new(to_u32(self.kinds.len(), "nodes"));
        self.kinds.push(kind);
        self.spans.push(span);
        self.modes.push(mode);
        id
    }

    /// Append a child list.
    pub fn push_list(&mut self, ids: &[NodeId]) -> NodeRange {
        let start = to_u32(self.lists.len(), "list entries");
        self.lists.extend_from_slice(ids);
        NodeRange::new(start, to_u16(ids.len(), "child list"))
    }

    /// Append a mode list.
    pub fn push_mode_list(&mut self, modes: &[ModeId]) -> ModeRange {
        let start = to_u32(self.mode_lists.len(), "mode list entries");
        self.mode_lists.extend_from_slice(modes);
        ModeRange::new(start, to_u16(modes.len(), "mode list"))
    }

    pub fn push_loop(&mut self, parts: LoopParts) -> LoopId {
        let id = LoopId::new(to_u32(self.loops.len(), "loops"));
        self.loops.push(parts);
        id
    }

    pub fn push_alternative(&mut self, alt: ConformityAlt) -> AltId {
        let id = AltId::new(to_u32(self.alternatives.len(), "alternatives"));
        self.alternatives.push(alt);
        id
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.kinds[id.index()]
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    /// Static mode of a node.
    #[inline]
    pub fn mode(&self, id: NodeId) -> ModeId {
        self.modes[id.index()]
    }

    #[inline]
    pub fn list(&self, range: NodeRange) -> &[NodeId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    #[inline]
    pub fn mode_list(&self, range: ModeRange) -> &[ModeId] {
        let start = range.start as usize;
        &self.mode_lists[start..start + range.len()]
    }

    #[inline]
    pub fn loop_parts(&self, id: LoopId) -> &LoopParts {
        &self.loops[id.index()]
    }

    #[inline]
    pub fn alternative(&self, id: AltId) -> &ConformityAlt {
        &self.alternatives[id.index()]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
