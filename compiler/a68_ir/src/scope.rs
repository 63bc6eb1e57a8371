//! Lexical ranges and labels.
//!
//! Every range that the genie opens a frame for has a [`Scope`]: its lexical
//! level, the modes of its locals (in slot order), and whether labels are
//! declared in it. Labels are bound by the parser to the serial clause that
//! owns them and to the labelled unit they name.

use crate::ids::{to_u16, to_u32, LabelId, ModeId, NodeId, ScopeId, Slot};
use crate::Name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    /// `INVALID` for the standard environ.
    pub parent: ScopeId,
    pub level: u16,
    pub locals: Vec<ModeId>,
    pub has_labels: bool,
}

/// All ranges of a program. Index 0 is the standard environ.
#[derive(Clone, Debug)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable {
            scopes: vec![Scope {
                parent: ScopeId::INVALID,
                level: 0,
                locals: Vec::new(),
                has_labels: false,
            }],
        }
    }

    /// Open a range nested in `parent`, one lexical level deeper.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let level = self.scopes[parent.index()].level + 1;
        let id = ScopeId::new(to_u32(self.scopes.len(), "scopes"));
        self.scopes.push(Scope {
            parent,
            level,
            locals: Vec::new(),
            has_labels: false,
        });
        id
    }

    /// Declare a local of `mode` in `scope`, returning its slot.
    pub fn add_local(&mut self, scope: ScopeId, mode: ModeId) -> Slot {
        let s = &mut self.scopes[scope.index()];
        let offset = to_u16(s.locals.len(), "locals");
        s.locals.push(mode);
        Slot::new(s.level, offset)
    }

    pub fn mark_labels(&mut self, scope: ScopeId) {
        self.scopes[scope.index()].has_labels = true;
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A label, resolved once by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub name: Name,
    /// Range the label is declared in.
    pub scope: ScopeId,
    /// Serial clause that owns the label.
    pub owner: NodeId,
    /// Labelled unit the label names.
    pub target: NodeId,
}

#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: Label) -> LabelId {
        let id = LabelId::new(to_u32(self.labels.len(), "labels"));
        self.labels.push(label);
        id
    }

    #[inline]
    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: LabelId) -> &mut Label {
        &mut self.labels[id.index()]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
