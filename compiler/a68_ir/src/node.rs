//! Node kinds of the program tree.
//!
//! `NodeKind` is `Copy`: every child is a [`NodeId`], a [`NodeRange`] into
//! the tree's flat child list, or an id into one of the tree's pools. Optional
//! children are `NodeId::INVALID`.

use crate::ids::{AltId, LabelId, LoopId, NodeId, NodeRange, ScopeId, Slot};
use crate::Name;

/// Denotation payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Str(Name),
}

/// Standard-prelude procedures the genie knows natively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StdProc {
    Print,
    Newline,
}

/// Standard operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StdOp {
    Add,
    Sub,
    Mul,
    /// `/`, always yields REAL.
    Div,
    /// `%` / `OVER`, integer division.
    Over,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Neg,
    Abs,
    /// Monadic `+`.
    Plus,
    Upb,
    Lwb,
    Elem,
    Concat,
}

impl StdOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            StdOp::Add | StdOp::Plus => "+",
            StdOp::Sub | StdOp::Neg => "-",
            StdOp::Mul => "*",
            StdOp::Div => "/",
            StdOp::Over => "%",
            StdOp::Mod => "MOD",
            StdOp::Pow => "**",
            StdOp::Eq => "=",
            StdOp::Ne => "/=",
            StdOp::Lt => "<",
            StdOp::Le => "<=",
            StdOp::Gt => ">",
            StdOp::Ge => ">=",
            StdOp::And => "AND",
            StdOp::Or => "OR",
            StdOp::Not => "NOT",
            StdOp::Abs => "ABS",
            StdOp::Upb => "UPB",
            StdOp::Lwb => "LWB",
            StdOp::Elem => "ELEM",
            StdOp::Concat => "+:",
        }
    }
}

/// Operator of a formula: a standard operator or a user-declared one whose
/// routine lives in a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Standard(StdOp),
    User(Slot),
}

/// Coercions inserted by the mode checker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CoercionKind {
    Dereference,
    Deprocedure,
    Unite,
    Widen,
    Row,
    Void,
}

/// Shape of a syntax node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NodeKind {
    // Serial-clause structure
    /// Declarations and units of one range. `items` may hold nested `Group`s
    /// and `DeclarationList`s, separators, punctuation and labelled units.
    SerialClause { scope: ScopeId, items: NodeRange },
    /// Transparent grouping left by the parser.
    Group { items: NodeRange },
    DeclarationList { items: NodeRange },
    /// `;` between statements.
    Separator,
    /// `EXIT` at a statement boundary.
    Exit,
    /// Punctuation with no run-time meaning (`,`).
    Punct,
    Labeled { label: LabelId, unit: NodeId },

    // Declarations
    IdentityDeclaration { slot: Slot, value: NodeId },
    /// `init` is `INVALID` for an uninitialised variable.
    VariableDeclaration { slot: Slot, generator: NodeId, init: NodeId },
    ModeDeclaration,

    // Units
    Denotation(Literal),
    Identifier { slot: Slot },
    Standard(StdProc),
    Call { primary: NodeId, args: NodeRange },
    /// `indexers` are subscript units or `Trimmer` nodes.
    Slice { primary: NodeId, indexers: NodeRange },
    /// `lower`/`upper` may be `INVALID` (defaults to the primary's bounds).
    Trimmer { lower: NodeId, upper: NodeId },
    Cast { unit: NodeId },
    FormatText { text: Name },
    /// `LOC`/`HEAP` generator; `bounds` are `Bound` nodes for row modes.
    Generator { heap: bool, bounds: NodeRange },
    Bound { lower: NodeId, upper: NodeId },
    Selection { field: u16, secondary: NodeId },
    Formula { op: Operator, left: NodeId, right: NodeId },
    Monadic { op: Operator, operand: NodeId },
    IdentityRelation { is: bool, left: NodeId, right: NodeId },
    Nihil,
    /// Routine text; the first `params` locals of `scope` are its parameters.
    RoutineText { scope: ScopeId, params: u16, body: NodeId },
    Skip,
    Jump { label: LabelId },
    AndFunction { left: NodeId, right: NodeId },
    OrFunction { left: NodeId, right: NodeId },
    Assertion { condition: NodeId },
    Diagonal { offset: NodeId, operand: NodeId },
    Transpose { operand: NodeId },
    RowFunction { offset: NodeId, operand: NodeId },
    ColumnFunction { offset: NodeId, operand: NodeId },
    Assignation { destination: NodeId, source: NodeId },
    Coercion { kind: CoercionKind, operand: NodeId },

    // Enclosed clauses
    Closed { scope: ScopeId, serial: NodeId },
    /// `else_part` is `INVALID`, a `Closed` clause, or a nested
    /// `Conditional` for `ELIF`.
    Conditional {
        scope: ScopeId,
        enquiry: NodeId,
        then_part: NodeId,
        else_part: NodeId,
    },
    /// `out_part` is `INVALID`, a `Closed` clause, or a nested case for `OUSE`.
    IntegerCase {
        scope: ScopeId,
        enquiry: NodeId,
        alternatives: NodeRange,
        out_part: NodeId,
    },
    /// `alternatives` are `ConformityAlternative` nodes (possibly grouped).
    ConformityCase {
        scope: ScopeId,
        enquiry: NodeId,
        alternatives: NodeRange,
        out_part: NodeId,
    },
    ConformityAlternative(AltId),
    Loop(LoopId),
    Collateral { units: NodeRange },
    Parallel { units: NodeRange },
}

impl NodeKind {
    /// Short name for diagnostics and tracing.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::SerialClause { .. } => "serial clause",
            NodeKind::Group { .. } => "group",
            NodeKind::DeclarationList { .. } => "declaration list",
            NodeKind::Separator => "separator",
            NodeKind::Exit => "exit",
            NodeKind::Punct => "punctuation",
            NodeKind::Labeled { .. } => "labelled unit",
            NodeKind::IdentityDeclaration { .. } => "identity declaration",
            NodeKind::VariableDeclaration { .. } => "variable declaration",
            NodeKind::ModeDeclaration => "mode declaration",
            NodeKind::Denotation(_) => "denotation",
            NodeKind::Identifier { .. } => "identifier",
            NodeKind::Standard(_) => "standard procedure",
            NodeKind::Call { .. } => "call",
            NodeKind::Slice { .. } => "slice",
            NodeKind::Trimmer { .. } => "trimmer",
            NodeKind::Cast { .. } => "cast",
            NodeKind::FormatText { .. } => "format text",
            NodeKind::Generator { .. } => "generator",
            NodeKind::Bound { .. } => "bound",
            NodeKind::Selection { .. } => "selection",
            NodeKind::Formula { .. } => "formula",
            NodeKind::Monadic { .. } => "monadic formula",
            NodeKind::IdentityRelation { .. } => "identity relation",
            NodeKind::Nihil => "NIL",
            NodeKind::RoutineText { .. } => "routine text",
            NodeKind::Skip => "SKIP",
            NodeKind::Jump { .. } => "jump",
            NodeKind::AndFunction { .. } => "ANDTH",
            NodeKind::OrFunction { .. } => "OREL",
            NodeKind::Assertion { .. } => "assertion",
            NodeKind::Diagonal { .. } => "DIAG",
            NodeKind::Transpose { .. } => "TRNSP",
            NodeKind::RowFunction { .. } => "ROW",
            NodeKind::ColumnFunction { .. } => "COL",
            NodeKind::Assignation { .. } => "assignation",
            NodeKind::Coercion { .. } => "coercion",
            NodeKind::Closed { .. } => "closed clause",
            NodeKind::Conditional { .. } => "conditional clause",
            NodeKind::IntegerCase { .. } => "case clause",
            NodeKind::ConformityCase { .. } => "conformity clause",
            NodeKind::ConformityAlternative(_) => "conformity alternative",
            NodeKind::Loop(_) => "loop clause",
            NodeKind::Collateral { .. } => "collateral clause",
            NodeKind::Parallel { .. } => "parallel clause",
        }
    }

    /// Whether this kind is an enclosed clause.
    pub fn is_enclosed(&self) -> bool {
        matches!(
            self,
            NodeKind::Closed { .. }
                | NodeKind::Conditional { .. }
                | NodeKind::IntegerCase { .. }
                | NodeKind::ConformityCase { .. }
                | NodeKind::Loop(_)
                | NodeKind::Collateral { .. }
                | NodeKind::Parallel { .. }
        )
    }

    /// Whether this kind is a declaration.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::IdentityDeclaration { .. }
                | NodeKind::VariableDeclaration { .. }
                | NodeKind::ModeDeclaration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_stays_small() {
        assert!(std::mem::size_of::<NodeKind>() <= 32);
    }

    #[test]
    fn enclosed_classification() {
        let closed = NodeKind::Closed {
            scope: ScopeId::new(1),
            serial: NodeId::new(0),
        };
        assert!(closed.is_enclosed());
        assert!(!NodeKind::Skip.is_enclosed());
        assert!(NodeKind::ModeDeclaration.is_declaration());
        assert_eq!(closed.name(), "closed clause");
    }
}
