//! Program tree for the Algol 68 genie.
//!
//! Everything in this crate is produced upstream (parser, mode checker,
//! scope resolver) and is immutable once a [`Program`] is sealed:
//!
//! - [`Tree`]: flat arena of [`NodeKind`]s with spans and static modes
//! - [`ModeTable`]: hash-consed modes plus the [`ModeOracle`] trait
//! - [`ScopeTable`] / [`LabelTable`]: lexical ranges, slot layouts, labels
//! - [`StringInterner`]: tags and string denotations

mod builder;
mod environ;
mod ids;
mod interner;
mod mode;
mod node;
mod scope;
mod span;
mod tree;

pub use builder::{Program, ProgramBuilder};
pub use ids::{AltId, LabelId, LoopId, ModeId, ModeRange, NodeId, NodeRange, ScopeId, Slot};
pub use interner::{Name, StringInterner};
pub use mode::{Field, Mode, ModeOracle, ModeTable};
pub use node::{CoercionKind, Literal, NodeKind, Operator, StdOp, StdProc};
pub use scope::{Label, LabelTable, Scope, ScopeTable};
pub use span::Span;
pub use tree::{ConformityAlt, LoopParts, Tree};
