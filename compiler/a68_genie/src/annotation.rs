//! Per-node genie annotations.
//!
//! The program tree is immutable; what the genie learns about a node on its
//! first visit lives in this side table, indexed by [`NodeId`]:
//!
//! - the linear chain of a label-free serial clause (or the flattened
//!   alternatives of a case clause),
//! - [`GenieFlags`] describing that chain,
//! - the memoized dispatch [`Strategy`].
//!
//! Every entry is written at most once. Once `LINEARIZED` is set the chain
//! never changes, and a memoized strategy is never replaced. The genie is
//! single-threaded, so the first visitor is the only writer.

use std::rc::Rc;

use a68_ir::NodeId;
use bitflags::bitflags;

bitflags! {
    /// State of a node's linearization.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct GenieFlags: u8 {
        /// First visit in progress.
        const LINEARIZING = 1 << 0;
        /// Chain cached; terminal.
        const LINEARIZED = 1 << 1;
        /// The clause's range declares no labels.
        const LABEL_FREE = 1 << 2;
        /// The chain is exactly one unit.
        const SINGLE_STEP = 1 << 3;
    }
}

/// One element of a linear chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainStep {
    /// A unit or declaration to evaluate.
    Unit(NodeId),
    /// Statement boundary: restore the clause's entry baseline.
    Boundary,
}

/// How a node is evaluated, memoized after its first evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Generic unit dispatch.
    Unit,
    Closed,
    Conditional,
    IntegerCase,
    ConformityCase,
    Loop,
    Collateral,
    Parallel,
}

/// A strategy plus the node it applies to. For a closed clause that reduces
/// to one unit, `source` is that unit rather than the clause itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub source: NodeId,
}

impl Strategy {
    #[inline]
    pub const fn new(kind: StrategyKind, source: NodeId) -> Self {
        Strategy { kind, source }
    }
}

#[derive(Clone, Debug, Default)]
struct Annotation {
    flags: GenieFlags,
    chain: Option<Rc<[ChainStep]>>,
    strategy: Option<Strategy>,
}

/// Side table of annotations for every node of one tree.
#[derive(Debug, Default)]
pub struct Annotations {
    entries: Vec<Annotation>,
}

impl Annotations {
    pub fn new(nodes: usize) -> Self {
        Annotations {
            entries: vec![Annotation::default(); nodes],
        }
    }

    #[inline]
    pub fn flags(&self, node: NodeId) -> GenieFlags {
        self.entries[node.index()].flags
    }

    /// Cached chain, if the node has been linearized.
    #[inline]
    pub fn chain(&self, node: NodeId) -> Option<Rc<[ChainStep]>> {
        self.entries[node.index()].chain.clone()
    }

    /// Mark the first visit as started. Returns `false` if the node is
    /// already linearized or being linearized.
    pub fn begin_linearizing(&mut self, node: NodeId) -> bool {
        let entry = &mut self.entries[node.index()];
        if entry
            .flags
            .intersects(GenieFlags::LINEARIZED | GenieFlags::LINEARIZING)
        {
            return false;
        }
        entry.flags |= GenieFlags::LINEARIZING;
        true
    }

    /// Cache `chain` for `node`. `SINGLE_STEP` is derived from the chain;
    /// `extra` adds flags such as `LABEL_FREE`. A second call is ignored.
    pub fn finish_linearizing(
        &mut self,
        node: NodeId,
        chain: Rc<[ChainStep]>,
        extra: GenieFlags,
    ) -> Rc<[ChainStep]> {
        let entry = &mut self.entries[node.index()];
        if let Some(existing) = &entry.chain {
            debug_assert_eq!(existing, &chain, "linear chain rewritten");
            return Rc::clone(existing);
        }
        let mut flags = GenieFlags::LINEARIZED | extra;
        if matches!(&*chain, [ChainStep::Unit(_)]) {
            flags |= GenieFlags::SINGLE_STEP;
        }
        entry.flags = (entry.flags - GenieFlags::LINEARIZING) | flags;
        entry.chain = Some(Rc::clone(&chain));
        chain
    }

    #[inline]
    pub fn strategy(&self, node: NodeId) -> Option<Strategy> {
        self.entries[node.index()].strategy
    }

    /// Memoize `strategy` for `node`. The first strategy wins.
    pub fn memoize(&mut self, node: NodeId, strategy: Strategy) {
        let slot = &mut self.entries[node.index()].strategy;
        if let Some(existing) = *slot {
            debug_assert_eq!(existing, strategy, "strategy rewritten");
        } else {
            *slot = Some(strategy);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
