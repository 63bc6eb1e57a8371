//! Index newtypes and ranges for the flat program tree.
//!
//! Every structure produced upstream is addressed by a `u32` index into an
//! arena owned by [`Tree`](crate::Tree), [`ModeTable`](crate::ModeTable) or
//! [`ScopeTable`](crate::ScopeTable). Optional children use the `INVALID`
//! sentinel instead of `Option` so that [`NodeKind`](crate::NodeKind) stays
//! `Copy` and small.

use std::fmt;

/// Convert an arena length into a `u32` index.
///
/// # Panics
/// Panics if the arena outgrows `u32::MAX` entries, which no tree produced
/// by the parser can reach.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    match u32::try_from(len) {
        Ok(v) => v,
        Err(_) => panic!("too many {what}: {len} exceeds u32::MAX"),
    }
}

/// Convert a list length into a `u16` range length.
///
/// # Panics
/// Panics if a single child list exceeds `u16::MAX` entries.
#[inline]
pub(crate) fn to_u16(len: usize, what: &str) -> u16 {
    match u16::try_from(len) {
        Ok(v) => v,
        Err(_) => panic!("{what} too long: {len} exceeds u16::MAX"),
    }
}

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel meaning "absent".
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_index!(
    /// Index of a syntax node in the [`Tree`](crate::Tree).
    NodeId
);

define_index!(
    /// Index of a mode (static type) in the [`ModeTable`](crate::ModeTable).
    ModeId
);

define_index!(
    /// Index of a lexical range (symbol table) in the [`ScopeTable`](crate::ScopeTable).
    ScopeId
);

define_index!(
    /// Index of a label in the [`LabelTable`](crate::LabelTable).
    LabelId
);

define_index!(
    /// Index of the parts of a loop clause in the tree's loop pool.
    LoopId
);

define_index!(
    /// Index of a conformity-case alternative in the tree's alternative pool.
    AltId
);

impl ScopeId {
    /// The standard environ: level 0, always open while a genie lives.
    pub const STANDARD_ENVIRON: ScopeId = ScopeId(0);
}

/// A contiguous run of node ids in the tree's flat child list.
///
/// Layout mirrors the other compact ranges: `start: u32, len: u16`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct NodeRange {
    pub start: u32,
    pub len: u16,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        NodeRange { start, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for NodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NodeRange({}..{})",
            self.start,
            self.start + u32::from(self.len)
        )
    }
}

/// A contiguous run of mode ids (conformity specifiers, parameter lists).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
#[repr(C)]
pub struct ModeRange {
    pub start: u32,
    pub len: u16,
}

impl ModeRange {
    pub const EMPTY: ModeRange = ModeRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        ModeRange { start, len }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Address of a local in a frame, computed by the parser.
///
/// `level` is the lexical level of the owning range; `offset` the index of
/// the local within that range's frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Slot {
    pub level: u16,
    pub offset: u16,
}

impl Slot {
    #[inline]
    pub const fn new(level: u16, offset: u16) -> Self {
        Slot { level, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ids_debug_print() {
        assert_eq!(format!("{:?}", NodeId::INVALID), "NodeId::INVALID");
        assert_eq!(format!("{:?}", NodeId::new(7)), "NodeId(7)");
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn range_len() {
        let r = NodeRange::new(4, 3);
        assert_eq!(r.len(), 3);
        assert!(!r.is_empty());
        assert!(NodeRange::EMPTY.is_empty());
        assert_eq!(format!("{r:?}"), "NodeRange(4..7)");
    }

    #[test]
    fn standard_environ_is_first_scope() {
        assert_eq!(ScopeId::STANDARD_ENVIRON.index(), 0);
    }
}
