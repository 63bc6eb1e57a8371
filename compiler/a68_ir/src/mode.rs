//! Modes (Algol 68 static types) and the structural equivalence oracle.
//!
//! Modes are hash-consed: structurally equal modes intern to the same
//! [`ModeId`], so the default [`ModeOracle`] reduces equivalence to id
//! equality. Union variant lists are sorted and deduplicated on interning.

use rustc_hash::FxHashMap;

use crate::ids::{to_u32, ModeId};
use crate::Name;

impl ModeId {
    pub const VOID: ModeId = ModeId::new(0);
    pub const INT: ModeId = ModeId::new(1);
    pub const REAL: ModeId = ModeId::new(2);
    pub const BOOL: ModeId = ModeId::new(3);
    pub const CHAR: ModeId = ModeId::new(4);
    pub const STRING: ModeId = ModeId::new(5);
    pub const FORMAT: ModeId = ModeId::new(6);
}

/// A named field of a structured mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Name,
    pub mode: ModeId,
}

/// Shape of a mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Void,
    Int,
    Real,
    Bool,
    Char,
    String,
    Format,
    /// `REF m`
    Ref(ModeId),
    /// `[,...]m` with `dims` dimensions.
    Row { dims: u8, element: ModeId },
    /// `STRUCT (m a, n b)`
    Struct(Box<[Field]>),
    /// `UNION (m, n)`, variants sorted by id.
    Union(Box<[ModeId]>),
    /// `PROC (m, n) r`
    Proc { params: Box<[ModeId]>, result: ModeId },
}

/// Hash-consed table of every mode in a program.
#[derive(Clone, Debug)]
pub struct ModeTable {
    modes: Vec<Mode>,
    index: FxHashMap<Mode, ModeId>,
}

impl ModeTable {
    /// Create a table holding the primitive modes at their fixed ids.
    pub fn new() -> Self {
        let mut table = ModeTable {
            modes: Vec::with_capacity(32),
            index: FxHashMap::default(),
        };
        for mode in [
            Mode::Void,
            Mode::Int,
            Mode::Real,
            Mode::Bool,
            Mode::Char,
            Mode::String,
            Mode::Format,
        ] {
            table.intern(mode);
        }
        table
    }

    /// Intern a mode, returning the id of a structurally equal one if present.
    pub fn intern(&mut self, mode: Mode) -> ModeId {
        let mode = match mode {
            Mode::Union(variants) => {
                let mut v = variants.into_vec();
                v.sort_unstable();
                v.dedup();
                Mode::Union(v.into_boxed_slice())
            }
            other => other,
        };
        if let Some(&id) = self.index.get(&mode) {
            return id;
        }
        let id = ModeId::new(to_u32(self.modes.len(), "modes"));
        self.modes.push(mode.clone());
        self.index.insert(mode, id);
        id
    }

    pub fn ref_to(&mut self, mode: ModeId) -> ModeId {
        self.intern(Mode::Ref(mode))
    }

    pub fn row_of(&mut self, element: ModeId, dims: u8) -> ModeId {
        self.intern(Mode::Row { dims, element })
    }

    pub fn union_of(&mut self, variants: &[ModeId]) -> ModeId {
        self.intern(Mode::Union(variants.into()))
    }

    pub fn struct_of(&mut self, fields: &[(Name, ModeId)]) -> ModeId {
        let fields: Box<[Field]> = fields
            .iter()
            .map(|&(name, mode)| Field { name, mode })
            .collect();
        self.intern(Mode::Struct(fields))
    }

    pub fn proc_of(&mut self, params: &[ModeId], result: ModeId) -> ModeId {
        self.intern(Mode::Proc {
            params: params.into(),
            result,
        })
    }

    /// Shape of a mode.
    ///
    /// # Panics
    /// Panics on an id this table never produced.
    #[inline]
    pub fn get(&self, id: ModeId) -> &Mode {
        &self.modes[id.index()]
    }

    #[inline]
    pub fn is_void(&self, id: ModeId) -> bool {
        id == ModeId::VOID
    }

    /// Number of dimensions if `id` is a row mode.
    pub fn row_dims(&self, id: ModeId) -> Option<u8> {
        match self.get(id) {
            Mode::Row { dims, .. } => Some(*dims),
            _ => None,
        }
    }

    /// Union variants if `id` is a union mode.
    pub fn union_variants(&self, id: ModeId) -> Option<&[ModeId]> {
        match self.get(id) {
            Mode::Union(variants) => Some(variants),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural mode equivalence, consumed by union (conformity) dispatch.
///
/// The parser/elaborator owns the real notion of equivalence; the genie only
/// asks questions through this trait.
pub trait ModeOracle {
    /// Whether `a` and `b` denote the same mode.
    fn equivalent(&self, a: ModeId, b: ModeId) -> bool;

    /// Variants of `mode` if it is a union, `None` otherwise.
    fn variants(&self, mode: ModeId) -> Option<&[ModeId]>;

    /// Whether a conformity specifier of mode `pattern` accepts a value whose
    /// active variant is `variant`: either the modes are equivalent, or
    /// `pattern` is a union one of whose variants is equivalent to `variant`.
    fn accepts(&self, pattern: ModeId, variant: ModeId) -> bool {
        if self.equivalent(pattern, variant) {
            return true;
        }
        self.variants(pattern)
            .is_some_and(|vs| vs.iter().any(|&v| self.equivalent(v, variant)))
    }
}

impl ModeOracle for ModeTable {
    #[inline]
    fn equivalent(&self, a: ModeId, b: ModeId) -> bool {
        a == b
    }

    fn variants(&self, mode: ModeId) -> Option<&[ModeId]> {
        self.union_variants(mode)
    }
}

#[cfg(test)]
mod tests;
