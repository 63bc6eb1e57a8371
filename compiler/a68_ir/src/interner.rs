//! Interned identifiers and string denotations.
//!
//! The parser interns every tag, label and string denotation once; the genie
//! only ever looks names up. Interning therefore takes `&mut self` and needs
//! no locking.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::ids::to_u32;

/// Interned string.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// String interner for tags, labels and denotations.
#[derive(Clone, Debug)]
pub struct StringInterner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        };
        interner.intern("");
        interner
    }

    /// Intern `s`, returning the existing name if already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let name = Name(to_u32(self.strings.len(), "interned strings"));
        self.strings.push(s.into());
        self.map.insert(s.into(), name);
        name
    }

    /// Look up a name. Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings
            .get(name.0 as usize)
            .map_or("", |s| &**s)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
