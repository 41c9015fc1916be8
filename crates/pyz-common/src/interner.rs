//! String interning for identifiers and type-variable names.
//!
//! Every distinct string is stored once and addressed by an [`Atom`]. Atoms
//! compare in O(1) and are `Copy`, so the solver can carry names inside
//! interned type data without cloning strings.
//!
//! The interner is shared across threads: lookups go through a `DashMap`
//! and the reverse table sits behind an `RwLock`.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, RwLock};

/// Interned string handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string, pre-registered by every interner.
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Thread-safe string interner.
pub struct Interner {
    map: DashMap<Arc<str>, Atom, FxBuildHasher>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        let interner = Self {
            map: DashMap::with_hasher(FxBuildHasher),
            strings: RwLock::new(Vec::new()),
        };
        interner.intern("");
        interner
    }

    /// Intern `s`, returning the existing atom when it was seen before.
    pub fn intern(&self, s: &str) -> Atom {
        if let Some(atom) = self.map.get(s) {
            return *atom;
        }

        // Hold the write lock across the insert so two racing threads
        // cannot hand out different atoms for the same string.
        let mut strings = match self.strings.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(atom) = self.map.get(s) {
            return *atom;
        }
        let atom = Atom(strings.len() as u32);
        let shared: Arc<str> = Arc::from(s);
        strings.push(Arc::clone(&shared));
        self.map.insert(shared, atom);
        atom
    }

    /// Resolve an atom back to its string.
    ///
    /// Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let strings = match self.strings.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        strings
            .get(atom.index())
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
