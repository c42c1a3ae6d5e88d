//! Interned identifiers shared by tables, conditions, and resolver output.
//!
//! Content refers to lists, objects, globals, and functions by string id.
//! Those strings are interned once when a table is built, so the hot path only
//! compares and hashes `u32` handles.

use std::collections::HashMap;
use std::fmt;

/// Interned content identifier (list, object, global, template, or function name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormId(pub u32);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Position of a [`crate::LeveledList`] in the table arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListIndex(pub u32);

impl ListIndex {
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Opaque handle to a host actor or reference a condition may run on.
///
/// The resolver never interprets it; it is forwarded to the condition oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorRef(pub u64);

impl ActorRef {
    /// Placeholder used when a call has no meaningful target.
    pub const NONE: Self = Self(0);
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// String interner owned by a [`crate::LeveledTable`].
#[derive(Clone, Debug, Default)]
pub struct Interner {
    names: Vec<Box<str>>,
    lookup: HashMap<Box<str>, FormId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, interning it on first sight.
    pub fn intern(&mut self, name: &str) -> FormId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = FormId(self.names.len() as u32);
        self.names.push(name.into());
        self.lookup.insert(name.into(), id);
        id
    }

    /// Looks up an already interned name.
    pub fn get(&self, name: &str) -> Option<FormId> {
        self.lookup.get(name).copied()
    }

    /// Returns the string behind an id, if it was produced by this interner.
    pub fn resolve(&self, id: FormId) -> Option<&str> {
        self.names.get(id.0 as usize).map(|name| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
