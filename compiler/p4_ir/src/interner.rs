//! String interner for identifiers.
//!
//! The frontend is single-threaded, so the interner uses interior mutability
//! instead of locks. Interned strings are leaked for the lifetime of the
//! process; a compilation unit interns a bounded set of identifiers.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::Name;

/// Keywords and built-in identifiers interned up front.
const PRE_INTERNED: &[&str] = &[
    "main",
    "apply",
    "start",
    "accept",
    "reject",
    "NoAction",
    "actions",
    "default_action",
    "key",
    "size",
    "hit",
    "miss",
    "action_run",
    "isValid",
    "setValid",
    "setInvalid",
    "exact",
    "ternary",
    "lpm",
];

#[derive(Default)]
struct InternTable {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Interner mapping identifier text to [`Name`]s.
pub struct StringInterner {
    table: RefCell<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string and built-in identifiers.
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RefCell::new(InternTable::default()),
        };
        interner.intern("");
        for keyword in PRE_INTERNED {
            interner.intern(keyword);
        }
        interner
    }

    /// Intern a string, returning its [`Name`].
    pub fn intern(&self, s: &str) -> Name {
        let mut table = self.table.borrow_mut();
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let raw = u32::try_from(table.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_raw(raw);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        name
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.borrow().map.get(s).copied()
    }

    /// Resolve a [`Name`] to its text.
    ///
    /// Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .borrow()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.table.borrow().strings.len()
    }

    /// Whether only the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let interner = StringInterner::new();
        let a = interner.intern("hdr");
        let b = interner.intern("hdr");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "hdr");
    }

    #[test]
    fn empty_string_is_name_zero() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
    }

    #[test]
    fn builtins_are_pre_interned() {
        let interner = StringInterner::new();
        assert!(interner.get("NoAction").is_some());
        assert!(interner.get("user_name").is_none());
    }
}
