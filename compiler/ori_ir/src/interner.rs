//! Thread-safe string interner.
//!
//! The runtime evaluates task bodies on worker threads that all resolve
//! names against the same interner, so lookups take a read lock and only
//! first-time interning takes the write lock.

// Arc is needed for SharedInterner: compiled modules are shared with task threads.
#![allow(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner thread-safety"
)]

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct InternTable {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// String interner mapping text to [`Name`]s.
///
/// Interned strings are leaked: a compilation session interns a bounded
/// vocabulary (identifiers, capability names, check messages) and keeps it
/// alive for the whole run.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut table = InternTable::default();
        for (text, name) in Name::PRE_INTERNED {
            debug_assert_eq!(name.index(), table.strings.len());
            table.map.insert(text, name);
            table.strings.push(text);
        }
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Intern `s`, returning the existing name if already present.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }

        let mut table = self.table.write();
        // Another thread may have won the race between the two locks.
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let raw = u32::try_from(table.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_raw(raw);
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        name
    }

    /// Look up a name without interning.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    /// Resolve a name to its text. Unknown names resolve to `""`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        // The empty string is always present.
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Reference-counted interner shared between the compiler and task threads.
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
