//! Capability sets.
//!
//! A capability names an effect a function may perform (`Async`, `FFI`,
//! `Cache`, or any user trait such as `Http`). Sets are stored sorted by
//! [`Name`] and deduplicated, so two equal sets compare and hash equal and
//! diagnostics list members in a stable order.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, StringInterner};

/// Sorted, deduplicated set of capability names.
///
/// Most functions use zero to two capabilities, so four fit inline.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct CapabilitySet {
    items: SmallVec<[Name; 4]>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(cap: Name) -> Self {
        let mut set = Self::new();
        set.insert(cap);
        set
    }

    /// Returns `true` if `cap` was not already present.
    pub fn insert(&mut self, cap: Name) -> bool {
        match self.items.binary_search(&cap) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, cap);
                true
            }
        }
    }

    pub fn remove(&mut self, cap: Name) -> bool {
        match self.items.binary_search(&cap) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub fn contains(&self, cap: Name) -> bool {
        self.items.binary_search(&cap).is_ok()
    }

    /// Merge `other` into `self`. Returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &CapabilitySet) -> bool {
        let before = self.items.len();
        for &cap in &other.items {
            self.insert(cap);
        }
        self.items.len() != before
    }

    #[must_use]
    pub fn union(&self, other: &CapabilitySet) -> CapabilitySet {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.items.iter().all(|&cap| other.contains(cap))
    }

    /// Members of `self` not in `other`, in sorted order.
    #[must_use]
    pub fn difference(&self, other: &CapabilitySet) -> CapabilitySet {
        CapabilitySet {
            items: self
                .items
                .iter()
                .copied()
                .filter(|&cap| !other.contains(cap))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Name> + '_ {
        self.items.iter().copied()
    }

    /// Render as `{A, B}` using `interner` for names.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> DisplayCapabilities<'a> {
        DisplayCapabilities {
            set: self,
            interner,
        }
    }
}

impl FromIterator<Name> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        let mut items: SmallVec<[Name; 4]> = iter.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        CapabilitySet { items }
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = Name;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Name>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

/// `Async` and `FFI` describe what a function *is*, not a service it is
/// handed, so `with` cannot provide them.
#[inline]
pub fn is_marker_capability(cap: Name) -> bool {
    cap == Name::ASYNC || cap == Name::FFI
}

pub struct DisplayCapabilities<'a> {
    set: &'a CapabilitySet,
    interner: &'a StringInterner,
}

impl fmt::Display for DisplayCapabilities<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, cap) in self.set.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(self.interner.lookup(cap))?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests;
