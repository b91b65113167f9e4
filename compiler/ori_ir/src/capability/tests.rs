use pretty_assertions::assert_eq;

use super::*;

fn name(n: u32) -> Name {
    Name::from_raw(n)
}

#[test]
fn insert_keeps_sorted_and_deduplicated() {
    let mut set = CapabilitySet::new();
    assert!(set.insert(name(9)));
    assert!(set.insert(name(2)));
    assert!(!set.insert(name(9)));
    assert!(set.insert(name(5)));
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![name(2), name(5), name(9)]);
}

#[test]
fn from_iter_equals_incremental_insert() {
    let collected: CapabilitySet = [name(3), name(1), name(3)].into_iter().collect();
    let mut inserted = CapabilitySet::new();
    inserted.insert(name(1));
    inserted.insert(name(3));
    assert_eq!(collected, inserted);
}

#[test]
fn union_reports_growth() {
    let mut a = CapabilitySet::single(name(1));
    let b: CapabilitySet = [name(1), name(2)].into_iter().collect();
    assert!(a.union_with(&b));
    assert!(!a.union_with(&b), "second union is a no-op");
    assert_eq!(a, b);
}

#[test]
fn subset_and_difference() {
    let small = CapabilitySet::single(Name::ASYNC);
    let big: CapabilitySet = [Name::ASYNC, Name::CACHE].into_iter().collect();
    assert!(small.is_subset(&big));
    assert!(!big.is_subset(&small));
    assert!(CapabilitySet::new().is_subset(&small));
    assert_eq!(big.difference(&small), CapabilitySet::single(Name::CACHE));
}

#[test]
fn remove_member() {
    let mut set: CapabilitySet = [Name::FFI, Name::CACHE].into_iter().collect();
    assert!(set.remove(Name::FFI));
    assert!(!set.remove(Name::FFI));
    assert_eq!(set.len(), 1);
}

#[test]
fn markers() {
    assert!(is_marker_capability(Name::ASYNC));
    assert!(is_marker_capability(Name::FFI));
    assert!(!is_marker_capability(Name::CACHE));
}

#[test]
fn display_uses_interned_text() {
    let interner = StringInterner::new();
    let http = interner.intern("Http");
    let set: CapabilitySet = [http, Name::ASYNC].into_iter().collect();
    assert_eq!(set.display(&interner).to_string(), "{Async, Http}");
    assert_eq!(CapabilitySet::new().display(&interner).to_string(), "{}");
}
