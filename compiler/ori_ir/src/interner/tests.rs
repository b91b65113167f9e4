use super::*;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("Async");
    let b = interner.intern("Async");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "Async");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("spawn");
    let b = interner.intern("parallel");
    assert_ne!(a, b);
    assert!(a < b, "names are ordered by interning order");
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.len(), Name::PRE_INTERNED.len());
}

#[test]
fn well_known_capabilities_have_fixed_names() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern("Async"), Name::ASYNC);
    assert_eq!(interner.intern("FFI"), Name::FFI);
    assert_eq!(interner.intern("Cache"), Name::CACHE);
    assert_eq!(interner.lookup(Name::CHECK_RESULT), "__check_result");
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), Name::PRE_INTERNED.len());
}

#[test]
fn unknown_name_resolves_to_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(999)), "");
}

#[test]
fn shared_interner_is_usable_across_threads() {
    let shared = SharedInterner::new();
    let name = std::thread::scope(|s| {
        let handle = s.spawn(|| shared.intern("Logger"));
        handle.join().unwrap_or(Name::EMPTY)
    });
    assert_eq!(shared.lookup(name), "Logger");
}
