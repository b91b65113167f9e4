use super::*;

#[test]
fn len_and_contains() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(span.contains(10));
    assert!(span.contains(19));
    assert!(!span.contains(20));
}

#[test]
fn merge_is_order_independent() {
    let a = Span::new(20, 30);
    let b = Span::new(10, 25);
    assert_eq!(a.merge(b), Span::new(10, 30));
    assert_eq!(b.merge(a), Span::new(10, 30));
}

#[test]
fn contains_span_is_inclusive_of_edges() {
    let outer = Span::new(0, 50);
    assert!(outer.contains_span(Span::new(0, 50)));
    assert!(outer.contains_span(Span::new(10, 20)));
    assert!(!outer.contains_span(Span::new(40, 60)));
}

#[test]
fn point_is_empty() {
    let point = Span::point(42);
    assert!(point.is_empty());
    assert_eq!(point.len(), 0);
}

#[test]
fn inverted_span_has_zero_len() {
    assert_eq!(Span::new(9, 3).len(), 0);
}

#[test]
fn debug_and_display_match() {
    let span = Span::new(100, 200);
    assert_eq!(format!("{span:?}"), "100..200");
    assert_eq!(format!("{span}"), "100..200");
    assert_eq!(Span::default(), Span::DUMMY);
}
