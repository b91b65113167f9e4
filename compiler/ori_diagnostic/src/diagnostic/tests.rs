use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_collects_context() {
    let diag = Diagnostic::error(ErrorCode::E3002)
        .with_message("malformed `spawn`")
        .with_secondary_label(Span::new(0, 5), "pattern starts here")
        .with_label(Span::new(6, 9), "positional argument")
        .with_note("`spawn` takes named arguments only")
        .with_suggestion("write `body: ...`");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(6, 9)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes, vec!["`spawn` takes named arguments only".to_string()]);
}

#[test]
fn display_renders_all_parts() {
    let diag = Diagnostic::error(ErrorCode::E2014)
        .with_message("missing capability `Async`")
        .with_label(Span::new(3, 8), "requires `Async`")
        .with_note("called from `main`")
        .with_suggestion("add `uses Async`");

    assert_eq!(
        diag.to_string(),
        "error [E2014]: missing capability `Async`\n  --> 3..8: requires `Async`\n  = note: called from `main`\n  = help: add `uses Async`"
    );
}

#[test]
fn warnings_are_not_errors() {
    let diag = Diagnostic::warning(ErrorCode::E9001).with_message("odd");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), None);
}
