use super::*;
use crate::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};

#[test]
fn proof_exists_only_for_a_positive_count() {
    assert_eq!(ErrorGuaranteed::from_error_count(0), None);
    assert!(ErrorGuaranteed::from_error_count(3).is_some());
}

#[test]
fn queue_hands_out_a_proof_once_an_error_is_queued() {
    let mut queue = DiagnosticQueue::new();
    assert_eq!(queue.has_errors(), None);
    queue.add(Diagnostic::warning(ErrorCode::E3002).with_message("just a warning"));
    assert_eq!(queue.has_errors(), None);

    let proof = queue.emit_error(Diagnostic::error(ErrorCode::E2014));
    assert_eq!(queue.has_errors(), Some(proof));
    assert_eq!(proof.to_string(), "error(s) emitted");
}

#[test]
fn filtered_error_still_yields_a_proof() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });
    queue.emit_error(Diagnostic::error(ErrorCode::E2014));
    let proof = queue.emit_error(Diagnostic::error(ErrorCode::E2019));
    assert_eq!(queue.dropped_count(), 1);
    assert_eq!(queue.has_errors(), Some(proof));
}
