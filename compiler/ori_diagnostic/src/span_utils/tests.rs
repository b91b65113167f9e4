use super::*;

#[test]
fn empty_source_has_one_line() {
    let table = LineOffsetTable::build("");
    assert_eq!(table.line_count(), 1);
    assert_eq!(table.offset_to_line_col(0), (1, 1));
}

#[test]
fn offsets_on_newlines_belong_to_their_line() {
    let table = LineOffsetTable::build("ab\ncd\n");
    assert_eq!(table.offset_to_line_col(2), (1, 3));
    assert_eq!(table.offset_to_line_col(3), (2, 1));
    assert_eq!(table.offset_to_line_col(6), (3, 1));
}

#[test]
fn span_start_uses_start_offset() {
    let table = LineOffsetTable::build("run(\n  spawn(body: x)\n)");
    assert_eq!(table.span_start(Span::new(7, 12)), (2, 3));
}
