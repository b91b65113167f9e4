//! Line and column lookup for spans.
//!
//! Spans are byte offsets; humans want `line:col`. [`LineOffsetTable`]
//! pre-computes line starts once per source so each lookup is a binary
//! search.

use ori_ir::Span;

/// Byte offset of each line start.
///
/// ```
/// use ori_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(0), (1, 1));
/// assert_eq!(table.offset_to_line_col(6), (2, 1));
/// assert_eq!(table.offset_to_line_col(14), (3, 3));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LineOffsetTable {
    /// `offsets[0] = 0`; `offsets[n]` is the byte after the n-th newline.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(idx + 1).unwrap_or(u32::MAX)
    }

    /// 1-based `(line, column)`; the column counts bytes.
    pub fn offset_to_line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let start = self
            .offsets
            .get(line as usize - 1)
            .copied()
            .unwrap_or_default();
        (line, offset - start + 1)
    }

    pub fn span_start(&self, span: Span) -> (u32, u32) {
        self.offset_to_line_col(span.start)
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests;
