use std::fmt;

/// Error codes for pattern-core diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: capability errors
/// - E3xxx: pattern and contract errors
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Capability errors (E2xxx)
    /// Function body requires a capability its signature does not declare
    E2014,
    /// `with` tried to provide a marker capability (`Async`, `FFI`)
    E2019,

    // Pattern errors (E3xxx)
    /// Intrinsic called with the wrong number of arguments
    E3001,
    /// Pattern argument shape does not match its family
    E3002,
    /// `pre_check`/`post_check` in the wrong position
    E3004,

    // Internal errors (E9xxx)
    /// Internal invariant violated
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E2014,
        ErrorCode::E2019,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3004,
        ErrorCode::E9001,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short description used in documentation and `--explain`-style output.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E2014 => "missing capability",
            ErrorCode::E2019 => "capability cannot be provided",
            ErrorCode::E3001 => "wrong intrinsic arity",
            ErrorCode::E3002 => "malformed pattern",
            ErrorCode::E3004 => "misplaced check",
            ErrorCode::E9001 => "internal error",
        }
    }

    pub fn is_capability_error(self) -> bool {
        matches!(self, ErrorCode::E2014 | ErrorCode::E2019)
    }

    pub fn is_pattern_error(self) -> bool {
        matches!(self, ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3004)
    }

    pub fn from_str_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
