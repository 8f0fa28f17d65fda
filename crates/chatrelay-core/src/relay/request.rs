//! Classification of a single inbound payload.

use chatrelay_types::config::HISTORY_COMMAND;

/// What a connection asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRequest {
    /// `/history`, any casing, surrounding whitespace ignored.
    History,
    /// Anything else that is non-empty, kept byte-for-byte.
    Post(String),
    /// Zero bytes.
    Empty,
}

impl RelayRequest {
    pub fn classify(payload: &str) -> Self {
        if payload.trim().eq_ignore_ascii_case(HISTORY_COMMAND) {
            RelayRequest::History
        } else if !payload.is_empty() {
            RelayRequest::Post(payload.to_string())
        } else {
            RelayRequest::Empty
        }
    }
}
