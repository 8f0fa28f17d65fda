//! The request bridge: one connection, one payload, at most one reply.
//!
//! Runs on a blocking thread. Reads a single chunk, classifies it, hands the
//! work to the session, writes the history text back if one was asked for,
//! and releases the connection on every path.

use std::io::{Read, Write};

use chatrelay_types::config::HISTORY_UNAVAILABLE_TEXT;
use chatrelay_types::error::BridgeError;
use tracing::{debug, warn};

use super::request::RelayRequest;
use crate::session::RelaySession;

/// What a finished bridge unit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A post was queued; nothing was written back.
    Posted { bytes: usize },
    /// History text (or the unavailable text) was written back.
    History { bytes: usize },
    /// Empty payload; nothing happened.
    Ignored,
}

/// Serve one connection and release it.
///
/// Errors are logged here and never returned: one bad connection must not
/// disturb the listener. The stream is consumed, so it is closed when this
/// returns.
pub fn handle_connection<S, R>(mut stream: S, session: &R, max_payload_bytes: usize)
where
    S: Read + Write,
    R: RelaySession + ?Sized,
{
    match relay_request(&mut stream, session, max_payload_bytes) {
        Ok(outcome) => debug!(?outcome, "connection handled"),
        Err(err) => warn!(error = %err, "error handling client"),
    }
}

/// Read, classify, and fulfil a single request on `stream`.
pub fn relay_request<S, R>(
    stream: &mut S,
    session: &R,
    max_payload_bytes: usize,
) -> Result<RelayOutcome, BridgeError>
where
    S: Read + Write,
    R: RelaySession + ?Sized,
{
    let mut buf = vec![0u8; max_payload_bytes];
    let read = stream.read(&mut buf)?;
    let payload = std::str::from_utf8(&buf[..read]).map_err(|_| BridgeError::InvalidUtf8)?;

    match RelayRequest::classify(payload) {
        RelayRequest::History => {
            let text = session.fetch_history().unwrap_or_else(|err| {
                warn!(error = %err, "history request failed");
                HISTORY_UNAVAILABLE_TEXT.to_string()
            });
            stream.write_all(text.as_bytes())?;
            stream.flush()?;
            Ok(RelayOutcome::History { bytes: text.len() })
        }
        RelayRequest::Post(text) => {
            let bytes = text.len();
            session.post_message(text)?;
            Ok(RelayOutcome::Posted { bytes })
        }
        RelayRequest::Empty => Ok(RelayOutcome::Ignored),
    }
}
