//! The synchronous side of the relay.
//!
//! - `request` -- `RelayRequest` classification of a payload
//! - `bridge` -- one-connection request bridge run on a blocking thread
//! - `listener` -- `ConnectionListener`, the accept loop spawning bridge units

pub mod bridge;
pub mod listener;
pub mod request;

pub use bridge::{handle_connection, relay_request, RelayOutcome};
pub use listener::ConnectionListener;
pub use request::RelayRequest;
