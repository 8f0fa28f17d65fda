//! Minimal blocking client for a running relay: one payload out, optional
//! reply in, connection closed by the server.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use anyhow::Context;

use chatrelay_types::config::HISTORY_COMMAND;

const IO_TIMEOUT: Duration = Duration::from_secs(60);

/// Send one payload and return whatever the relay writes back before closing.
pub fn exchange(addr: &str, payload: &str) -> anyhow::Result<String> {
    let mut stream =
        TcpStream::connect(addr).with_context(|| format!("failed to connect to {addr}"))?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;

    stream.write_all(payload.as_bytes())?;
    stream.shutdown(Shutdown::Write)?;

    let mut reply = Vec::new();
    stream
        .read_to_end(&mut reply)
        .context("failed to read relay reply")?;
    String::from_utf8(reply).context("relay reply is not valid UTF-8")
}

/// Post `text` through the relay.
pub fn send(addr: &str, text: &str) -> anyhow::Result<()> {
    anyhow::ensure!(!text.is_empty(), "refusing to send an empty message");
    exchange(addr, text)?;
    Ok(())
}

/// Ask the relay for channel history.
pub fn history(addr: &str) -> anyhow::Result<String> {
    exchange(addr, HISTORY_COMMAND)
}
