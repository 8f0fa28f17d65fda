//! Process supervisor: wires the Discord platform, the session event loop,
//! and the TCP listener, and owns their lifecycle.
//!
//! The session handle is created here and passed down explicitly; nothing
//! reaches the session through a global.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chatrelay_core::platform::ChatPlatform;
use chatrelay_core::relay::ConnectionListener;
use chatrelay_core::session::{SessionLoop, SessionSettings};
use chatrelay_infra::config::StartupConfig;
use chatrelay_infra::discord::DiscordPlatform;

/// How long to wait for in-flight connections and queued posts on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long runtime teardown waits on blocking tasks still running.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Build the multi-threaded runtime the binary runs on.
pub fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("chatrelay-worker")
        .build()
}

/// Tear the runtime down without waiting forever on blocking tasks.
///
/// Dropping a runtime joins every `spawn_blocking` task, and a bridge unit
/// stuck on a silent client (or the session join waiting behind it) would
/// otherwise keep the process alive after shutdown.
pub fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
}

/// Run the relay until Ctrl+C / SIGTERM, or until the session loop dies.
pub async fn serve(config: StartupConfig) -> anyhow::Result<()> {
    let relay = config.relay;
    let platform = DiscordPlatform::new(config.token, relay.api_base.as_str())?;

    let (handle, session_loop) = SessionLoop::spawn(
        platform,
        SessionSettings {
            channel_id: config.channel_id,
            history_limit: relay.history_limit,
            history_timeout: relay.history_timeout(),
        },
    )
    .context("failed to start chat session event loop")?;

    let listener = ConnectionListener::bind(
        &relay.listen_addr(),
        relay.listen_backlog,
        Arc::new(handle),
        relay.max_payload_bytes,
    )
    .await
    .with_context(|| format!("failed to bind {}", relay.listen_addr()))?
    .with_io_timeout(relay.io_timeout());

    let shutdown = CancellationToken::new();
    let listener_task = tokio::spawn(listener.run(shutdown.clone()));
    let mut session_exit = tokio::task::spawn_blocking(move || session_loop.join());

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown requested");
        }
        joined = &mut session_exit => {
            // The loop only exits early when login fails.
            shutdown.cancel();
            listener_task.await?;
            joined?.context("chat session stopped")?;
            return Ok(());
        }
    }

    shutdown.cancel();
    listener_task.await?;

    // Handles held by unfinished bridge units keep the loop alive; don't wait forever.
    match tokio::time::timeout(DRAIN_TIMEOUT, session_exit).await {
        Ok(joined) => joined?.context("chat session stopped")?,
        Err(_) => warn!("connections still open after {DRAIN_TIMEOUT:?}, exiting anyway"),
    }

    info!("relay stopped");
    Ok(())
}

/// Log in and resolve the target channel without starting the relay.
pub async fn check(config: &StartupConfig) -> anyhow::Result<()> {
    let platform = DiscordPlatform::new(config.token.clone(), config.relay.api_base.as_str())?;

    let identity = platform.connect().await.context("login failed")?;
    println!("  logged in as {identity}");

    match platform.resolve_channel(config.channel_id).await? {
        Some(channel) => {
            println!("  target channel: #{} ({})", channel.name, channel.id);
            println!("  listen address: {}", config.relay.listen_addr());
            Ok(())
        }
        None => anyhow::bail!("could not find chat channel with ID {}", config.channel_id),
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    use chatrelay_core::session::RelaySession;
    use chatrelay_types::error::SessionError;

    struct NullSession;

    impl RelaySession for NullSession {
        fn post_message(&self, _text: String) -> Result<(), SessionError> {
            Ok(())
        }

        fn fetch_history(&self) -> Result<String, SessionError> {
            Ok(String::new())
        }
    }

    #[test]
    fn shutdown_does_not_wait_on_idle_client() {
        let runtime = build_runtime().unwrap();
        let token = CancellationToken::new();

        let addr = runtime.block_on(async {
            let listener = ConnectionListener::bind("127.0.0.1:0", 5, Arc::new(NullSession), 1024)
                .await
                .unwrap()
                .with_io_timeout(None);
            let addr = listener.local_addr().unwrap();
            tokio::spawn(listener.run(token.clone()));
            addr
        });

        // Never sends, so its bridge unit blocks in read() with no timeout.
        let idle = std::net::TcpStream::connect(addr).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        token.cancel();

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            let started = Instant::now();
            shutdown_runtime(runtime);
            let _ = done_tx.send(started.elapsed());
        });

        let elapsed = done_rx
            .recv_timeout(RUNTIME_SHUTDOWN_GRACE + Duration::from_secs(3))
            .expect("runtime teardown hung on the idle client");
        assert!(elapsed < RUNTIME_SHUTDOWN_GRACE + Duration::from_secs(1));
        drop(idle);
    }
}
