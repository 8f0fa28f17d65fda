//! chatrelay entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, sets up tracing, then either serves the relay,
//! checks credentials, or acts as a one-shot client of a running relay.

mod cli;
mod client;
mod supervisor;

use clap::Parser;

use chatrelay_infra::config::resolve_startup_config;
use chatrelay_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_directive};

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let runtime = supervisor::build_runtime()?;

    let result = runtime.block_on(async {
        init_tracing(verbosity_directive(cli.verbose, cli.quiet), cli.otel)
            .map_err(|e| anyhow::anyhow!(e))?;
        run(cli).await
    });

    shutdown_tracing();
    supervisor::shutdown_runtime(runtime);
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let config = resolve_startup_config(&cli.overrides(), |k| std::env::var(k).ok()).await?;
            supervisor::serve(config).await
        }

        Commands::Check => {
            let config = resolve_startup_config(&cli.overrides(), |k| std::env::var(k).ok()).await?;
            supervisor::check(&config).await
        }

        Commands::Send { text, addr } => {
            let (text, addr) = (text.clone(), addr.clone());
            tokio::task::spawn_blocking(move || client::send(&addr, &text)).await?
        }

        Commands::History { addr } => {
            let addr = addr.clone();
            let history = tokio::task::spawn_blocking(move || client::history(&addr)).await??;
            println!("{history}");
            Ok(())
        }
    }
}
