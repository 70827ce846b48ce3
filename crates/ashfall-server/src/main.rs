use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ashfall_core::definitions::DefinitionTable;
use ashfall_server::config::ServerConfig;
use ashfall_server::error::ServerError;
use ashfall_server::host::ZoneHost;
use ashfall_server::ports::{LogBroadcaster, MemoryCharacterStore};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "server failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_args_or_env(std::env::args().nth(1))?;
    let definitions = match &config.definitions {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading definitions");
            DefinitionTable::load(path)?
        }
        None => DefinitionTable::builtin(),
    };

    let host = ZoneHost::start(
        &config,
        Arc::new(definitions),
        Arc::new(LogBroadcaster),
        Arc::new(MemoryCharacterStore::new()),
    )?;
    tracing::info!(zones = ?host.zone_ids(), "serving; type `quit` or close stdin to stop");

    // Sessions attach through the host API; stdin only controls shutdown.
    for line in std::io::stdin().lock().lines() {
        match line {
            Ok(line) if line.trim() == "quit" => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    host.shutdown();
    Ok(())
}
