//! dossier - an interactive notebook for rings, subjects and their associations.

mod cli;

use anyhow::{bail, Context};
use cli::Cli;
use dossier::commands::{register_all, Evaluator, OutputSink, Registry};
use dossier::config::Config;
use dossier::persistence::Store;
use dossier::session::Session;
use dossier::{logging, repl};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    let mut config = Config::load_from_file(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    cli.apply(&mut config);

    logging::init_file_logging(config.debug);
    info!("Loaded config from {}", config_path.display());

    let db_path = config.database_path()?;
    let store = Store::open(&db_path)
        .await
        .with_context(|| format!("opening database {}", db_path.display()))?;

    let mut registry = Registry::new();
    register_all(&mut registry);
    info!("Registered {} commands", registry.len());

    let session = Session::new(config, store);
    let mut evaluator = Evaluator::new(registry, session, OutputSink::stdout())?;

    let failures = if cli.execute.is_empty() {
        repl::run_stdin(&mut evaluator).await?
    } else {
        repl::run_lines(&mut evaluator, &cli.execute).await
    };

    if let Ok(store) = evaluator.session().store() {
        store.close().await;
    }

    if !cli.execute.is_empty() && failures > 0 {
        bail!("{failures} line(s) failed");
    }
    Ok(())
}
