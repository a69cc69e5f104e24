//! CodeGraph CLI - source-code indexing and hybrid search.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use codegraph::cli::{Cli, Commands};
use codegraph::connector::api::controller::ApiController;
use codegraph::connector::api::{Container, ContainerConfig, Router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_dir = expand_tilde(&cli.data_dir);

    let mut config = ContainerConfig {
        data_dir: PathBuf::from(&data_dir),
        ..ContainerConfig::default()
    };
    if let Ok(timeout) = std::env::var("CODEGRAPH_PARSER_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.parser_timeout_secs = secs;
        }
    }

    // The API server needs an owned `Arc<Container>` to hand to axum as
    // request state, so it is built and handled separately from the router
    // that drives every other command.
    if let Commands::Api { host, port } = cli.command {
        let container = Arc::new(Container::new(config)?);
        let api = ApiController::new(&container);
        let message = api.serve(container.clone(), host, port).await?;
        println!("{message}");
        return Ok(());
    }

    let container = Container::new(config)?;
    let router = Router::new(&container);

    match router.route(cli.command).await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Expand ~ to home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
