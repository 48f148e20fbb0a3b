use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use graytail::client::GraylogClient;
use graytail::config;
use graytail::error::Error;
use graytail::output::{print_stream_listing, OutputStyle};
use graytail::tail::Tailer;

const CONFIG_HELP: &str = "Example configuration file:

[server]
# Graylog REST API
uri = \"http://graylog.example.com:12900\"
# optional username and password
username = \"USERNAME\"
password = \"PASSWORD\"

This file should be located at .graytail.toml or ~/.graytail.toml.";

#[derive(Parser, Debug)]
#[command(name = "graytail", version, about = "Tail logs from Graylog.", after_help = CONFIG_HELP)]
struct Cli {
    /// Names of the streams to tail. Default: all streams.
    #[arg(long = "stream", value_name = "NAME", num_args = 1..)]
    stream_names: Vec<String>,

    /// List streams and exit.
    #[arg(long)]
    list_streams: bool,

    /// Query terms to search on.
    #[arg(long = "query", value_name = "TERM", num_args = 1..)]
    query: Vec<String>,

    /// Config files. Default: .graytail.toml, ~/.graytail.toml.
    #[arg(long = "config", value_name = "PATH", num_args = 1..)]
    config_paths: Vec<PathBuf>,

    /// Disable ANSI styling even on a terminal.
    #[arg(long)]
    no_color: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let style = OutputStyle::detect(cli.no_color);

    let config_paths = if cli.config_paths.is_empty() {
        config::default_config_paths()
    } else {
        cli.config_paths
    };

    let config = config::load(&config_paths)?;
    let client = GraylogClient::new(&config.server)?;

    // One snapshot per run; used for name resolution and header display.
    let streams = client
        .fetch_streams()
        .await
        .context("could not fetch streams from server")?;

    if cli.list_streams {
        print_stream_listing(&streams, style);
        return Ok(ExitCode::SUCCESS);
    }

    let stream_ids = if cli.stream_names.is_empty() {
        None
    } else {
        match streams.resolve_all(&cli.stream_names) {
            Ok(ids) => Some(ids),
            Err(e @ Error::StreamNotFound(_)) => {
                eprintln!("{}\n", e);
                print_stream_listing(&streams, style);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        }
    };

    let query = if cli.query.is_empty() {
        None
    } else {
        Some(cli.query.join(" "))
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let mut tailer = Tailer::new(client, streams, query, stream_ids, style);
    tailer.run(shutdown_rx).await?;

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
