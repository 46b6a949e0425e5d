// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esp_cli::config;
use esp_codec::{Decoder, Encoder};
use esp_evaluator::{EvaluatorHost, UnimplementedEngine};
use esp_package::PackageUri;
use esp_resolver::{DiskCachedResolver, InMemoryResolver, PackageResolver};
use esp_transport::Transport;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "esp-cli", version, about = "Evaluator Server Protocol CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package resolver cache directory. Falls back to `ESP_CACHE_DIR`, then
    /// an in-memory (non-persistent) resolver.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Tracing filter, e.g. `esp_evaluator=debug`. Falls back to `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the evaluator server loop over stdin/stdout. This is the entry
    /// point a Pkl host process spawns.
    Serve,

    /// Fetch and print a package's `DependencyMetadata` as JSON, without
    /// creating an evaluator. Useful for debugging a resolver configuration.
    Resolve {
        /// A `PackageURI` string, e.g. `package://example.com/pkg@1.0.0`.
        package_uri: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::new(config::resolve_log_level(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cache_dir = config::resolve_cache_dir(cli.cache_dir);

    let result = match cli.command {
        Commands::Serve => cmd_serve(cache_dir).await,
        Commands::Resolve { package_uri } => cmd_resolve(&package_uri, cache_dir).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}

async fn cmd_serve(cache_dir: Option<PathBuf>) -> Result<()> {
    let _ = cache_dir; // per-evaluator resolvers are built from each CreateEvaluatorRequest's own cache_dir field
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let transport = Transport::new(Decoder::new(stdin), Encoder::new(stdout));

    let host = EvaluatorHost::new(transport, Arc::new(UnimplementedEngine));
    host.start().context("start evaluator host")?;

    // The reader task owns the transport's lifetime; block here until the
    // client closes the connection (EOF on stdin) or the process is signaled.
    tokio::signal::ctrl_c()
        .await
        .context("wait for shutdown signal")?;
    tracing::info!(target: "esp_cli", "received shutdown signal");
    Ok(())
}

async fn cmd_resolve(package_uri: &str, cache_dir: Option<PathBuf>) -> Result<()> {
    let pkg = PackageUri::parse(package_uri)
        .with_context(|| format!("parse package uri '{package_uri}'"))?;

    let metadata = match cache_dir {
        Some(dir) => {
            let resolver = DiskCachedResolver::new(dir)
                .await
                .context("open disk-cached resolver")?;
            resolver
                .get_dependency_metadata(&pkg, None)
                .await
                .context("fetch dependency metadata")?
        }
        None => {
            let resolver = InMemoryResolver::new();
            resolver
                .get_dependency_metadata(&pkg, None)
                .await
                .context("fetch dependency metadata")?
        }
    };

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
