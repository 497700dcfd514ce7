use anyhow::{Context, Result};
use clap::Parser;
use client::{load_store, Client, ShardSource};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Query a published index, fetching only the shards the query needs")]
struct Cli {
    /// Index base: an http(s) URL or a local directory
    #[arg(long, default_value = "./index")]
    base: String,
    /// Query the single-file store.bin instead of shards
    #[arg(long, default_value_t = false)]
    store: bool,
    /// Query terms, combined with AND
    #[arg(required = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let query = args.query.join(" ");
    let source = ShardSource::parse(&args.base)?;

    let hits = if args.store {
        let store = load_store(&source).await.with_context(|| format!("failed to load store from {}", args.base))?;
        store.hits(&query)
    } else {
        let client = Client::open(source).await.with_context(|| format!("failed to open index at {}", args.base))?;
        client.search(&query).await.context("search failed")?
    };

    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
