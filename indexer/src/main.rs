use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shardfts_core::manifest::Manifest;
use shardfts_core::persist::{write_shards, write_store, IndexPaths, MetaFile, FORMAT_VERSION};
use shardfts_core::shard::{MAX_SHARD_WIDTH, SHARD_EXTENSION};
use shardfts_core::{build, build_store};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a static, sharded full-text index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index described by a TOML manifest
    Build {
        /// Manifest path
        #[arg(long)]
        config: PathBuf,
        /// Output directory (overrides `output.directory`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Hex digits of the SHA-1 prefix used as shard key (overrides `output.shard_width`)
        #[arg(long)]
        shard_width: Option<usize>,
        /// Write a single unsharded store.bin instead of shards
        #[arg(long, default_value_t = false)]
        store: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, output, shard_width, store } => {
            let manifest = Manifest::from_path(&config)
                .with_context(|| format!("failed to read manifest {}", config.display()))?;
            let output = output.unwrap_or_else(|| manifest.output.directory.clone());
            let shard_width = shard_width.unwrap_or(manifest.output.shard_width);
            run_build(&manifest, &output, shard_width, store)
        }
    }
}

fn run_build(manifest: &Manifest, output: &Path, shard_width: usize, store: bool) -> Result<()> {
    let shard_width = shard_width.clamp(1, MAX_SHARD_WIDTH);
    let start = Instant::now();
    let documents = manifest.load_documents().context("failed to load documents")?;
    tracing::info!(num_docs = documents.len(), elapsed_ms = start.elapsed().as_millis() as u64, "loaded manifest");

    let paths = IndexPaths::new(output);
    if store {
        let store = build_store(&documents);
        write_store(&paths, &store).context("failed to write store")?;
        tracing::info!(output = %paths.store().display(), num_terms = store.index.len(), "store build complete");
        return Ok(());
    }

    let shards = build(&documents, shard_width);
    let meta = MetaFile {
        num_docs: documents.len() as u32,
        num_terms: shards.values().map(|s| s.words.len() as u32).sum(),
        num_shards: shards.len() as u32,
        shard_width,
        extension: SHARD_EXTENSION.to_string(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    write_shards(&paths, &shards, &meta).context("failed to write shards")?;
    tracing::info!(
        output = %output.display(),
        num_shards = meta.num_shards,
        num_terms = meta.num_terms,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index build complete"
    );
    Ok(())
}
