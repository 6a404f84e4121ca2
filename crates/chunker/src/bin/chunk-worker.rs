//! chunk-worker — batch chunking over parsed document JSON.
//!
//! Reads one Document (JSON) from a file or stdin, chunks it under the
//! configured token budget, and writes the chunk records as JSON to a
//! file or stdout. Engine settings come from CHUNKMILL_* environment
//! variables; command-line flags override them per run. Logs go to
//! stderr so piped output stays clean.

use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use chunkmill_chunker::{ChunkingPipeline, TokenizerProvider};
use chunkmill_core::config::{load_dotenv, MIN_MAX_TOKENS};
use chunkmill_core::{Config, Document};

// ── CLI ─────────────────────────────────────────────────────────────

/// Chunk a parsed document into retrieval-sized passages.
#[derive(Parser, Debug)]
#[command(name = "chunk-worker", version, about)]
struct Cli {
    /// Input document JSON; `-` reads stdin.
    #[arg(default_value = "-")]
    input: String,

    /// Output path for chunk records JSON; `-` writes stdout.
    #[arg(short, long, env = "CHUNKMILL_OUTPUT", default_value = "-")]
    output: String,

    /// Token budget per chunk (overrides CHUNKMILL_MAX_TOKENS).
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Tokenizer model identifier (overrides CHUNKMILL_TOKENIZER_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Serialize tables to key-value lines instead of their raw text.
    #[arg(long)]
    serialize_tables: bool,

    /// Disable the peer-merge second pass.
    #[arg(long)]
    no_merge_peers: bool,

    /// Carry constituent items on every output record.
    #[arg(long)]
    include_items: bool,

    /// Verbatim prefix for every chunk's text (overrides CHUNKMILL_TEXT_PREFIX).
    #[arg(long)]
    text_prefix: Option<String>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(requested) = cli.max_tokens {
        config.chunking.max_tokens = if requested < MIN_MAX_TOKENS {
            tracing::warn!(
                requested,
                minimum = MIN_MAX_TOKENS,
                "--max-tokens below minimum, clamping"
            );
            MIN_MAX_TOKENS
        } else {
            requested
        };
    }
    if let Some(model) = &cli.model {
        config.chunking.model_identifier = Some(model.clone());
    }
    if let Some(prefix) = &cli.text_prefix {
        config.chunking.text_prefix = prefix.clone();
    }
    if cli.serialize_tables {
        config.chunking.serialize_tables = true;
    }
    if cli.no_merge_peers {
        config.chunking.merge_peers = false;
    }
    if cli.include_items {
        config.chunking.include_items = true;
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    apply_overrides(&mut config, &cli);
    config.log_summary();

    let raw = if cli.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading document from stdin")?;
        buf
    } else {
        fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input))?
    };
    let doc: Document = serde_json::from_str(&raw).context("parsing input document")?;

    let provider = Arc::new(TokenizerProvider::new(&config.tokenizer));
    let pipeline = ChunkingPipeline::new(provider.clone());
    let records = pipeline
        .run(&doc, &config.chunking)
        .context("chunking failed")?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    if cli.output == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        fs::write(&cli.output, json).with_context(|| format!("writing {}", cli.output))?;
        info!(path = %cli.output, chunks = records.len(), "chunk records written");
    }

    let stats = provider.cache_stats();
    tracing::debug!(hits = stats.hits, misses = stats.misses, "tokenizer cache stats");
    Ok(())
}
