//! Skillmatch CLI entrypoint.
//!
//! Ranks each argument (or each non-empty stdin line when none are given)
//! against the configured skill pool and prints `rank<TAB>score<TAB>label`.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use mimalloc::MiMalloc;

use skillmatch::config::Config;
use skillmatch::factory::build_engine;
use skillmatch::ranking::SimilarityEngine;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    let json = args.iter().any(|arg| arg == "--json");
    let texts: Vec<String> = args
        .into_iter()
        .filter(|arg| !arg.starts_with("--"))
        .collect();

    let config = Config::from_env()?;
    tracing::info!(
        vocab_path = ?config.vocab_path,
        model_path = ?config.model_path,
        top_k = config.top_k,
        "Skillmatch starting"
    );

    let engine = build_engine(&config).context("failed to build similarity engine")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if texts.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read stdin")?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            write_ranking(&mut out, &engine, text, json)?;
        }
    } else {
        for text in &texts {
            write_ranking(&mut out, &engine, text, json)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_ranking(
    out: &mut impl Write,
    engine: &SimilarityEngine,
    text: &str,
    json: bool,
) -> anyhow::Result<()> {
    let ranked = engine
        .rank_default(text)
        .with_context(|| format!("failed to rank '{}'", text))?;

    if json {
        let line = serde_json::json!({ "text": text, "results": ranked });
        writeln!(out, "{}", line)?;
    } else {
        write!(out, "{}", ranked)?;
    }
    Ok(())
}

fn run_health_check() -> i32 {
    let engine = Config::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|config| build_engine(&config).map_err(anyhow::Error::from));

    match engine {
        Ok(engine) => match engine.rank("health check", 1) {
            Ok(_) => 0,
            Err(e) => {
                tracing::error!(error = %e, "Health check ranking failed");
                1
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check failed to build engine");
            1
        }
    }
}
