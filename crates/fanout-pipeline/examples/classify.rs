//! Runs the pipeline over stdin lines against endpoints from a TOML config.
//!
//! Usage: `classify <config.toml> [model-name]`, one item payload per line on
//! stdin. Outputs are printed one per line, in completion order.

use anyhow::{Context, Result};
use fanout_abstraction::Failsafe;
use fanout_models::ChatClient;
use fanout_pipeline::{Item, Pipeline, PipelineConfig};
use std::io::BufRead;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().context("usage: classify <config.toml> [model-name]")?;
    let model = args.next().unwrap_or_else(|| "default".to_string());

    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path))?;
    let config = PipelineConfig::from_toml_str(&raw)?;

    let items: Vec<Item> = std::io::stdin()
        .lock()
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(Item::new)
        .collect();

    // Failsafe keeps one output per item even when an endpoint misbehaves.
    let client = Arc::new(Failsafe::new(ChatClient::new(model)));
    let pipeline = Pipeline::new(config, client)?;
    let outcome = pipeline.run(items).await?;

    for output in &outcome.outputs {
        println!("{}", output);
    }
    for failure in &outcome.failures {
        eprintln!("{}", failure);
    }
    Ok(())
}
