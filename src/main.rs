//! # Location Selector Entry Point
//!
//! Loads the persisted selection condition, opens the sample file, runs one
//! selection and prints the rows. Intended for inspecting exported history and
//! for checking how a condition behaves before it is used by an exporter.
//!
//! ```text
//! location-selector [--config PATH] [--samples PATH] [--json]
//! ```

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use std::env;
use tracing_subscriber::EnvFilter;

use location_selector_lib::{
    config::{Config, CONFIG_FILE},
    render::draw_ascii,
    selector::Selector,
    source::JsonFileSource,
};

/// Command-line options.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config_path: Option<String>,
    samples_path: Option<String>,
    json: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config_path = Some(iter.next().context("--config needs a path")?);
            }
            "--samples" => {
                parsed.samples_path = Some(iter.next().context("--samples needs a path")?);
            }
            "--json" => parsed.json = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;

    let config = Config::load_from_path(args.config_path.as_deref().unwrap_or(CONFIG_FILE));
    let samples_path = args
        .samples_path
        .unwrap_or_else(|| config.store.samples_path.clone());

    let source = JsonFileSource::open(&samples_path)
        .with_context(|| format!("failed to open sample file {samples_path}"))?
        .with_max_rows(config.store.max_rows);
    let selector = Selector::new(source);
    let condition = config.selector.condition();

    // Create Tokio runtime for the fetch
    let rt = tokio::runtime::Runtime::new()?;
    let slots = rt
        .block_on(selector.select(&condition))
        .context("selection failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else {
        draw_ascii(&slots);
    }

    Ok(())
}
