// coffeebot: syndicate microformat reviews into the wiki
//
// Usually invoked by the webhook front end with the URL of a freshly
// published post; can also be run by hand to rebuild a category map.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coffeebot::{build_syndicator, load_yaml_config};

#[derive(Debug, Parser)]
#[command(name = "coffeebot", version, about = "Turn microformats into wiki pages")]
struct Cli {
    /// Path to the YAML config (defaults to config.yaml in the package root)
    #[arg(long, global = true, env = "COFFEEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Print the wikitext instead of saving it
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the reviews (or post, or recipes) on a URL into the wiki
    Syndicate {
        url: String,

        /// Skip regenerating the maps of categories the merge added
        #[arg(long)]
        no_maps: bool,
    },
    /// Rebuild the map page of a category
    Map { category: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coffeebot=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_yaml_config(cli.config.as_deref())?;
    let syndicator = build_syndicator(&config, cli.dry_run)?;

    match cli.command {
        Command::Syndicate { url, no_maps } => {
            let report = syndicator
                .syndicate(&url)
                .await
                .with_context(|| format!("Failed to syndicate {url}"))?;

            for warning in &report.warnings {
                log::warn!("{url}: {warning:?}");
            }
            if cli.dry_run {
                for edit in &report.edits {
                    println!("=== {} ===\n{}\n", edit.title, edit.body);
                }
            }

            if !no_maps && !report.pending_publishes.is_empty() {
                let maps = syndicator
                    .publish_pending(&report.pending_publishes)
                    .await
                    .context("Failed to publish category maps")?;
                log::info!("Regenerated {} category maps", maps.len());
            }
        }
        Command::Map { category } => {
            let maps = syndicator
                .publish_pending(&[coffeebot::wiki::PendingPublish { category: category.clone() }])
                .await
                .with_context(|| format!("Failed to publish map for {category}"))?;
            if cli.dry_run {
                for map in &maps {
                    println!("=== {} ===\n{}\n", map.title, map.body);
                }
            }
        }
    }

    Ok(())
}
