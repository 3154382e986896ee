//! Edges command - List recorded links

use anyhow::Result;
use clap::Args;
use journeys_core::EdgeStore;

use super::{load_config, open_edges};
use crate::GlobalOptions;

/// Arguments for the edges command
#[derive(Args, Debug)]
pub struct EdgesArgs {
    /// Only list destinations recorded for this page
    origin: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the edges command
pub async fn execute(args: EdgesArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let edges = open_edges(&config).await?;

    if let Some(origin) = args.origin {
        let destinations = edges.get(&origin).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&destinations)?);
        } else {
            for destination in destinations {
                println!("{}", destination);
            }
        }
        return Ok(());
    }

    let all = edges.entries().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else if all.is_empty() {
        println!("No links recorded in {}", edges.path().display());
    } else {
        for (origin, destinations) in &all {
            println!("{}", origin);
            for destination in destinations {
                println!("  -> {}", destination);
            }
        }
    }
    Ok(())
}
