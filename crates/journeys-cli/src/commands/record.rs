//! Record command - Store a followed link

use anyhow::{Context, Result};
use clap::Args;
use journeys_store::LinkRecorder;

use super::{load_config, open_edges};
use crate::GlobalOptions;

/// Arguments for the record command
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Page the link was followed from
    from: String,

    /// Page the link led to
    to: String,
}

/// Execute the record command
pub async fn execute(args: RecordArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let edges = open_edges(&config).await?;

    let added = LinkRecorder::new(&edges)
        .record(&args.from, &args.to)
        .await
        .with_context(|| format!("Failed to record {} -> {}", args.from, args.to))?;

    if global.quiet {
        return Ok(());
    }
    if added {
        println!("Recorded {} -> {}", args.from, args.to);
    } else {
        println!("No new visit: {} -> {}", args.from, args.to);
    }
    Ok(())
}
