//! Show command - Build and print the journey forest

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Args;
use journeys_config::{ConfigOverrides, IdentityMode, RootOrdering};
use journeys_core::{Forest, GraphBuilder, VisitFilter};
use journeys_store::JsonVisitCatalog;
use url::Url;

use super::{base_dir, builder_config, load_config_with, open_edges, print_info};
use crate::GlobalOptions;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only include pages whose URL or title contains this text
    #[arg(long, short = 't')]
    text: Option<String>,

    /// Days of history to include
    #[arg(long, short = 'd')]
    days: Option<u32>,

    /// Maximum number of history entries to consider
    #[arg(long, short = 'm')]
    max: Option<usize>,

    /// Node identity (url, visit-chain)
    #[arg(long, value_parser = parse_identity)]
    identity: Option<IdentityMode>,

    /// Journey ordering (catalog, recency)
    #[arg(long, value_parser = parse_order)]
    order: Option<RootOrdering>,

    /// Resolve links in a single pass
    #[arg(long)]
    single_pass: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn parse_identity(s: &str) -> Result<IdentityMode, String> {
    s.parse()
        .map_err(|e: journeys_config::ConfigError| e.to_string())
}

fn parse_order(s: &str) -> Result<RootOrdering, String> {
    s.parse()
        .map_err(|e: journeys_config::ConfigError| e.to_string())
}

impl ShowArgs {
    fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            identity: self.identity,
            root_order: self.order,
            max_passes: self.single_pass.then_some(1),
            lookback_days: self.days,
            max_results: self.max,
            ..Default::default()
        }
    }
}

/// Execute the show command
pub async fn execute(args: ShowArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config_with(&global, args.to_config_overrides())?;
    let base = base_dir()?;

    let history_path = config.history_path(&base);
    if !history_path.exists() {
        anyhow::bail!(
            "No history export at {}. Save your browser history there as a JSON array of \
             {{url, title, lastVisitTime, visits}} items.",
            history_path.display()
        );
    }
    let catalog = JsonVisitCatalog::open(&history_path)
        .await
        .context("Failed to read history export")?;
    let edges = open_edges(&config).await?;

    let text = args.text.unwrap_or_else(|| config.window.text.clone());
    let filter = VisitFilter::last_days(config.window.lookback_days, now_millis())
        .with_text(text)
        .with_max_results(config.window.max_results);

    let builder = GraphBuilder::with_config(builder_config(&config))?;
    let forest = builder.build(&catalog, &edges, &filter).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forest.journeys())?);
    } else if forest.is_empty() {
        println!("No journeys in the last {} days.", config.window.lookback_days);
    } else {
        print!("{}", render_tree(&forest));
    }

    print_info(
        &format!(
            "{} journeys, {} pages ({} identity)",
            forest.len(),
            forest.snapshot().len(),
            config.build.identity
        ),
        global.quiet || args.json,
    );

    Ok(())
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// Indented text tree, one line per page.
fn render_tree(forest: &Forest) -> String {
    let mut out = String::new();
    for (depth, node) in forest.walk() {
        let indent = "  ".repeat(depth);
        let marker = if depth == 0 { "*" } else { "└─" };
        let title = node.display_title();
        match host(&node.url) {
            Some(host) if title != node.url => {
                out.push_str(&format!("{indent}{marker} {title}  ({host})\n"))
            }
            _ => out.push_str(&format!("{indent}{marker} {title}\n")),
        }
    }
    out
}

/// Hostname of a URL, without port, if it has one.
fn host(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}
