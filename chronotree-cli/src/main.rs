//! Chronotree command-line driver.
//!
//! Usage:
//!   # Watch a simulated crawl
//!   chronotree crawl "Deep Learning"
//!   chronotree crawl "Jazz" --json --config chronotree.json
//!
//!   # Print the timeline layout as JSON
//!   chronotree layout "Jazz" --width 3200 --height 1800
//!   chronotree layout "AI" --revealed-only --at 4000
//!
//!   # Print the time axis
//!   chronotree ticks "AI" --step 5
//!
//! Logging goes to stderr and follows `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use chronotree_core::crawl::{
    build_schedule, revealed_at, start_crawl_stream, CrawlEvent, DatasetSource, MockSource,
};
use chronotree_core::layout::{compute_layout, DEFAULT_TICK_STEP};
use chronotree_core::ChronotreeConfig;

/// Lay out knowledge trees on a timeline and simulate their discovery.
#[derive(Parser, Debug)]
#[command(name = "chronotree")]
#[command(about = "Timeline layout and simulated crawls for knowledge trees")]
struct Args {
    /// JSON config with `layout` and `timing` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulated crawl and print its events
    Crawl {
        keyword: String,

        /// Print one JSON object per event
        #[arg(long)]
        json: bool,
    },

    /// Print the layout of a keyword's tree as JSON
    Layout {
        keyword: String,

        /// Canvas width (overrides config)
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height (overrides config)
        #[arg(long)]
        height: Option<f64>,

        /// Only include what a crawl has revealed by `--at`
        #[arg(long)]
        revealed_only: bool,

        /// Milliseconds into the crawl, for `--revealed-only` (default: end)
        #[arg(long, requires = "revealed_only")]
        at: Option<u64>,
    },

    /// Print time axis ticks
    Ticks {
        keyword: String,

        /// Years between ticks
        #[arg(long, default_value_t = DEFAULT_TICK_STEP)]
        step: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ChronotreeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ChronotreeConfig::default(),
    };

    match args.command {
        Command::Crawl { keyword, json } => crawl(&keyword, &config, json).await,
        Command::Layout {
            keyword,
            width,
            height,
            revealed_only,
            at,
        } => {
            let mut config = config;
            config.layout.width = width.unwrap_or(config.layout.width);
            config.layout.height = height.unwrap_or(config.layout.height);
            config.validate().context("invalid canvas size")?;
            let reveal_at =
                revealed_only.then(|| at.map_or(Duration::MAX, Duration::from_millis));
            layout(&keyword, &config, reveal_at)
        }
        Command::Ticks { keyword, step } => ticks(&keyword, &config, step),
    }
}

async fn crawl(keyword: &str, config: &ChronotreeConfig, json: bool) -> Result<()> {
    let (handle, mut events) = start_crawl_stream(keyword, &MockSource, &config.timing)?;
    tracing::info!(keyword, duration_ms = handle.duration().as_millis() as u64, "crawl started");

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    print_event(&event);
                }
            }
            _ = &mut interrupted => {
                handle.cancel();
                tracing::warn!(keyword, "crawl interrupted");
                break;
            }
        }
    }
    Ok(())
}

fn print_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::Phase { phase, progress } => {
            println!("[{progress:>3}%] {}", phase.status_label());
        }
        CrawlEvent::RootFound { root } => {
            match root.year {
                Some(year) => println!("       root: {} ({year})", root.label),
                None => println!("       root: {}", root.label),
            }
            if root.has_link() {
                println!("             {}", root.url);
            }
        }
        CrawlEvent::TreeReady { node_count, .. } => {
            println!("       tree: {node_count} nodes");
        }
        CrawlEvent::NodeRevealed { id } => println!("       + {id}"),
        CrawlEvent::Complete => println!("       done"),
    }
}

fn layout(keyword: &str, config: &ChronotreeConfig, reveal_at: Option<Duration>) -> Result<()> {
    let dataset = MockSource
        .resolve(keyword)
        .with_context(|| format!("resolving `{keyword}`"))?;
    let layout = compute_layout(&dataset.tree, &config.layout);
    let revealed = reveal_at.map(|at| revealed_at(&build_schedule(&dataset, &config.timing), at));
    let shown = |id: &str| revealed.as_ref().map_or(true, |r| r.contains(id));

    let nodes: Vec<_> = layout.nodes.iter().filter(|n| shown(&n.id)).collect();
    let links: Vec<_> = layout
        .links
        .iter()
        .filter_map(|link| {
            let (source, target) = layout.endpoints(link);
            (shown(&source.id) && shown(&target.id)).then(|| {
                json!({
                    "id": link.id,
                    "source": source.id,
                    "target": target.id,
                    "path": layout.link_path(link).to_svg(),
                })
            })
        })
        .collect();
    let cross_refs: Vec<_> = layout
        .cross_ref_paths(&dataset.cross_refs)
        .into_iter()
        .filter_map(|arc| {
            let (source, target) = (&layout.nodes[arc.source], &layout.nodes[arc.target]);
            (shown(&source.id) && shown(&target.id)).then(|| {
                json!({
                    "source": source.id,
                    "target": target.id,
                    "label": arc.label,
                    "path": arc.path.to_svg(),
                })
            })
        })
        .collect();

    let document = json!({
        "keyword": keyword,
        "yearExtent": layout.year_extent.as_array(),
        "canvasHeight": layout.canvas_height,
        "nodes": nodes,
        "links": links,
        "crossRefs": cross_refs,
        "ticks": layout.timeline_ticks(DEFAULT_TICK_STEP),
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn ticks(keyword: &str, config: &ChronotreeConfig, step: i32) -> Result<()> {
    anyhow::ensure!(step > 0, "--step must be positive, got {step}");
    let dataset = MockSource
        .resolve(keyword)
        .with_context(|| format!("resolving `{keyword}`"))?;
    let layout = compute_layout(&dataset.tree, &config.layout);
    for tick in layout.timeline_ticks(step) {
        println!("{:>6} {:>9.2}", tick.year, tick.x);
    }
    Ok(())
}
