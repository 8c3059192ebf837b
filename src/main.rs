use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

use wc22_dashboard::config::DashboardConfig;
use wc22_dashboard::dataset::{self, MatchRow};
use wc22_dashboard::export;
use wc22_dashboard::figures;
use wc22_dashboard::metrics::{self, CategoryMetrics, MetricsTable};
use wc22_dashboard::page;
use wc22_dashboard::server::{self, ServerState};

#[derive(Debug, Parser)]
#[command(name = "wc22_dashboard")]
#[command(about = "FIFA World Cup match statistics dashboard")]
struct Cli {
    /// Match statistics CSV (defaults to WC_DATASET_PATH or Fifa_world_cup_matches.csv)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the dashboard over HTTP (default)
    Serve {
        #[arg(long)]
        host: Option<IpAddr>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write the dashboard as a standalone HTML page
    Html {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print per-team offensive metrics
    Metrics {
        #[arg(long)]
        category: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write matches and metrics to an xlsx workbook
    Export {
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = DashboardConfig::load();
    if let Some(data) = cli.data {
        cfg.dataset = data;
    }

    let rows = dataset::load_matches(&cfg.dataset)
        .with_context(|| format!("load match table {}", cfg.dataset.display()))?;
    let table = metrics::compute_metrics(&rows);

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                cfg.host = host;
            }
            if let Some(port) = port {
                cfg.port = port;
            }
            run_server(&cfg, &rows, table)
        }
        Command::Html { out } => {
            let out = out.unwrap_or_else(|| cfg.page_out.clone());
            let dashboard = figures::build_dashboard(&rows, &table);
            let html = page::render_page(&dashboard, &cfg.plotly_src)?;
            page::write_page(&out, &html)?;
            println!("Dashboard written to {}", out.display());
            Ok(())
        }
        Command::Metrics { category, json } => print_metrics(&table, category.as_deref(), json),
        Command::Export { out } => {
            let report = export::export_metrics_workbook(&out, &rows, &table)?;
            println!("Workbook written to {}", out.display());
            println!("Matches: {}", report.matches);
            println!("Offense rows: {}", report.offense_rows);
            Ok(())
        }
    }
}

fn run_server(cfg: &DashboardConfig, rows: &[MatchRow], table: MetricsTable) -> Result<()> {
    let dashboard = figures::build_dashboard(rows, &table);
    let state = Arc::new(ServerState::new(&dashboard, table, &cfg.plotly_src)?);
    info!(matches = rows.len(), "dashboard built");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(server::serve(state, cfg.addr()))
}

fn print_metrics(table: &MetricsTable, category: Option<&str>, json: bool) -> Result<()> {
    let blocks: Vec<&CategoryMetrics> = match category {
        Some(name) => vec![
            table
                .category(name)
                .ok_or_else(|| anyhow!("unknown category {name:?}; known: {:?}", table.categories))?,
        ],
        None => table.blocks.iter().collect(),
    };

    if json {
        let out = serde_json::to_string_pretty(&blocks).context("serialize metrics")?;
        println!("{out}");
        return Ok(());
    }

    for block in blocks {
        println!("{}", block.category);
        println!(
            "  {:<20} {:>8} {:>12} {:>6} {:>8}",
            "Team", "Attempts", "On-Target %", "Goals", "Assists"
        );
        for m in &block.teams {
            println!(
                "  {:<20} {:>8.2} {:>12.2} {:>6.2} {:>8.2}",
                m.team, m.total_attempts, m.on_target_pct, m.goals, m.assists
            );
        }
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // stderr keeps `metrics --json` output clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wc22_dashboard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
