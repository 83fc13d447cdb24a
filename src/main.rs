use anyhow::Context;
use breadthwatch::services::{DailyUpdater, HistoryService, SqliteStore};
use breadthwatch::types::parse_iso_date;
use breadthwatch::{Config, DailySnapshot, Exchange};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "breadthwatch", about = "Daily market breadth and signal indicators")]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply scraped snapshot files, oldest date first
    Ingest {
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,
    },
    /// Print stored rows as JSON
    Show {
        #[command(subcommand)]
        what: Show,
    },
}

#[derive(Subcommand)]
enum Show {
    /// Breadth rows for one exchange
    Breadth {
        /// nasdaq or nyse
        exchange: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Ticker signals for a date, or one ticker's history
    Signals {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        ticker: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let store = Arc::new(
        SqliteStore::new(&config.database_path)
            .with_context(|| format!("opening {}", config.database_path.display()))?,
    );

    match cli.command {
        Command::Ingest { snapshots } => {
            let mut loaded = Vec::with_capacity(snapshots.len());
            for path in &snapshots {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let snapshot = DailySnapshot::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?;
                loaded.push(snapshot);
            }

            info!("Ingesting {} snapshot(s) into {}", loaded.len(), store.db_path);
            let updater = DailyUpdater::new(store.clone(), store.clone(), &config.walker);
            let reports = updater.backfill(loaded).await?;
            print_json(&reports)?;
        }
        Command::Show { what } => {
            let history = HistoryService::new(store.clone(), store.clone());
            match what {
                Show::Breadth { exchange, from, to } => {
                    let exchange = Exchange::parse(&exchange)?;
                    let rows = history.observations(
                        exchange,
                        optional_date(from.as_deref())?,
                        optional_date(to.as_deref())?,
                    )?;
                    print_json(&rows)?;
                }
                Show::Signals { date, ticker } => {
                    let date = optional_date(date.as_deref())?;
                    match (ticker, date) {
                        (Some(ticker), Some(date)) => print_json(&history.ticker_on(&ticker, date)?)?,
                        (Some(ticker), None) => print_json(&history.ticker_history(&ticker)?)?,
                        (None, date) => print_json(&history.signals_on(date)?)?,
                    }
                }
            }
        }
    }

    Ok(())
}

fn optional_date(text: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    Ok(text.map(parse_iso_date).transpose()?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
