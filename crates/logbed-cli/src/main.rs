//! fetchlogs
//!
//! Command-line tool that reconstructs a node's container logs for a date
//! range and prints them as a transcript.
//!
//! ## Quick Start
//!
//! ```bash
//! # Today's logs for node 3
//! fetchlogs 3
//!
//! # A specific range (mm/dd/yyyy, end date inclusive)
//! fetchlogs 3 -s 04/13/2019 -e 04/20/2019
//! ```
//!
//! ## Configuration
//!
//! - `LOGBED_TABLE`: store table name (default: testbed)
//! - `AWS_REGION` / credentials: ambient AWS configuration
//!
//! ## Error Handling
//!
//! Invalid input (missing node id, bad date) is reported before any store
//! call. A store failure on any bucket fails the whole query unless
//! `--allow-partial` is passed; either way errors print a message and the
//! process exits non-zero.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use logbed_query::{dates, QueryEngine, QueryOptions};
use logbed_store::{dynamo::DEFAULT_TABLE, DynamoLogStore, TimeoutStore};

#[derive(Parser)]
#[command(name = "fetchlogs")]
#[command(about = "Fetches testbed node logs", long_about = None)]
struct Cli {
    /// Node whose logs to fetch
    node_id: String,

    /// Start date to view logs in mm/dd/yyyy format (default: today)
    #[arg(short = 's', long)]
    start_date: Option<String>,

    /// End date to view logs in mm/dd/yyyy format, inclusive (default: today)
    #[arg(short = 'e', long)]
    end_date: Option<String>,

    /// Store table name
    #[arg(long, env = "LOGBED_TABLE", default_value = DEFAULT_TABLE)]
    table: String,

    /// Keep results from buckets that succeed instead of failing the
    /// whole query when one bucket errors
    #[arg(long)]
    allow_partial: bool,

    /// Per-operation store timeout in seconds
    #[arg(long, default_value_t = 10)]
    store_timeout: u64,
}

fn resolve_date(flag: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match flag {
        Some(s) => Ok(dates::parse_mdy(s)?),
        None => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let today = Utc::now().date_naive();
    let start = resolve_date(cli.start_date.as_deref(), today)?;
    let end = resolve_date(cli.end_date.as_deref(), today)?;

    println!(
        "LOGS FOR NODEID {} BETWEEN {} AND {}",
        cli.node_id, start, end
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);
    let store = Arc::new(TimeoutStore::new(
        DynamoLogStore::new(client, cli.table),
        Duration::from_secs(cli.store_timeout),
    ));

    let engine = QueryEngine::with_options(
        store,
        QueryOptions {
            allow_partial: cli.allow_partial,
        },
    );
    let records = engine.fetch(&cli.node_id, start, end).await?;

    if records.is_empty() {
        println!("NO LOGS TO DISPLAY");
    } else {
        println!("BEGIN LOGS\n");
        for record in &records {
            println!("{}", record.payload);
        }
        println!("END LOGS");
    }
    Ok(())
}
