use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use bid_table::{ChainedHashTable, HashAlgorithm, DEFAULT_BUCKET_COUNT};
use crate::event_loop::terminal_event_loop::TerminalEventLoop;
use crate::event_loop::{EventLoop, Session};

mod event_loop;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    table: TableConfig,
    data: DataConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TableConfig {
    bucket_count: usize,
    hash: HashAlgorithm,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig { bucket_count: DEFAULT_BUCKET_COUNT, hash: HashAlgorithm::default() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DataConfig {
    csv_path: PathBuf,
    default_bid_id: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            csv_path: PathBuf::from("data/eBid_Monthly_Sales.csv"),
            default_bid_id: "98223".to_string(),
        }
    }
}

/// Reads `config.toml`, falling back to defaults when the file does not exist
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!("No {} found, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// `bid_table [csv_path] [bid_id]` overrides the `[data]` section
fn session_from_args(data: DataConfig, mut args: impl Iterator<Item = String>) -> Session {
    let csv_path = args.next().map(PathBuf::from).unwrap_or(data.csv_path);
    let bid_id = args.next().unwrap_or(data.default_bid_id);
    Session { csv_path, bid_id }
}

fn main() -> Result<()> {
    // Logs go to stderr so the menu on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(Path::new(CONFIG_PATH))?;
    let session = session_from_args(config.data, std::env::args().skip(1));

    let mut table = ChainedHashTable::with_hasher(config.table.bucket_count, config.table.hash);
    info!(
        buckets = table.bucket_count(),
        hash = ?config.table.hash,
        csv = %session.csv_path.display(),
        bid_id = %session.bid_id,
        "Bid table ready"
    );

    let mut event_loop = TerminalEventLoop;
    event_loop.run(&mut table, &session)?;
    Ok(())
}
