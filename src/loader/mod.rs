mod csv_loader;

pub use csv_loader::{load_bids, parse_amount, split_csv_line, LoadError, LoadSummary};
