pub mod hash_table;
pub mod loader;

pub use hash_table::{Bid, ChainedHashTable, HashAlgorithm, KeyHasher, DEFAULT_BUCKET_COUNT};
pub use loader::{load_bids, LoadError, LoadSummary};
