mod hash_table_impl;
mod hasher;

pub use hash_table_impl::{Bid, ChainedHashTable, Iter, DEFAULT_BUCKET_COUNT};
pub use hasher::{HashAlgorithm, KeyHasher};
