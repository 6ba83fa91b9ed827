use std::iter::{Chain, Enumerate, Once, once};
use std::slice;
use tracing::trace;
use crate::hash_table::hasher::{HashAlgorithm, KeyHasher};

/// Bucket count used when the caller asks for zero buckets
pub const DEFAULT_BUCKET_COUNT: usize = 179;

/// A bid record from the eBid monthly sales export
/// The bid id is the table key; the other fields are payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bid {
    pub bid_id: String,
    pub title: String,
    pub fund: String,
    pub amount: f64,
}

impl Bid {
    pub fn new(bid_id: &str, title: &str, fund: &str, amount: f64) -> Bid {
        Bid {
            bid_id: bid_id.to_string(),
            title: title.to_string(),
            fund: fund.to_string(),
            amount,
        }
    }
}

/// One table position
#[derive(Debug, Clone)]
enum Slot {
    Empty,
    /// `head` is the slot record; `chain` holds later colliding records in insertion order
    Occupied { head: Bid, chain: Vec<Bid> },
}

/// Fixed-size hash table resolving collisions by separate chaining
/// The bucket count never changes after construction
#[derive(Debug, Clone)]
pub struct ChainedHashTable<H = HashAlgorithm> {
    slots: Vec<Slot>,
    /// Total records stored across all slots and chains
    len: usize,
    hasher: H,
}

impl ChainedHashTable<HashAlgorithm> {
    /// Creates a table with the default placement function
    /// A bucket count of zero is replaced by `DEFAULT_BUCKET_COUNT`
    pub fn new(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, HashAlgorithm::default())
    }
}

impl Default for ChainedHashTable<HashAlgorithm> {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_COUNT)
    }
}

impl<H: KeyHasher> ChainedHashTable<H> {
    /// Creates a table using the given placement function
    pub fn with_hasher(bucket_count: usize, hasher: H) -> Self {
        let bucket_count = if bucket_count == 0 {
            DEFAULT_BUCKET_COUNT
        } else {
            bucket_count
        };
        ChainedHashTable { slots: vec![Slot::Empty; bucket_count], len: 0, hasher }
    }

    pub fn bucket_count(&self) -> usize {
        self.slots.len()
    }

    /// Bucket index for a key, in `[0, bucket_count)`
    pub fn hash(&self, key: &str) -> usize {
        (self.hasher.hash(key) % self.slots.len() as u64) as usize
    }

    /// Inserts a bid, or overwrites the payload of the bid already stored under the same id
    pub fn insert(&mut self, bid: Bid) {
        let index = self.hash(&bid.bid_id);
        let slot = &mut self.slots[index];

        match slot {
            Slot::Empty => {
                *slot = Slot::Occupied { head: bid, chain: Vec::new() };
                self.len += 1;
            }
            Slot::Occupied { head, chain } => {
                // Same id anywhere in this slot is an update, never a second copy
                if let Some(existing) = once(head)
                    .chain(chain.iter_mut())
                    .find(|existing| existing.bid_id == bid.bid_id)
                {
                    trace!(bid_id = %bid.bid_id, slot = index, "updating bid in place");
                    *existing = bid;
                    return;
                }
                chain.push(bid);
                self.len += 1;
            }
        }
    }

    /// Looks up a bid by id
    /// Returns None if no bid with that id is stored
    pub fn search(&self, bid_id: &str) -> Option<&Bid> {
        match &self.slots[self.hash(bid_id)] {
            Slot::Empty => None,
            Slot::Occupied { head, chain } => {
                if head.bid_id == bid_id {
                    return Some(head);
                }
                chain.iter().find(|bid| bid.bid_id == bid_id)
            }
        }
    }

    /// Removes the bid with the given id, if present
    /// Removing an absent id does nothing
    pub fn remove(&mut self, bid_id: &str) {
        let index = self.hash(bid_id);
        let slot = &mut self.slots[index];

        let Slot::Occupied { head, chain } = slot else {
            return;
        };

        if head.bid_id == bid_id {
            if chain.is_empty() {
                *slot = Slot::Empty;
            } else {
                // Promote the first chained bid into the slot record position
                *head = chain.remove(0);
            }
            self.len -= 1;
            trace!(bid_id, slot = index, "removed bid");
            return;
        }

        if let Some(position) = chain.iter().position(|bid| bid.bid_id == bid_id) {
            // Vec::remove shifts the tail left, keeping insertion order
            chain.remove(position);
            self.len -= 1;
            trace!(bid_id, slot = index, "removed chained bid");
        }
    }

    /// Iterates over `(slot index, bid)` in slot order, slot record before its chain
    /// Each call starts again from slot 0
    pub fn iter(&self) -> Iter<'_> {
        Iter { slots: self.slots.iter().enumerate(), current: None }
    }

    /// Number of bids stored, counting every chained bid
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty slots
    /// A slot holding a record plus a chain of three counts once
    pub fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|slot| matches!(slot, Slot::Occupied { .. })).count()
    }

    /// Stored bids per bucket; reported for diagnostics, never acted on
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    /// Drops every bid and resets all slots to empty, keeping the bucket count
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
    }
}

type SlotBids<'a> = Chain<Once<&'a Bid>, slice::Iter<'a, Bid>>;

/// Iterator returned by [`ChainedHashTable::iter`]
pub struct Iter<'a> {
    slots: Enumerate<slice::Iter<'a, Slot>>,
    current: Option<(usize, SlotBids<'a>)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Bid);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((index, bids)) = &mut self.current {
                if let Some(bid) = bids.next() {
                    return Some((*index, bid));
                }
            }

            // Current slot exhausted, advance to the next occupied one
            let (index, slot) = self.slots.next()?;
            self.current = match slot {
                Slot::Empty => None,
                Slot::Occupied { head, chain } => Some((index, once(head).chain(chain.iter()))),
            };
        }
    }
}

impl<'a, H: KeyHasher> IntoIterator for &'a ChainedHashTable<H> {
    type Item = (usize, &'a Bid);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
