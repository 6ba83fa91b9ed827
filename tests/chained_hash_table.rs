use std::collections::HashMap;
use bid_table::{load_bids, Bid, ChainedHashTable, HashAlgorithm, KeyHasher};

/// Sum of the key's bytes, so collisions are easy to predict
struct ByteSum;

impl KeyHasher for ByteSum {
    fn hash(&self, key: &str) -> u64 {
        key.bytes().map(u64::from).sum()
    }
}

fn bid(id: &str, amount: f64) -> Bid {
    Bid::new(id, &format!("item {}", id), "General Fund", amount)
}

fn placement<H: KeyHasher>(table: &ChainedHashTable<H>) -> Vec<(usize, String)> {
    table.iter().map(|(slot, b)| (slot, b.bid_id.clone())).collect()
}

#[test]
fn test_collision_scenario_with_four_buckets() {
    let mut table = ChainedHashTable::with_hasher(4, ByteSum);
    assert_eq!(table.hash("A"), 1); // 65 % 4
    assert_eq!(table.hash("E"), 1); // 69 % 4
    assert_eq!(table.hash("B"), 2); // 66 % 4

    table.insert(bid("A", 1.0));
    table.insert(bid("E", 2.0));
    table.insert(bid("B", 3.0));

    // A is the slot record, E chains behind it
    assert_eq!(placement(&table), vec![(1, "A".into()), (1, "E".into()), (2, "B".into())]);
    assert_eq!(table.search("E"), Some(&bid("E", 2.0)));
    assert_eq!(table.occupied_slots(), 2);

    table.remove("A");
    assert_eq!(table.search("A"), None);
    assert_eq!(placement(&table), vec![(1, "E".into()), (2, "B".into())]);
    assert_eq!(table.occupied_slots(), 2);

    // E now sits in the slot record position, so a new collider chains after it
    table.insert(bid("I", 4.0));
    assert_eq!(placement(&table), vec![(1, "E".into()), (1, "I".into()), (2, "B".into())]);
}

#[test]
fn test_update_keeps_count_and_placement() {
    let mut table = ChainedHashTable::with_hasher(4, ByteSum);
    for id in ["A", "E", "I", "B"] {
        table.insert(bid(id, 0.0));
    }
    let before = placement(&table);

    table.insert(Bid::new("E", "replaced", "Enterprise", 99.0));

    assert_eq!(table.len(), 4);
    assert_eq!(placement(&table), before);
    let updated = table.search("E").unwrap();
    assert_eq!(updated.title, "replaced");
    assert_eq!(updated.fund, "Enterprise");
    assert_eq!(updated.amount, 99.0);
}

#[test]
fn test_idempotent_remove() {
    let mut table = ChainedHashTable::with_hasher(4, ByteSum);
    for id in ["A", "E", "I"] {
        table.insert(bid(id, 0.0));
    }

    table.remove("E");
    let once = placement(&table);
    table.remove("E");
    assert_eq!(placement(&table), once);
    assert_eq!(table.len(), 2);
}

/// Replays a deterministic mix of inserts and removes against a HashMap model
fn check_against_model<H: KeyHasher>(mut table: ChainedHashTable<H>) {
    let mut model: HashMap<String, Bid> = HashMap::new();
    // Insertion order per slot, used to check chain ordering
    let mut order: Vec<String> = Vec::new();
    let mut state = 0x2545_f491_4f6c_dd1du64;

    for step in 0..5_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let key = format!("{}", state % 300);

        if state % 3 == 0 {
            table.remove(&key);
            model.remove(&key);
            order.retain(|k| k != &key);
            assert_eq!(table.search(&key), None);
        } else {
            let record = bid(&key, step as f64);
            table.insert(record.clone());
            if model.insert(key.clone(), record).is_none() {
                order.push(key.clone());
            }
        }
    }

    assert_eq!(table.len(), model.len());

    let listed: Vec<(usize, &Bid)> = table.iter().collect();
    assert_eq!(listed.len(), model.len());
    for (slot, stored) in &listed {
        assert_eq!(*slot, table.hash(&stored.bid_id));
        assert_eq!(model.get(&stored.bid_id), Some(*stored));
    }
    for (key, expected) in &model {
        assert_eq!(table.search(key), Some(expected));
    }

    // Within each slot, surviving keys appear in the order they were first inserted
    for window in listed.windows(2) {
        let (slot_a, a) = window[0];
        let (slot_b, b) = window[1];
        assert!(slot_a <= slot_b);
        if slot_a == slot_b {
            let pos_a = order.iter().position(|k| k == &a.bid_id).unwrap();
            let pos_b = order.iter().position(|k| k == &b.bid_id).unwrap();
            assert!(pos_a < pos_b, "{} should precede {} in slot {}", a.bid_id, b.bid_id, slot_a);
        }
    }
}

#[test]
fn test_random_operations_match_model() {
    check_against_model(ChainedHashTable::with_hasher(4, ByteSum));
    check_against_model(ChainedHashTable::with_hasher(31, HashAlgorithm::Crc16));
    check_against_model(ChainedHashTable::new(0));
}

#[test]
fn test_load_sample_export() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/eBid_Monthly_Sales.csv");
    let mut table = ChainedHashTable::default();

    let summary = load_bids(path, &mut table).unwrap();
    assert_eq!(summary.inserted, 8);
    assert_eq!(summary.skipped, 0);
    assert_eq!(table.len(), 8);

    let tv = table.search("98112").unwrap();
    assert_eq!(tv.amount, 1205.0);
    assert_eq!(table.search("98105").unwrap().title, "Chair, Office");

    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.iter().count(), 0);
}
