//! Tests for the B+ tree index
//!
//! These tests verify the public surface:
//! - Ordered iteration regardless of insertion order
//! - Point lookups after heavy insert/delete churn
//! - Inclusive and open-ended range bounds
//! - Agreement with a reference model under pseudo-random workloads

use std::collections::BTreeMap;

use loamdb::index::BPlusTree;

// =============================================================================
// Helper Functions
// =============================================================================

/// Small deterministic PRNG (xorshift) so churn tests need no extra crates.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

fn collect_keys(tree: &BPlusTree, lo: Option<&str>, hi: Option<&str>) -> Vec<String> {
    tree.range(lo, hi).map(|(k, _)| k.to_string()).collect()
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_iteration_is_sorted_regardless_of_insert_order() {
    let mut tree = BPlusTree::new();
    for key in ["pear", "apple", "fig", "banana", "date", "cherry"] {
        tree.put(key.to_string(), "x".to_string());
    }

    assert_eq!(
        collect_keys(&tree, None, None),
        vec!["apple", "banana", "cherry", "date", "fig", "pear"]
    );
}

#[test]
fn test_byte_lexicographic_order() {
    let mut tree = BPlusTree::new();
    // Uppercase sorts before lowercase, digits before both groups.
    for key in ["b", "B", "1", "a", "10", "2"] {
        tree.put(key.to_string(), "x".to_string());
    }

    assert_eq!(
        collect_keys(&tree, None, None),
        vec!["1", "10", "2", "B", "a", "b"]
    );
}

#[test]
fn test_range_monotonically_increasing_at_scale() {
    let mut tree = BPlusTree::new();
    let mut rng = Rng(0x5eed);
    for _ in 0..5_000 {
        let key = format!("k{:08x}", rng.next() as u32);
        tree.put(key, "v".to_string());
    }

    let keys = collect_keys(&tree, None, None);
    for pair in keys.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(keys.len(), tree.len());
}

// =============================================================================
// Range Bound Tests
// =============================================================================

#[test]
fn test_inclusive_bounds() {
    let mut tree = BPlusTree::new();
    for key in ["a", "b", "c", "d", "e"] {
        tree.put(key.to_string(), "x".to_string());
    }

    assert_eq!(collect_keys(&tree, Some("b"), Some("d")), vec!["b", "c", "d"]);
    assert_eq!(collect_keys(&tree, Some("b"), Some("b")), vec!["b"]);
    assert_eq!(collect_keys(&tree, None, Some("c")), vec!["a", "b", "c"]);
    assert_eq!(collect_keys(&tree, Some("c"), None), vec!["c", "d", "e"]);
}

#[test]
fn test_empty_ranges() {
    let mut tree = BPlusTree::new();
    for key in ["b", "d"] {
        tree.put(key.to_string(), "x".to_string());
    }

    assert!(collect_keys(&tree, Some("e"), None).is_empty());
    assert!(collect_keys(&tree, None, Some("a")).is_empty());
    assert!(collect_keys(&tree, Some("c"), Some("c")).is_empty());
    // Inverted bounds yield nothing rather than panicking.
    assert!(collect_keys(&tree, Some("d"), Some("b")).is_empty());
}

// =============================================================================
// Model-Based Churn Tests
// =============================================================================

#[test]
fn test_matches_reference_model_under_churn() {
    let mut tree = BPlusTree::new();
    let mut model: BTreeMap<String, String> = BTreeMap::new();
    let mut rng = Rng(42);

    for i in 0..20_000 {
        let key = format!("key{:04}", rng.next() % 2_000);
        match rng.next() % 3 {
            0 | 1 => {
                let value = format!("v{}", i);
                assert_eq!(
                    tree.put(key.clone(), value.clone()),
                    model.insert(key, value)
                );
            }
            _ => {
                assert_eq!(tree.delete(&key), model.remove(&key));
            }
        }
    }

    assert_eq!(tree.len(), model.len());
    let tree_pairs: Vec<(String, String)> = tree
        .range(None, None)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let model_pairs: Vec<(String, String)> =
        model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    assert_eq!(tree_pairs, model_pairs);

    // Spot-check point lookups too.
    for i in 0..2_000 {
        let key = format!("key{:04}", i);
        assert_eq!(tree.get(&key), model.get(&key).map(|v| v.as_str()));
    }
}

#[test]
fn test_drain_and_refill() {
    let mut tree = BPlusTree::new();
    for i in 0..2_000 {
        tree.put(format!("key{:05}", i), "a".to_string());
    }
    for i in 0..2_000 {
        assert!(tree.delete(&format!("key{:05}", i)).is_some());
    }
    assert!(tree.is_empty());
    assert!(collect_keys(&tree, None, None).is_empty());

    for i in 0..2_000 {
        tree.put(format!("key{:05}", i), "b".to_string());
    }
    assert_eq!(tree.len(), 2_000);
    assert_eq!(tree.get("key00000"), Some("b"));
    assert_eq!(tree.get("key01999"), Some("b"));
}
