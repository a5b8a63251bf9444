//! Index Module
//!
//! In-memory B+ tree over the currently-live keys.
//!
//! ## Responsibilities
//! - Point lookups, inserts, and deletes in logarithmic time
//! - Ordered range scans in output-proportional time
//! - Byte-lexicographic key order
//!
//! ## Data Structure Choice
//! A B+ tree rather than a hash map because RANGE needs ordered iteration.
//! All data lives in leaves; leaves carry a forward link, so a range scan is
//! one root-to-leaf descent followed by a walk along the leaf chain. Nodes
//! live in a slab with index-based links (the in-memory analogue of
//! page-id addressing), which keeps the leaf chain expressible without
//! reference cycles.

mod node;
mod tree;

pub use node::ORDER;
pub use tree::{BPlusTree, Range};
