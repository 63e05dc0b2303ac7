//! Consistent Hash Ring Module
//!
//! Maps keys to owner nodes through a ring of hashed virtual replicas.

use std::collections::HashMap;
use std::fmt;

/// Hash function mapping bytes to a position on the ring.
pub type RingHashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
/// Consistent-hash ring with virtual replicas.
///
/// Each real node contributes `replicas` virtual positions. A key is owned
/// by the node whose first virtual position is clockwise-closest to the
/// key's hash, wrapping around at the end of the ring.
pub struct HashRing {
    /// Virtual positions per real node
    replicas: usize,
    hash: RingHashFn,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash -> real node name
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates a ring using CRC32/IEEE as the position hash.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, Box::new(crc32fast::hash))
    }

    /// Creates a ring with a custom position hash.
    pub fn with_hash(replicas: usize, hash: RingHashFn) -> Self {
        Self {
            replicas,
            hash,
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Adds real nodes to the ring.
    ///
    /// Each node is hashed at `replicas` virtual positions derived from
    /// `"{i}{node}"`. The position array is re-sorted after the batch.
    pub fn add<S: AsRef<str>>(&mut self, nodes: &[S]) {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let vnode = format!("{}{}", i, node);
                let position = (self.hash)(vnode.as_bytes());
                self.keys.push(position);
                self.owners.insert(position, node.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let position = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&vnode| vnode < position);
        let idx = if idx == self.keys.len() { 0 } else { idx };

        self.owners.get(&self.keys[idx]).map(String::as_str)
    }

    // == Length ==
    /// Returns the number of virtual positions on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no nodes have been added.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.keys.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    /// Ring positions read straight from the ASCII-digit key, making the
    /// layout predictable.
    fn numeric_ring(replicas: usize) -> HashRing {
        HashRing::with_hash(
            replicas,
            Box::new(|data| {
                std::str::from_utf8(data)
                    .expect("test keys are ASCII")
                    .parse()
                    .expect("test keys are numeric")
            }),
        )
    }

    #[test]
    fn test_ring_empty() {
        let ring = HashRing::new(50);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_ring_replica_count() {
        let mut ring = HashRing::new(50);
        ring.add(&["a", "b", "c"]);
        assert_eq!(ring.len(), 150);
    }

    #[test]
    fn test_ring_selection_with_numeric_hash() {
        let mut ring = numeric_ring(3);
        // Virtual positions: 2/12/22, 4/14/24, 6/16/26.
        ring.add(&["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "key {}", key);
        }
    }

    #[test]
    fn test_ring_add_shifts_ownership() {
        let mut ring = numeric_ring(3);
        ring.add(&["6", "4", "2"]);

        // Adds positions 8, 18, 28.
        ring.add(&["8"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "key {}", key);
        }
    }

    #[test]
    fn test_ring_wrap_around() {
        let mut ring = numeric_ring(1);
        ring.add(&["10", "20"]);

        // 25 is past the highest position, so it wraps to the lowest.
        assert_eq!(ring.get("25"), Some("10"));
    }

    #[test]
    fn test_ring_get_is_deterministic() {
        let mut ring = HashRing::new(50);
        ring.add(&["A", "B", "C"]);

        let first = ring.get("Tom").map(str::to_string);
        for _ in 0..10 {
            assert_eq!(ring.get("Tom").map(str::to_string), first);
        }
    }

    #[test]
    fn test_ring_selection_is_order_independent() {
        let mut forward = HashRing::new(50);
        forward.add(&["A", "B", "C"]);

        let mut reverse = HashRing::new(50);
        reverse.add(&["C", "B", "A"]);

        for key in ["Tom", "Jack", "Sam", "kcache", ""] {
            assert_eq!(forward.get(key), reverse.get(key), "key {:?}", key);
        }
    }
}
