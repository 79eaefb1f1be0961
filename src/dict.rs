//! The string dictionaries used by the encoder.
use crate::alloc::vec::Vec;
use crate::key::OrderingKey;
use crate::{Code, LzwError};

use core::cmp::Ordering;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// One learned string, `prefix` followed by `suffix`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    /// The code assigned when the string was learned.
    pub code: Code,
    /// The code of all but the last byte.
    pub prefix: Code,
    /// The last byte.
    pub suffix: u8,
}

/// The outcome of searching for a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lookup<S> {
    /// The string is known under this code.
    Hit(Code),
    /// The string is unknown. The slot says where [`Dictionary::insert`] should put it.
    Miss(S),
}

/// Maps `(prefix, suffix)` pairs to codes.
///
/// Single byte strings are implicit and never stored, so only strings of two or more bytes are
/// ever found.
pub(crate) trait Dictionary {
    /// Where a missing string gets attached.
    type Slot: Copy;
    /// Search for the string `prefix + suffix`.
    fn find(&self, prefix: Code, suffix: u8) -> Lookup<Self::Slot>;
    /// Add a string that the last `find` missed at `slot`.
    ///
    /// The slot is only valid until the next mutation.
    fn insert(&mut self, slot: Self::Slot, entry: Entry) -> Result<(), LzwError>;
    /// The number of stored strings.
    fn len(&self) -> usize;
}

type NodeIdx = u32;

/// Unbalanced binary search tree over [`OrderingKey`], nodes live in an arena.
///
/// Node `0` is the root. Nodes are never removed, the whole arena is dropped at once when encoding ends.
#[derive(Default)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

#[derive(Clone, Copy)]
struct Node {
    entry: Entry,
    key: OrderingKey,
    /// Child with a smaller key.
    left: Option<NodeIdx>,
    /// Child with a larger key.
    right: Option<NodeIdx>,
}

impl Dictionary for Tree {
    /// The node to hang the new string from, `None` for an empty tree.
    type Slot = Option<NodeIdx>;

    fn find(&self, prefix: Code, suffix: u8) -> Lookup<Self::Slot> {
        if self.nodes.is_empty() {
            return Lookup::Miss(None);
        }

        let search = OrderingKey::new(prefix, suffix);
        let mut idx: NodeIdx = 0;
        loop {
            let node = &self.nodes[idx as usize];
            let child = match search.cmp(&node.key) {
                Ordering::Equal => {
                    debug_assert!(node.entry.prefix == prefix && node.entry.suffix == suffix);
                    return Lookup::Hit(node.entry.code);
                }
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };

            match child {
                Some(child) => idx = child,
                None => return Lookup::Miss(Some(idx)),
            }
        }
    }

    fn insert(&mut self, slot: Self::Slot, entry: Entry) -> Result<(), LzwError> {
        let key = OrderingKey::new(entry.prefix, entry.suffix);
        let idx = self.nodes.len() as NodeIdx;
        self.nodes
            .try_reserve(1)
            .map_err(|_| LzwError::OutOfMemory)?;

        match slot {
            None => debug_assert!(self.nodes.is_empty()),
            Some(parent) => {
                let parent = &mut self.nodes[parent as usize];
                if key < parent.key {
                    debug_assert!(parent.left.is_none());
                    parent.left = Some(idx);
                } else {
                    debug_assert!(key > parent.key && parent.right.is_none());
                    parent.right = Some(idx);
                }
            }
        }

        self.nodes.push(Node {
            entry,
            key,
            left: None,
            right: None,
        });
        Ok(())
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Hash map from [`OrderingKey`] to code.
#[cfg(feature = "std")]
#[derive(Default)]
pub(crate) struct HashTable {
    codes: HashMap<OrderingKey, Code>,
}

#[cfg(feature = "std")]
impl Dictionary for HashTable {
    type Slot = ();

    fn find(&self, prefix: Code, suffix: u8) -> Lookup<()> {
        match self.codes.get(&OrderingKey::new(prefix, suffix)) {
            Some(&code) => Lookup::Hit(code),
            None => Lookup::Miss(()),
        }
    }

    fn insert(&mut self, (): (), entry: Entry) -> Result<(), LzwError> {
        self.codes
            .try_reserve(1)
            .map_err(|_| LzwError::OutOfMemory)?;
        let old = self
            .codes
            .insert(OrderingKey::new(entry.prefix, entry.suffix), entry.code);
        debug_assert!(old.is_none());
        Ok(())
    }

    fn len(&self) -> usize {
        self.codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dictionary, Entry, Lookup, Tree};
    use crate::alloc::vec::Vec;
    use crate::{Code, FIRST_CODE};

    /// Learn strings for a fixed byte sequence the way the encoder does.
    fn learn<D: Dictionary + Default>(data: &[u8]) -> (D, Vec<Entry>) {
        let mut dict = D::default();
        let mut learned = Vec::new();
        let mut next = FIRST_CODE;
        let mut current = Code::from(data[0]);
        for &byte in &data[1..] {
            match dict.find(current, byte) {
                Lookup::Hit(code) => current = code,
                Lookup::Miss(slot) => {
                    let entry = Entry {
                        code: next,
                        prefix: current,
                        suffix: byte,
                    };
                    dict.insert(slot, entry).unwrap();
                    learned.push(entry);
                    next += 1;
                    current = Code::from(byte);
                }
            }
        }
        (dict, learned)
    }

    fn sample() -> Vec<u8> {
        let mut state = 0x2545_f491_u32;
        (0..20_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                // Small alphabet so that long strings get learned.
                b"abcdxyz"[(state % 7) as usize]
            })
            .collect()
    }

    fn assert_consistent<D: Dictionary + Default>() {
        let (dict, learned) = learn::<D>(&sample());
        assert_eq!(dict.len(), learned.len());
        for (i, entry) in learned.iter().enumerate() {
            assert_eq!(entry.code, FIRST_CODE + i as Code);
            let found = dict.find(entry.prefix, entry.suffix);
            assert!(matches!(found, Lookup::Hit(code) if code == entry.code));
        }

        let mut pairs: Vec<_> = learned.iter().map(|e| (e.prefix, e.suffix)).collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), learned.len(), "a string was learned twice");
    }

    #[test]
    fn empty_tree_has_no_parent() {
        let tree = Tree::default();
        assert_eq!(tree.find(b'a'.into(), b'b'), Lookup::Miss(None));
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn tree_attaches_by_key() {
        let mut tree = Tree::default();
        let root = Entry { code: 256, prefix: 0x41, suffix: 0x42 };
        tree.insert(None, root).unwrap();
        assert_eq!(tree.find(0x41, 0x42), Lookup::Hit(256));

        // Smaller high nibble of the suffix goes left, regardless of the prefix.
        let slot = match tree.find(0x200, 0x31) {
            Lookup::Miss(slot) => slot,
            hit => panic!("unexpected {:?}", hit),
        };
        assert_eq!(slot, Some(0));
        tree.insert(slot, Entry { code: 257, prefix: 0x200, suffix: 0x31 }).unwrap();
        assert_eq!(tree.nodes[0].left, Some(1));

        let slot = match tree.find(0x41, 0x43) {
            Lookup::Miss(slot) => slot,
            hit => panic!("unexpected {:?}", hit),
        };
        assert_eq!(slot, Some(0));
        tree.insert(slot, Entry { code: 258, prefix: 0x41, suffix: 0x43 }).unwrap();
        assert_eq!(tree.nodes[0].right, Some(2));

        assert_eq!(tree.find(0x200, 0x31), Lookup::Hit(257));
        assert_eq!(tree.find(0x41, 0x43), Lookup::Hit(258));
        assert_eq!(tree.find(0x41, 0x44), Lookup::Miss(Some(2)));
    }

    #[test]
    fn tree_finds_every_learned_string() {
        assert_consistent::<Tree>();
    }

    #[test]
    #[cfg(feature = "std")]
    fn hashed_finds_every_learned_string() {
        assert_consistent::<super::HashTable>();
    }

    #[test]
    #[cfg(feature = "std")]
    fn strategies_learn_the_same_strings() {
        let data = sample();
        let (_, tree) = learn::<Tree>(&data);
        let (_, hashed) = learn::<super::HashTable>(&data);
        assert_eq!(tree, hashed);
    }
}
