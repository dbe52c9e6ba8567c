//! # Sparse Merkle Tree
//!
//! Binary sparse Merkle tree keyed by field elements, hashed with Poseidon:
//!
//! - Leaf: `H(key, value, 1)`.
//! - Middle: `H(left, right)`.
//! - Empty subtree: `0`.
//!
//! The path of a key is read from its little-endian bits starting at bit 0
//! at the root: `0` descends left, `1` descends right. A leaf sits at the
//! shallowest level where its path no longer collides with another key, so
//! the root depends only on the set of `(key, value)` pairs, not on the
//! order they were inserted in.
//!
//! A tree with `max_levels = d` holds leaves down to level `d - 1`.
//! Inserting a key whose path shares `d - 1` or more leading bits with an
//! existing key fails with [`TreeError::ReachedMaxLevel`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use zkid_core::{CryptoError, FieldElement, Hash256, TreeError};

use crate::poseidon;

/// A tree that can produce membership and non-membership proofs.
pub trait SparseMerkleTree {
    /// Configured depth.
    fn max_levels(&self) -> usize;

    /// Current root. `0` for an empty tree.
    fn root(&self) -> FieldElement;

    /// Insert a new leaf. Fails if `key` is already present.
    fn add(&mut self, key: FieldElement, value: FieldElement) -> Result<(), TreeError>;

    /// Walk the path of `key` and report what occupies it.
    fn generate_proof(&self, key: FieldElement) -> Result<ProofResult, TreeError>;
}

/// The leaf found at a queried position when it belongs to a different key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAux {
    pub key: Hash256,
    pub value: Hash256,
}

/// A raw tree proof.
///
/// `siblings` runs from the root towards the leaf. Empty siblings at the
/// tail are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResult {
    pub existence: bool,
    pub siblings: Vec<Hash256>,
    pub node_aux: Option<NodeAux>,
}

impl ProofResult {
    /// Recompute the root this proof commits to for `(key, value)`.
    ///
    /// For a non-membership proof `value` is ignored: the path ends either
    /// in the auxiliary leaf or in an empty subtree.
    pub fn compute_root(&self, key: FieldElement, value: FieldElement) -> Result<FieldElement, TreeError> {
        let mut node = if self.existence {
            leaf_hash(key, value)?
        } else if let Some(aux) = &self.node_aux {
            leaf_hash(to_field(aux.key)?, to_field(aux.value)?)?
        } else {
            FieldElement::zero()
        };
        for (lvl, sibling) in self.siblings.iter().enumerate().rev() {
            let sibling = to_field(*sibling)?;
            node = if key.bit(lvl) {
                middle_hash(sibling, node)?
            } else {
                middle_hash(node, sibling)?
            };
        }
        Ok(node)
    }

    /// Check the proof against `root`.
    pub fn verify(&self, root: FieldElement, key: FieldElement, value: FieldElement) -> Result<bool, TreeError> {
        if let (false, Some(aux)) = (self.existence, &self.node_aux) {
            if to_field(aux.key)? == key {
                return Ok(false);
            }
        }
        Ok(self.compute_root(key, value)? == root)
    }
}

fn to_field(h: Hash256) -> Result<FieldElement, TreeError> {
    FieldElement::try_from(h).map_err(|e| TreeError::Crypto(CryptoError::Field(e)))
}

fn leaf_hash(key: FieldElement, value: FieldElement) -> Result<FieldElement, CryptoError> {
    poseidon::hash3(key, value, FieldElement::one())
}

fn middle_hash(left: FieldElement, right: FieldElement) -> Result<FieldElement, CryptoError> {
    poseidon::hash2(left, right)
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf { key: FieldElement, value: FieldElement },
    Middle { left: FieldElement, right: FieldElement },
}

/// An in-memory sparse Merkle tree.
///
/// Nodes are stored by hash. Superseded nodes are kept, so cloning a tree
/// and mutating the clone never affects the original.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    max_levels: usize,
    root: FieldElement,
    nodes: HashMap<FieldElement, Node>,
}

impl MemoryTree {
    /// Create an empty tree with `max_levels` levels.
    pub fn new(max_levels: usize) -> Result<Self, TreeError> {
        if max_levels == 0 {
            return Err(TreeError::InvalidDepth(max_levels));
        }
        Ok(Self {
            max_levels,
            root: FieldElement::zero(),
            nodes: HashMap::new(),
        })
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: FieldElement) -> Option<FieldElement> {
        let mut next = self.root;
        for lvl in 0..self.max_levels {
            match self.nodes.get(&next)? {
                Node::Leaf { key: k, value } => return (*k == key).then_some(*value),
                Node::Middle { left, right } => {
                    next = if key.bit(lvl) { *right } else { *left };
                }
            }
        }
        None
    }

    /// Replace the value of an existing leaf.
    pub fn update(&mut self, key: FieldElement, value: FieldElement) -> Result<(), TreeError> {
        self.root = self.update_node(self.root, key, value, 0)?;
        Ok(())
    }

    fn store_leaf(&mut self, key: FieldElement, value: FieldElement) -> Result<FieldElement, TreeError> {
        let hash = leaf_hash(key, value)?;
        self.nodes.insert(hash, Node::Leaf { key, value });
        Ok(hash)
    }

    fn store_middle(&mut self, left: FieldElement, right: FieldElement) -> Result<FieldElement, TreeError> {
        let hash = middle_hash(left, right)?;
        self.nodes.insert(hash, Node::Middle { left, right });
        Ok(hash)
    }

    fn add_leaf(
        &mut self,
        node: FieldElement,
        key: FieldElement,
        value: FieldElement,
        lvl: usize,
    ) -> Result<FieldElement, TreeError> {
        if lvl > self.max_levels - 1 {
            return Err(TreeError::ReachedMaxLevel {
                max_levels: self.max_levels,
            });
        }
        match self.nodes.get(&node).copied() {
            None => self.store_leaf(key, value),
            Some(Node::Leaf { key: old_key, value: old_value }) => {
                if old_key == key {
                    return Err(TreeError::EntryIndexAlreadyExists);
                }
                self.push_leaf(key, value, old_key, old_value, lvl)
            }
            Some(Node::Middle { left, right }) => {
                if key.bit(lvl) {
                    let right = self.add_leaf(right, key, value, lvl + 1)?;
                    self.store_middle(left, right)
                } else {
                    let left = self.add_leaf(left, key, value, lvl + 1)?;
                    self.store_middle(left, right)
                }
            }
        }
    }

    /// Push two colliding leaves down until their paths diverge.
    fn push_leaf(
        &mut self,
        key: FieldElement,
        value: FieldElement,
        old_key: FieldElement,
        old_value: FieldElement,
        lvl: usize,
    ) -> Result<FieldElement, TreeError> {
        if lvl + 2 > self.max_levels {
            return Err(TreeError::ReachedMaxLevel {
                max_levels: self.max_levels,
            });
        }
        let new_bit = key.bit(lvl);
        if new_bit == old_key.bit(lvl) {
            let next = self.push_leaf(key, value, old_key, old_value, lvl + 1)?;
            return if new_bit {
                self.store_middle(FieldElement::zero(), next)
            } else {
                self.store_middle(next, FieldElement::zero())
            };
        }
        let new_leaf = self.store_leaf(key, value)?;
        let old_leaf = leaf_hash(old_key, old_value)?;
        if new_bit {
            self.store_middle(old_leaf, new_leaf)
        } else {
            self.store_middle(new_leaf, old_leaf)
        }
    }

    fn update_node(
        &mut self,
        node: FieldElement,
        key: FieldElement,
        value: FieldElement,
        lvl: usize,
    ) -> Result<FieldElement, TreeError> {
        match self.nodes.get(&node).copied() {
            None => Err(TreeError::KeyNotFound),
            Some(Node::Leaf { key: k, .. }) if k == key => self.store_leaf(key, value),
            Some(Node::Leaf { .. }) => Err(TreeError::KeyNotFound),
            Some(Node::Middle { left, right }) => {
                if key.bit(lvl) {
                    let right = self.update_node(right, key, value, lvl + 1)?;
                    self.store_middle(left, right)
                } else {
                    let left = self.update_node(left, key, value, lvl + 1)?;
                    self.store_middle(left, right)
                }
            }
        }
    }
}

impl SparseMerkleTree for MemoryTree {
    fn max_levels(&self) -> usize {
        self.max_levels
    }

    fn root(&self) -> FieldElement {
        self.root
    }

    fn add(&mut self, key: FieldElement, value: FieldElement) -> Result<(), TreeError> {
        self.root = self.add_leaf(self.root, key, value, 0)?;
        Ok(())
    }

    fn generate_proof(&self, key: FieldElement) -> Result<ProofResult, TreeError> {
        let mut siblings = Vec::new();
        let mut next = self.root;
        let mut found = None;
        for lvl in 0..self.max_levels {
            match self.nodes.get(&next) {
                None => {
                    found = Some((false, None));
                    break;
                }
                Some(Node::Leaf { key: k, value }) => {
                    let aux = (*k != key).then(|| NodeAux {
                        key: Hash256::from(*k),
                        value: Hash256::from(*value),
                    });
                    found = Some((*k == key, aux));
                    break;
                }
                Some(Node::Middle { left, right }) => {
                    if key.bit(lvl) {
                        siblings.push(Hash256::from(*left));
                        next = *right;
                    } else {
                        siblings.push(Hash256::from(*right));
                        next = *left;
                    }
                }
            }
        }
        let (existence, node_aux) = found.ok_or(TreeError::ReachedMaxLevel {
            max_levels: self.max_levels,
        })?;
        while siblings.last().is_some_and(Hash256::is_zero) {
            siblings.pop();
        }
        Ok(ProofResult {
            existence,
            siblings,
            node_aux,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    #[test]
    fn empty_tree_has_zero_root() {
        let tree = MemoryTree::new(4).unwrap();
        assert!(tree.root().is_zero());
        let proof = tree.generate_proof(fe(1)).unwrap();
        assert!(!proof.existence);
        assert!(proof.siblings.is_empty());
        assert!(proof.node_aux.is_none());
    }

    #[test]
    fn zero_depth_rejected() {
        assert_eq!(MemoryTree::new(0).unwrap_err(), TreeError::InvalidDepth(0));
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let mut tree = MemoryTree::new(4).unwrap();
        tree.add(fe(5), fe(10)).unwrap();
        assert_eq!(tree.root(), leaf_hash(fe(5), fe(10)).unwrap());
    }

    #[test]
    fn diverging_leaves_at_first_bit() {
        let mut tree = MemoryTree::new(4).unwrap();
        tree.add(fe(2), fe(20)).unwrap();
        tree.add(fe(1), fe(10)).unwrap();
        let left = leaf_hash(fe(2), fe(20)).unwrap();
        let right = leaf_hash(fe(1), fe(10)).unwrap();
        assert_eq!(tree.root(), middle_hash(left, right).unwrap());
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut tree = MemoryTree::new(4).unwrap();
        tree.add(fe(1), fe(10)).unwrap();
        assert_eq!(
            tree.add(fe(1), fe(11)).unwrap_err(),
            TreeError::EntryIndexAlreadyExists
        );
    }

    #[test]
    fn colliding_paths_reach_max_level() {
        let mut tree = MemoryTree::new(4).unwrap();
        tree.add(fe(1), fe(1)).unwrap();
        // 1 and 17 share the low four bits
        assert_eq!(
            tree.add(fe(17), fe(1)).unwrap_err(),
            TreeError::ReachedMaxLevel { max_levels: 4 }
        );
        // 1 and 9 diverge at bit 3, one level too deep for a 4-level tree
        assert!(tree.add(fe(9), fe(1)).is_err());
        // 1 and 5 diverge at bit 2
        assert!(tree.add(fe(5), fe(1)).is_ok());
    }

    #[test]
    fn insertion_order_does_not_change_root() {
        let pairs = [(1u64, 7u64), (2, 8), (3, 9), (4, 10), (6, 11)];
        let mut a = MemoryTree::new(8).unwrap();
        for (k, v) in pairs {
            a.add(fe(k), fe(v)).unwrap();
        }
        let mut b = MemoryTree::new(8).unwrap();
        for (k, v) in pairs.iter().rev() {
            b.add(fe(*k), fe(*v)).unwrap();
        }
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn existence_proof_verifies() {
        let mut tree = MemoryTree::new(8).unwrap();
        for k in [1u64, 2, 3, 4] {
            tree.add(fe(k), fe(k * 100)).unwrap();
        }
        let proof = tree.generate_proof(fe(3)).unwrap();
        assert!(proof.existence);
        assert!(proof.node_aux.is_none());
        assert!(proof.verify(tree.root(), fe(3), fe(300)).unwrap());
        assert!(!proof.verify(tree.root(), fe(3), fe(301)).unwrap());
    }

    #[test]
    fn non_membership_with_aux_leaf() {
        let mut tree = MemoryTree::new(8).unwrap();
        tree.add(fe(1), fe(100)).unwrap();
        tree.add(fe(2), fe(200)).unwrap();
        // 5 = 0b101 follows 1's path through bit 0 and lands on leaf 1
        let proof = tree.generate_proof(fe(5)).unwrap();
        assert!(!proof.existence);
        let aux = proof.node_aux.unwrap();
        assert_eq!(aux.key, Hash256::from(fe(1)));
        assert_eq!(aux.value, Hash256::from(fe(100)));
        assert!(proof.verify(tree.root(), fe(5), FieldElement::zero()).unwrap());
    }

    #[test]
    fn non_membership_in_empty_subtree() {
        let mut tree = MemoryTree::new(8).unwrap();
        tree.add(fe(1), fe(100)).unwrap();
        tree.add(fe(3), fe(300)).unwrap();
        // 1 and 3 both go right at bit 0, so the left subtree is empty
        let proof = tree.generate_proof(fe(2)).unwrap();
        assert!(!proof.existence);
        assert!(proof.node_aux.is_none());
        assert_eq!(proof.siblings.len(), 1);
        assert!(proof.verify(tree.root(), fe(2), FieldElement::zero()).unwrap());
    }

    #[test]
    fn get_and_update() {
        let mut tree = MemoryTree::new(8).unwrap();
        tree.add(fe(1), fe(100)).unwrap();
        tree.add(fe(2), fe(200)).unwrap();
        assert_eq!(tree.get(fe(2)), Some(fe(200)));
        assert_eq!(tree.get(fe(4)), None);

        tree.update(fe(2), fe(201)).unwrap();
        assert_eq!(tree.get(fe(2)), Some(fe(201)));

        let mut fresh = MemoryTree::new(8).unwrap();
        fresh.add(fe(1), fe(100)).unwrap();
        fresh.add(fe(2), fe(201)).unwrap();
        assert_eq!(tree.root(), fresh.root());

        assert_eq!(tree.update(fe(4), fe(1)).unwrap_err(), TreeError::KeyNotFound);
    }
}
