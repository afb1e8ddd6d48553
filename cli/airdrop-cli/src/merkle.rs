//! Commutative-hash binary Merkle tree.
//!
//! Leaves are deduplicated and sorted by raw byte value before the first layer
//! is formed, and parents use [`pair_hash`], which orders its inputs before
//! hashing. The tree is therefore a function of the leaf *set* alone and
//! proofs need no position bits. An unpaired last node is promoted to the
//! next layer unchanged.

use std::collections::BTreeSet;

use tracing::debug;

use crate::common::{hex_encode, pair_hash, Hash};
use crate::error::{DistributorError, Result};
use crate::leaf::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` holds the sorted leaves, the last layer holds the root.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from records, hashing each with [`Record::leaf_hash`].
    pub fn from_records(records: &[Record]) -> Result<Self> {
        Self::from_leaves(records.iter().map(Record::leaf_hash))
    }

    /// Build a tree from pre-hashed leaves. Duplicate leaves collapse into one.
    pub fn from_leaves<I>(leaves: I) -> Result<Self>
    where
        I: IntoIterator<Item = Hash>,
    {
        let elements: Vec<Hash> = leaves
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if elements.is_empty() {
            return Err(DistributorError::EmptySet);
        }

        let mut layers = vec![elements];
        while layers[layers.len() - 1].len() > 1 {
            let next = next_layer(&layers[layers.len() - 1]);
            layers.push(next);
        }

        debug!(
            "Built Merkle tree with {} leaves and {} layers",
            layers[0].len(),
            layers.len()
        );
        Ok(Self { layers })
    }

    pub fn root(&self) -> Hash {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn layers(&self) -> &[Vec<Hash>] {
        &self.layers
    }

    /// Number of distinct leaves.
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    pub fn proof(&self, record: &Record) -> Result<Vec<Hash>> {
        self.proof_for_leaf(&record.leaf_hash())
    }

    /// Collect the sibling of `leaf` on every layer below the root, bottom-up.
    ///
    /// Layers where the node was the unpaired tail contribute nothing.
    pub fn proof_for_leaf(&self, leaf: &Hash) -> Result<Vec<Hash>> {
        let mut idx = self.layers[0]
            .binary_search(leaf)
            .map_err(|_| DistributorError::NotFound(hex_encode(leaf)))?;

        let mut proof = Vec::with_capacity(self.layers.len() - 1);
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            if let Some(sibling) = layer.get(sibling_idx) {
                proof.push(*sibling);
            }
            idx /= 2;
        }
        Ok(proof)
    }
}

/// Fold one layer into its parent.
fn next_layer(elements: &[Hash]) -> Vec<Hash> {
    elements
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => pair_hash(a, b),
            _ => pair[0],
        })
        .collect()
}

/// Recompute the root from `leaf` and its proof and compare it with `root`.
pub fn verify_proof(proof: &[Hash], leaf: &Hash, root: &Hash) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |acc, sibling| pair_hash(&acc, sibling));
    computed == *root
}
