//! Fixed-size Merkle tree
//!
//! Pairs are hashed in sorted order, so a proof is a plain list of siblings
//! with no left/right flags. A trailing odd node is paired with zero.

use stark_primitives::Felt;

use crate::error::CryptoError;
use crate::hash::hash_elements;

/// Hash two nodes in ascending order
pub fn merkle_hash(a: &Felt, b: &Felt) -> Felt {
    if a <= b {
        hash_elements(&[*a, *b])
    } else {
        hash_elements(&[*b, *a])
    }
}

/// Check that `path` leads from `leaf` to `root`
pub fn verify_merkle_path(root: &Felt, leaf: &Felt, path: &[Felt]) -> bool {
    let computed = path
        .iter()
        .fold(*leaf, |node, sibling| merkle_hash(&node, sibling));
    computed == *root
}

/// Merkle tree over a fixed list of leaves
#[derive(Debug, Clone)]
pub struct FixedSizeMerkleTree {
    leaves: Vec<Felt>,
    /// Every level below the root, leaves first
    branches: Vec<Vec<Felt>>,
    root: Felt,
}

impl FixedSizeMerkleTree {
    /// Build the tree
    pub fn new(leaves: Vec<Felt>) -> Result<Self, CryptoError> {
        if leaves.is_empty() {
            return Err(CryptoError::EmptyMerkleTree);
        }

        let mut branches = Vec::new();
        let mut level = leaves.clone();
        while level.len() > 1 {
            let next = level
                .chunks(2)
                .map(|pair| merkle_hash(&pair[0], pair.get(1).unwrap_or(&Felt::ZERO)))
                .collect();
            branches.push(level);
            level = next;
        }

        Ok(FixedSizeMerkleTree {
            leaves,
            branches,
            root: level[0],
        })
    }

    /// Root hash
    pub fn root(&self) -> Felt {
        self.root
    }

    /// Leaves in insertion order
    pub fn leaves(&self) -> &[Felt] {
        &self.leaves
    }

    /// Number of levels below the root, which is also the proof length
    pub fn depth(&self) -> usize {
        self.branches.len()
    }

    /// Sibling path from `leaf` to the root
    pub fn proof(&self, leaf: &Felt) -> Result<Vec<Felt>, CryptoError> {
        let mut path = Vec::with_capacity(self.branches.len());
        let mut node = *leaf;
        for branch in &self.branches {
            let index = branch
                .iter()
                .position(|candidate| *candidate == node)
                .ok_or(CryptoError::LeafNotFound(*leaf))?;
            let sibling = if index % 2 == 0 {
                branch.get(index + 1).copied().unwrap_or(Felt::ZERO)
            } else {
                branch[index - 1]
            };
            node = merkle_hash(&node, &sibling);
            path.push(sibling);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaves(n: u64) -> Vec<Felt> {
        (1..=n).map(|i| Felt::from(i * 0x100 + 7)).collect()
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert!(matches!(
            FixedSizeMerkleTree::new(vec![]),
            Err(CryptoError::EmptyMerkleTree)
        ));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = Felt::from(42u64);
        let tree = FixedSizeMerkleTree::new(vec![leaf]).unwrap();
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.depth(), 0);
        assert!(tree.proof(&leaf).unwrap().is_empty());
        assert!(verify_merkle_path(&tree.root(), &leaf, &[]));
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        let tree = FixedSizeMerkleTree::new(l.clone()).unwrap();
        assert_eq!(tree.root(), merkle_hash(&l[0], &l[1]));
        assert_eq!(tree.proof(&l[0]).unwrap(), vec![l[1]]);
        assert_eq!(tree.proof(&l[1]).unwrap(), vec![l[0]]);
    }

    #[test]
    fn test_merkle_hash_is_symmetric() {
        let a = Felt::from(1u64);
        let b = Felt::from(2u64);
        assert_eq!(merkle_hash(&a, &b), merkle_hash(&b, &a));
    }

    #[test]
    fn test_odd_leaf_paired_with_zero() {
        let l = leaves(3);
        let tree = FixedSizeMerkleTree::new(l.clone()).unwrap();
        let expected = merkle_hash(
            &merkle_hash(&l[0], &l[1]),
            &merkle_hash(&l[2], &Felt::ZERO),
        );
        assert_eq!(tree.root(), expected);
        assert_eq!(tree.proof(&l[2]).unwrap()[0], Felt::ZERO);
    }

    #[test]
    fn test_unknown_leaf() {
        let tree = FixedSizeMerkleTree::new(leaves(4)).unwrap();
        assert!(matches!(
            tree.proof(&Felt::from(999u64)),
            Err(CryptoError::LeafNotFound(_))
        ));
    }

    #[test]
    fn test_tampered_path_fails() {
        let l = leaves(4);
        let tree = FixedSizeMerkleTree::new(l.clone()).unwrap();
        let mut proof = tree.proof(&l[0]).unwrap();
        proof[0] = Felt::from(1u64);
        assert!(!verify_merkle_path(&tree.root(), &l[0], &proof));
    }

    proptest! {
        #[test]
        fn prop_every_proof_has_depth_length_and_verifies(
            raw in prop::collection::hash_set(any::<u64>(), 1..40)
        ) {
            let l: Vec<Felt> = raw.into_iter().map(Felt::from).collect();
            let tree = FixedSizeMerkleTree::new(l.clone()).unwrap();
            prop_assert_eq!(tree.leaves(), &l[..]);
            for leaf in &l {
                let proof = tree.proof(leaf).unwrap();
                prop_assert_eq!(proof.len(), tree.depth());
                prop_assert!(verify_merkle_path(&tree.root(), leaf, &proof));
            }
        }
    }
}
