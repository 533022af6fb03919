use alloy::primitives::{uint, B256, U256};
use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonBytesHasher, PoseidonError};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Value of an empty leaf: `keccak256("tornado") % FIELD_SIZE`
pub const ZERO_VALUE: U256 =
    uint!(21663839004416932945382355908790599225266501822907911457504978515578255421292_U256);

/// Deepest tree the relayer rebuilds
pub const MAX_TREE_LEVELS: usize = 32;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Failed to parse tree snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tree element {0}")]
    InvalidElement(String),

    #[error("Tree of height {levels} cannot hold {leaves} leaves")]
    TreeFull { levels: usize, leaves: usize },

    #[error("Tree height {0} exceeds the maximum of {max}", max = MAX_TREE_LEVELS)]
    TooManyLevels(usize),

    #[error("Tree snapshot has no leaf layer")]
    MissingLeaves,

    #[error("Poseidon error: {0}")]
    Poseidon(#[from] PoseidonError),
}

/// Two-to-one compression used to build the tree
pub trait TreeHasher {
    fn hash_pair(&mut self, left: &U256, right: &U256) -> Result<U256, TreeError>;
}

/// Poseidon over BN254 with circom parameters
pub struct PoseidonHasher {
    inner: Poseidon<Fr>,
}

impl PoseidonHasher {
    pub fn new() -> Result<Self, TreeError> {
        Ok(Self { inner: Poseidon::<Fr>::new_circom(2)? })
    }
}

impl TreeHasher for PoseidonHasher {
    fn hash_pair(&mut self, left: &U256, right: &U256) -> Result<U256, TreeError> {
        let left = left.to_be_bytes::<32>();
        let right = right.to_be_bytes::<32>();
        let hash = self.inner.hash_bytes_be(&[&left, &right])?;
        Ok(U256::from_be_bytes(hash))
    }
}

/// Wire format written by the tree watcher. Only the height and the leaf layer
/// are trusted, every upper layer is recomputed.
#[derive(Deserialize)]
struct SerializedTree {
    levels: usize,
    #[serde(rename = "_layers")]
    layers: Vec<Vec<serde_json::Value>>,
}

/// Immutable view of the account tree. A refresh builds a new snapshot instead
/// of patching the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    levels: usize,
    leaves: Vec<U256>,
    root: U256,
}

impl TreeSnapshot {
    pub fn from_leaves<H: TreeHasher>(hasher: &mut H, levels: usize, leaves: Vec<U256>) -> Result<Self, TreeError> {
        if levels > MAX_TREE_LEVELS {
            return Err(TreeError::TooManyLevels(levels));
        }
        let capacity = 1usize.checked_shl(levels as u32).unwrap_or(usize::MAX);
        if leaves.len() > capacity {
            return Err(TreeError::TreeFull { levels, leaves: leaves.len() });
        }

        let mut zeros = Vec::with_capacity(levels + 1);
        zeros.push(ZERO_VALUE);
        for level in 0..levels {
            let zero = zeros[level];
            zeros.push(hasher.hash_pair(&zero, &zero)?);
        }

        let mut layer = leaves.clone();
        for zero in zeros.iter().take(levels) {
            if layer.is_empty() {
                break;
            }
            let mut next = Vec::with_capacity(layer.len().div_ceil(2));
            for pair in layer.chunks(2) {
                let right = pair.get(1).unwrap_or(zero);
                next.push(hasher.hash_pair(&pair[0], right)?);
            }
            layer = next;
        }
        let root = layer.first().copied().unwrap_or(zeros[levels]);

        Ok(Self { levels, leaves, root })
    }

    /// Parses the serialized snapshot kept in the tree store
    pub fn deserialize(serialized: &str) -> Result<Self, TreeError> {
        let tree: SerializedTree = serde_json::from_str(serialized)?;
        let leaves = tree
            .layers
            .into_iter()
            .next()
            .ok_or(TreeError::MissingLeaves)?
            .iter()
            .map(parse_element)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_leaves(&mut PoseidonHasher::new()?, tree.levels, leaves)
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn leaves(&self) -> &[U256] {
        &self.leaves
    }

    pub fn root(&self) -> U256 {
        self.root
    }

    pub fn root_bytes(&self) -> B256 {
        B256::from(self.root)
    }

    /// Whether a proof anchored at `root` is still current
    pub fn is_current(&self, root: &B256) -> bool {
        U256::from_be_bytes(root.0) == self.root
    }
}

// Elements are decimal or 0x-prefixed hex strings, small values may be plain numbers
fn parse_element(value: &serde_json::Value) -> Result<U256, TreeError> {
    match value {
        serde_json::Value::String(s) => U256::from_str(s).map_err(|_| TreeError::InvalidElement(s.clone())),
        serde_json::Value::Number(n) => {
            n.as_u64().map(U256::from).ok_or_else(|| TreeError::InvalidElement(n.to_string()))
        }
        other => Err(TreeError::InvalidElement(other.to_string())),
    }
}
