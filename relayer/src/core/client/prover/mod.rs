pub mod http;

use alloy::primitives::{Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::contracts;
use crate::types::tree::TreeSnapshot;

#[derive(Error, Debug)]
pub enum ProverError {
    #[error("Request to the proving service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Proving service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid prover url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Public inputs of a tree-update proof
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeUpdateArgs {
    pub old_root: B256,
    pub new_root: B256,
    pub leaf: B256,
    pub path_indices: U256,
}

/// Proof re-anchoring an account commitment onto a newer tree root
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeUpdate {
    pub proof: Bytes,
    pub args: TreeUpdateArgs,
}

impl TreeUpdate {
    pub fn new_root(&self) -> B256 {
        self.args.new_root
    }
}

impl From<&TreeUpdateArgs> for contracts::TreeUpdateArgs {
    fn from(args: &TreeUpdateArgs) -> Self {
        Self { oldRoot: args.old_root, newRoot: args.new_root, leaf: args.leaf, pathIndices: args.path_indices }
    }
}

/// Opaque tree-update proving capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProofEngine: Send + Sync {
    /// Proves the insertion of `commitment` into `snapshot`
    async fn generate_tree_update(&self, commitment: B256, snapshot: &TreeSnapshot) -> Result<TreeUpdate, ProverError>;
}
