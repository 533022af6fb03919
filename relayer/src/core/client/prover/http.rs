use alloy::primitives::B256;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::{ProofEngine, ProverError, TreeUpdate};
use crate::types::tree::TreeSnapshot;

const TREE_UPDATE_PATH: &str = "tree-update";

#[derive(Serialize)]
struct TreeUpdateRequest {
    commitment: B256,
    levels: usize,
    elements: Vec<String>,
}

/// Client for a proving service exposing `POST /tree-update`
pub struct HttpProofEngine {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpProofEngine {
    pub fn new(base_url: Url) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }
}

#[async_trait]
impl ProofEngine for HttpProofEngine {
    async fn generate_tree_update(&self, commitment: B256, snapshot: &TreeSnapshot) -> Result<TreeUpdate, ProverError> {
        info!(
            log_type = "starting",
            category = "tree_update",
            function_type = "prove",
            commitment = %commitment,
            "Requesting tree update proof."
        );
        let request = TreeUpdateRequest {
            commitment,
            levels: snapshot.levels(),
            elements: snapshot.leaves().iter().map(|leaf| leaf.to_string()).collect(),
        };
        let response = self.client.post(self.base_url.join(TREE_UPDATE_PATH)?).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProverError::Rejected { status: status.as_u16(), body });
        }

        let update: TreeUpdate = response.json().await?;
        debug!(new_root = %update.new_root(), "Tree update proof received");
        info!(
            log_type = "completed",
            category = "tree_update",
            function_type = "prove",
            commitment = %commitment,
            "Tree update proof generated."
        );
        Ok(update)
    }
}
