use crate::jobs::record::BlockchainJobRecord;
use crate::normalize::plugins::NormalizedPluginInstance;
use crate::normalize::values::JsonMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which view of the apps entry a job's details were built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailSource {
    Online,
    Pipeline,
}

/// One job instance on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    pub node_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_alias: Option<String>,
    pub app_id: String,
    pub is_online: bool,
    pub plugins: Vec<NormalizedPluginInstance>,
}

/// An escrow job merged with what the deployment API reports about it.
/// Derived on every reconciliation pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningJobWithDetails {
    #[serde(flatten)]
    pub job: BlockchainJobRecord,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_replication_in_the_wild: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spare_nodes: Option<Vec<String>>,
    pub job_tags: Vec<String>,
    pub nodes: Vec<String>,
    pub instances: Vec<InstanceView>,
    pub config: JsonMap,
    pub pipeline_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_params: Option<BTreeMap<String, String>>,
}

impl RunningJobWithDetails {
    pub fn id(&self) -> u64 {
        self.job.id
    }

    pub fn project_hash(&self) -> &str {
        &self.job.project_hash
    }

    pub fn online_instances(&self) -> usize {
        self.instances.iter().filter(|i| i.is_online).count()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &NormalizedPluginInstance> {
        self.instances.iter().flat_map(|i| i.plugins.iter())
    }
}
