//! Deeploy job reconciliation
//!
//! Merges three views of what is running on the compute network into one model:
//! escrow contract job records, the deployment API's `get_apps` response (live
//! `online` reports and declarative `pipeline` records), and the project identity
//! both sides claim. The core is synchronous and pure; malformed upstream data
//! excludes a job from the result instead of failing the whole pass.

pub mod common;
pub mod config;
pub mod input;
pub mod jobs;
pub mod normalize;
pub mod projects;
pub mod reconcile;

pub use common::{Error, Result};
pub use crate::config::ReconcilerConfig;
pub use jobs::{BlockchainJobRecord, DetailSource, InstanceView, RunningJobWithDetails};
pub use normalize::NormalizedPluginInstance;
pub use projects::{group_by_project, ProjectSummary};
pub use reconcile::{
    get_app_owner_from_get_apps, get_project_name_from_get_apps,
    normalize_get_apps_to_running_jobs_with_details, Reconciler, ReconciliationReport,
};
