//! Top-level reconciliation of escrow jobs against a `get_apps` response

use crate::config::ReconcilerConfig;
use crate::jobs::builders::{
    build_running_job, build_running_job_from_online, build_running_job_from_pipeline,
};
use crate::jobs::details::{DetailSource, RunningJobWithDetails};
use crate::jobs::record::BlockchainJobRecord;
use crate::normalize::specs::{get_pipeline_specs, project_ids_equal};
use crate::normalize::values::{find_key, to_object, to_optional_string, to_string_value, JsonMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counts describing one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub requested: usize,
    /// Jobs with no entry in the apps response.
    pub unmatched: usize,
    /// Jobs whose entry produced no details from either view.
    pub unresolved: usize,
    pub from_online: usize,
    pub from_pipeline: usize,
}

impl ReconciliationReport {
    pub fn resolved(&self) -> usize {
        self.from_online + self.from_pipeline
    }
}

/// Reconciles escrow job records with the deployment API's view of them.
///
/// Holds no state besides its configuration, so every call depends only on its
/// arguments.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn running_jobs_with_details(
        &self,
        running_jobs: &[BlockchainJobRecord],
        apps: &Value,
    ) -> Vec<RunningJobWithDetails> {
        self.reconcile_with_report(running_jobs, apps).0
    }

    /// Reconcile and report how each job was resolved. Output follows input order.
    pub fn reconcile_with_report(
        &self,
        running_jobs: &[BlockchainJobRecord],
        apps: &Value,
    ) -> (Vec<RunningJobWithDetails>, ReconciliationReport) {
        let mut report = ReconciliationReport {
            requested: running_jobs.len(),
            ..Default::default()
        };
        let mut resolved = Vec::with_capacity(running_jobs.len());

        for job in running_jobs {
            let Some(entry) = find_apps_entry(apps, job.id) else {
                report.unmatched += 1;
                continue;
            };

            match build_running_job(job, entry, &self.config) {
                Some((DetailSource::Online, details)) => {
                    report.from_online += 1;
                    resolved.push(details);
                }
                Some((DetailSource::Pipeline, details)) => {
                    report.from_pipeline += 1;
                    resolved.push(details);
                }
                None => {
                    log::debug!("Job {} has an apps entry but no renderable details", job.id);
                    report.unresolved += 1;
                }
            }
        }

        log::info!(
            "Reconciled {} of {} jobs ({} online, {} pipeline, {} unmatched, {} unresolved)",
            report.resolved(),
            report.requested,
            report.from_online,
            report.from_pipeline,
            report.unmatched,
            report.unresolved
        );

        (resolved, report)
    }

    pub fn build_from_online(
        &self,
        job: &BlockchainJobRecord,
        entry: &JsonMap,
    ) -> Option<RunningJobWithDetails> {
        build_running_job_from_online(job, entry, &self.config)
    }

    pub fn build_from_pipeline(
        &self,
        job: &BlockchainJobRecord,
        entry: &JsonMap,
    ) -> Option<RunningJobWithDetails> {
        build_running_job_from_pipeline(job, entry, &self.config)
    }
}

/// Find the apps entry for `job_id`.
///
/// Tries the decimal key first, then any key that parses to the same integer
/// (e.g. `"007"` or `" 7"`).
pub fn find_apps_entry(apps: &Value, job_id: u64) -> Option<&JsonMap> {
    let apps = to_object(Some(apps));
    let entry = apps.get(&job_id.to_string()).or_else(|| {
        apps.iter()
            .find(|(key, _)| key.trim().parse::<u64>().is_ok_and(|parsed| parsed == job_id))
            .map(|(_, entry)| entry)
    })?;
    if !entry.is_object() {
        log::warn!("Apps entry for job {} is not an object, treating it as empty", job_id);
    }
    Some(to_object(Some(entry)))
}

/// Reconcile with the default configuration.
pub fn normalize_get_apps_to_running_jobs_with_details(
    running_jobs: &[BlockchainJobRecord],
    apps: &Value,
) -> Vec<RunningJobWithDetails> {
    Reconciler::default().running_jobs_with_details(running_jobs, apps)
}

fn online_apps(apps: &Value) -> impl Iterator<Item = &JsonMap> {
    to_object(Some(apps)).values().flat_map(|entry| {
        to_object(find_key(to_object(Some(entry)), "online"))
            .values()
            .flat_map(|node_apps| to_object(Some(node_apps)).values())
            .map(|app| to_object(Some(app)))
    })
}

fn named_project(specs: &JsonMap, project_hash: &str) -> Option<String> {
    if !project_ids_equal(&to_string_value(find_key(specs, "project_id")), project_hash) {
        return None;
    }
    to_optional_string(find_key(specs, "project_name"))
}

/// First non-empty project name reported for `project_hash`, searching live app
/// specs across all entries before falling back to pipeline specs.
pub fn get_project_name_from_get_apps(apps: &Value, project_hash: &str) -> Option<String> {
    let project_hash = project_hash.trim();
    if project_hash.is_empty() {
        return None;
    }

    online_apps(apps)
        .find_map(|app| named_project(get_pipeline_specs(app), project_hash))
        .or_else(|| {
            to_object(Some(apps)).values().find_map(|entry| {
                let pipeline = to_object(find_key(to_object(Some(entry)), "pipeline"));
                named_project(get_pipeline_specs(pipeline), project_hash)
            })
        })
}

/// First non-empty `owner` reported by any live app.
pub fn get_app_owner_from_get_apps(apps: &Value) -> Option<String> {
    online_apps(apps).find_map(|app| to_optional_string(find_key(app, "owner")))
}
