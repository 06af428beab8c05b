//! Builders that turn one `get_apps` entry into a running job's details
//!
//! Two candidate builders run in priority order: live `online` data first, the
//! declarative `pipeline` block second. Each returns `None` when its view cannot
//! produce a consistent result, and the first `Some` wins.

use crate::config::ReconcilerConfig;
use crate::jobs::details::{DetailSource, InstanceView, RunningJobWithDetails};
use crate::jobs::record::BlockchainJobRecord;
use crate::normalize::address::{normalize_address_list, normalize_node_address_with_prefix};
use crate::normalize::plugins::{
    build_pipeline_data, flatten_online_plugins, normalize_pipeline_plugins,
    NormalizedPluginInstance,
};
use crate::normalize::specs::{
    get_pipeline_specs, normalize_specs, project_ids_conflict, raw_specs_conflict,
    DeeploySpecs, SpecsInput,
};
use crate::normalize::values::{
    find_key, parse_u64, to_array, to_boolean_value, to_object, to_optional_string,
    to_u64_value, JsonMap,
};
use std::collections::HashSet;

pub type JobBuilder =
    fn(&BlockchainJobRecord, &JsonMap, &ReconcilerConfig) -> Option<RunningJobWithDetails>;

/// Candidate builders in priority order.
pub const CANDIDATE_BUILDERS: [(DetailSource, JobBuilder); 2] = [
    (DetailSource::Online, build_running_job_from_online),
    (DetailSource::Pipeline, build_running_job_from_pipeline),
];

/// Run the candidate builders against one apps entry and keep the first result.
pub fn build_running_job(
    job: &BlockchainJobRecord,
    entry: &JsonMap,
    config: &ReconcilerConfig,
) -> Option<(DetailSource, RunningJobWithDetails)> {
    CANDIDATE_BUILDERS
        .iter()
        .find_map(|(source, builder)| builder(job, entry, config).map(|details| (*source, details)))
}

/// A deployed app on one node, with its plugins already flattened.
#[derive(Debug)]
struct OnlineAppInstance<'a> {
    node_address: String,
    app_id: &'a str,
    app: &'a JsonMap,
    specs: &'a JsonMap,
    plugins: Vec<NormalizedPluginInstance>,
}

impl OnlineAppInstance<'_> {
    fn reports_job(&self, job_id: u64) -> bool {
        spec_job_id_matches(self.specs, job_id)
    }

    fn to_view(&self) -> InstanceView {
        InstanceView {
            node_address: self.node_address.clone(),
            node_alias: to_optional_string(find_key(self.app, "node_alias")),
            app_id: self.app_id.to_string(),
            is_online: true,
            plugins: self.plugins.clone(),
        }
    }
}

fn spec_job_id_matches(specs: &JsonMap, job_id: u64) -> bool {
    parse_u64(find_key(specs, "job_id")) == Some(job_id)
}

fn flatten_online_apps<'a>(online: &'a JsonMap, prefix: &str) -> Vec<OnlineAppInstance<'a>> {
    let mut instances = Vec::new();

    for (node, apps) in online {
        let Some(node_address) = normalize_node_address_with_prefix(node, prefix) else {
            continue;
        };

        for (app_id, app) in to_object(Some(apps)) {
            if app_id.trim().is_empty() {
                continue;
            }
            let app = to_object(Some(app));
            if !to_boolean_value(find_key(app, "is_deployed"), false) {
                continue;
            }

            instances.push(OnlineAppInstance {
                node_address: node_address.clone(),
                app_id: app_id.as_str(),
                app,
                specs: get_pipeline_specs(app),
                plugins: flatten_online_plugins(to_object(find_key(app, "plugins"))),
            });
        }
    }

    instances
}

/// Build a job's details from the live per-node reports in `entry.online`.
pub fn build_running_job_from_online(
    job: &BlockchainJobRecord,
    entry: &JsonMap,
    config: &ReconcilerConfig,
) -> Option<RunningJobWithDetails> {
    let candidates = flatten_online_apps(
        to_object(find_key(entry, "online")),
        &config.node_address_prefix,
    );
    if candidates.is_empty() {
        return None;
    }

    let preferred = candidates
        .iter()
        .find(|c| c.reports_job(job.id) && !raw_specs_conflict(c.specs, &job.project_hash))
        .or_else(|| candidates.iter().find(|c| c.reports_job(job.id)))
        .unwrap_or(&candidates[0]);

    let mut seen_nodes: HashSet<String> = HashSet::new();
    let selected: Vec<&OnlineAppInstance> = candidates
        .iter()
        .filter(|c| c.app_id == preferred.app_id)
        .filter(|c| seen_nodes.insert(c.node_address.clone()))
        .collect();

    if raw_specs_conflict(preferred.specs, &job.project_hash) {
        log::debug!(
            "Job {}: online app {} belongs to another project",
            job.id,
            preferred.app_id
        );
        return None;
    }

    let config_source = selected
        .iter()
        .find_map(|instance| instance.plugins.first())
        .map(|plugin| plugin.instance_conf.clone());
    let Some(primary_config) = config_source else {
        log::debug!("Job {}: online app {} has no plugins", job.id, preferred.app_id);
        return None;
    };

    let nodes: Vec<String> = selected.iter().map(|i| i.node_address.clone()).collect();
    let specs = normalize_specs(SpecsInput {
        raw_specs: preferred.specs,
        fallback_job_id: job.id,
        fallback_project_hash: &job.project_hash,
        fallback_target_nodes: &nodes,
        address_prefix: &config.node_address_prefix,
    });
    let has_specs = !preferred.specs.is_empty();

    Some(assemble(
        job,
        preferred.app_id.to_string(),
        specs,
        has_specs,
        nodes,
        selected.iter().map(|i| i.to_view()).collect(),
        primary_config,
        build_pipeline_data(to_object(find_key(preferred.app, "pipeline_data"))),
    ))
}

/// Build a job's details from the declarative `entry.pipeline` block.
///
/// Pipelines carry no per-node state, so every target node gets an offline
/// instance sharing the same plugin list.
pub fn build_running_job_from_pipeline(
    job: &BlockchainJobRecord,
    entry: &JsonMap,
    config: &ReconcilerConfig,
) -> Option<RunningJobWithDetails> {
    let pipeline = to_object(find_key(entry, "pipeline"));
    let raw_specs = get_pipeline_specs(pipeline);
    if raw_specs.is_empty() {
        return None;
    }

    let prefix = config.node_address_prefix.as_str();
    let current = find_key(raw_specs, "current_target_nodes");
    let target_nodes = if to_array(current).is_some() {
        normalize_address_list(current, prefix)
    } else {
        normalize_address_list(find_key(raw_specs, "initial_target_nodes"), prefix)
    };
    if target_nodes.is_empty() {
        log::debug!("Job {}: pipeline has no target nodes", job.id);
        return None;
    }

    let specs = normalize_specs(SpecsInput {
        raw_specs,
        fallback_job_id: to_u64_value(find_key(entry, "job_id"), job.id),
        fallback_project_hash: &job.project_hash,
        fallback_target_nodes: &target_nodes,
        address_prefix: prefix,
    });
    if project_ids_conflict(&specs.project_id, &job.project_hash) {
        log::debug!(
            "Job {}: pipeline reports project {}, expected {}",
            job.id,
            specs.project_id,
            job.project_hash
        );
        return None;
    }

    let plugins = normalize_pipeline_plugins(pipeline);
    let Some(first_plugin) = plugins.first() else {
        log::debug!("Job {}: pipeline has no plugins", job.id);
        return None;
    };
    let primary_config = first_plugin.instance_conf.clone();

    let app_id = ["NAME", "APP_ALIAS"]
        .iter()
        .find_map(|key| to_optional_string(find_key(pipeline, key)))
        .unwrap_or_else(|| format!("{}{}", config.fallback_alias_prefix, job.id));

    let instances = target_nodes
        .iter()
        .map(|node| InstanceView {
            node_address: node.clone(),
            node_alias: None,
            app_id: app_id.clone(),
            is_online: false,
            plugins: plugins.clone(),
        })
        .collect();

    Some(assemble(
        job,
        app_id,
        specs,
        true,
        target_nodes,
        instances,
        primary_config,
        build_pipeline_data(pipeline),
    ))
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    job: &BlockchainJobRecord,
    alias: String,
    specs: DeeploySpecs,
    has_specs: bool,
    nodes: Vec<String>,
    instances: Vec<InstanceView>,
    config: JsonMap,
    pipeline_data: serde_json::Value,
) -> RunningJobWithDetails {
    let pipeline_params = specs.pipeline_params().cloned();
    RunningJobWithDetails {
        job: job.clone(),
        alias,
        project_name: specs.project_name,
        allow_replication_in_the_wild: has_specs.then_some(specs.allow_replication_in_the_wild),
        spare_nodes: has_specs.then_some(specs.spare_nodes),
        job_tags: specs.job_tags,
        nodes,
        instances,
        config,
        pipeline_data,
        pipeline_params,
    }
}
