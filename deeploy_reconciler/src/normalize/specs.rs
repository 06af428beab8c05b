//! Extraction and normalization of the `deeploy_specs` block

use crate::normalize::address::normalize_address_list;
use crate::normalize::values::{
    find_key, to_array, to_boolean_value, to_number_value, to_object, to_optional_string,
    to_string_value, to_u64_value, JsonMap,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key variants the specs block has been published under, in lookup order.
pub const SPECS_KEYS: [&str; 3] = ["DEEPLOY_SPECS", "deeploy_specs", "deeploySpecs"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpecConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_params: Option<BTreeMap<String, String>>,
}

/// Normalized job metadata. Every field has a defined value even when the
/// upstream block is partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeeploySpecs {
    pub job_id: u64,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub allow_replication_in_the_wild: bool,
    pub date_created: f64,
    pub date_updated: f64,
    pub initial_target_nodes: Vec<String>,
    pub spare_nodes: Vec<String>,
    pub job_tags: Vec<String>,
    pub nr_target_nodes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_config: Option<JobSpecConfig>,
}

impl DeeploySpecs {
    pub fn pipeline_params(&self) -> Option<&BTreeMap<String, String>> {
        self.job_config
            .as_ref()
            .and_then(|config| config.pipeline_params.as_ref())
    }
}

/// Inputs for [`normalize_specs`].
#[derive(Debug, Clone, Copy)]
pub struct SpecsInput<'a> {
    pub raw_specs: &'a JsonMap,
    pub fallback_job_id: u64,
    pub fallback_project_hash: &'a str,
    pub fallback_target_nodes: &'a [String],
    pub address_prefix: &'a str,
}

/// Locate the specs block of a pipeline record, or an empty map.
pub fn get_pipeline_specs(pipeline: &JsonMap) -> &JsonMap {
    SPECS_KEYS
        .iter()
        .filter_map(|key| find_key(pipeline, key))
        .find(|value| value.is_object())
        .map(|value| to_object(Some(value)))
        .unwrap_or_else(|| to_object(None))
}

pub fn normalize_specs(input: SpecsInput<'_>) -> DeeploySpecs {
    let raw = input.raw_specs;

    let mut initial_target_nodes =
        normalize_address_list(find_key(raw, "initial_target_nodes"), input.address_prefix);
    if initial_target_nodes.is_empty() {
        initial_target_nodes = input.fallback_target_nodes.to_vec();
    }
    let spare_nodes = normalize_address_list(find_key(raw, "spare_nodes"), input.address_prefix);

    let job_tags = to_array(find_key(raw, "job_tags"))
        .map(|tags| {
            tags.iter()
                .map(|tag| to_string_value(Some(tag)))
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let job_config = find_key(raw, "job_config")
        .filter(|value| value.is_object())
        .map(|value| {
            let params: BTreeMap<String, String> =
                to_object(find_key(to_object(Some(value)), "pipeline_params"))
                    .iter()
                    .map(|(key, value)| (key.clone(), to_string_value(Some(value))))
                    .collect();
            JobSpecConfig {
                pipeline_params: if params.is_empty() { None } else { Some(params) },
            }
        });

    let project_id = to_optional_string(find_key(raw, "project_id"))
        .unwrap_or_else(|| input.fallback_project_hash.to_string());

    let nr_target_nodes = to_u64_value(
        find_key(raw, "nr_target_nodes"),
        initial_target_nodes.len() as u64,
    );

    DeeploySpecs {
        job_id: to_u64_value(find_key(raw, "job_id"), input.fallback_job_id),
        project_id,
        project_name: to_optional_string(find_key(raw, "project_name")),
        allow_replication_in_the_wild: to_boolean_value(
            find_key(raw, "allow_replication_in_the_wild"),
            false,
        ),
        date_created: to_number_value(find_key(raw, "date_created"), 0.0),
        date_updated: to_number_value(find_key(raw, "date_updated"), 0.0),
        initial_target_nodes,
        spare_nodes,
        job_tags,
        nr_target_nodes,
        job_config,
    }
}

/// Compare two project ids after trimming. Only `0x` hex hashes ignore case;
/// any other id must match exactly.
pub fn project_ids_equal(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    if is_hex_hash(left) && is_hex_hash(right) {
        left.eq_ignore_ascii_case(right)
    } else {
        left == right
    }
}

fn is_hex_hash(id: &str) -> bool {
    id.get(..2).is_some_and(|head| head.eq_ignore_ascii_case("0x"))
}

/// True only when both sides claim a project and the claims differ.
pub fn project_ids_conflict(specs_project_id: &str, project_hash: &str) -> bool {
    !specs_project_id.trim().is_empty()
        && !project_hash.trim().is_empty()
        && !project_ids_equal(specs_project_id, project_hash)
}

/// Project-identity check against a raw, not yet normalized specs block.
pub fn raw_specs_conflict(raw_specs: &JsonMap, project_hash: &str) -> bool {
    project_ids_conflict(
        &to_string_value(find_key(raw_specs, "project_id")),
        project_hash,
    )
}
