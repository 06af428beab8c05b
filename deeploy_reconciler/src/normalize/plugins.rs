//! Plugin flattening for live and declarative app records
//!
//! Live (`online`) apps report plugins as `signature -> [instance]` with real
//! instance ids. Declarative pipelines use either the current
//! `[{SIGNATURE, INSTANCES}]` block list or the older `signature -> [instance]`
//! map, and may omit instance ids entirely.

use crate::normalize::specs::SPECS_KEYS;
use crate::normalize::values::{find_key, to_array, to_object, to_optional_string, JsonMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One runnable plugin instance.
///
/// `signature` and `instance` are never empty. `start`, `last_alive` and
/// `last_error` are `None` for instances that have not been observed running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPluginInstance {
    pub signature: String,
    pub instance: String,
    pub start: Option<String>,
    pub last_alive: Option<String>,
    pub last_error: Option<String>,
    pub instance_conf: JsonMap,
}

/// The two wire layouts a pipeline's plugin collection can take.
#[derive(Debug, Clone, Copy)]
pub enum PipelinePlugins<'a> {
    /// `[{"SIGNATURE": .., "INSTANCES": [..]}, ..]`
    Blocks(&'a [Value]),
    /// `{"<signature>": [..], ..}`
    BySignature(&'a JsonMap),
}

impl<'a> PipelinePlugins<'a> {
    pub fn from_value(value: Option<&'a Value>) -> Option<Self> {
        match value {
            Some(Value::Array(blocks)) => Some(PipelinePlugins::Blocks(blocks)),
            Some(Value::Object(map)) => Some(PipelinePlugins::BySignature(map)),
            _ => None,
        }
    }

    pub fn normalize(self) -> Vec<NormalizedPluginInstance> {
        match self {
            PipelinePlugins::Blocks(blocks) => normalize_plugin_blocks(blocks),
            PipelinePlugins::BySignature(map) => normalize_plugin_map(map),
        }
    }
}

/// Flatten a live `signature -> [instance]` map.
///
/// Instances without an id are dropped; live data is expected to carry one.
pub fn flatten_online_plugins(plugins: &JsonMap) -> Vec<NormalizedPluginInstance> {
    let mut flattened = Vec::new();

    for (signature, instances) in plugins {
        let signature = signature.trim();
        if signature.is_empty() {
            continue;
        }
        let Some(instances) = to_array(Some(instances)) else {
            continue;
        };

        for raw in instances {
            let record = to_object(Some(raw));
            let instance_conf = to_object(find_key(record, "instance_conf"));
            let instance = to_optional_string(find_key(record, "instance"))
                .or_else(|| to_optional_string(find_key(instance_conf, "INSTANCE_ID")));

            let Some(instance) = instance else {
                log::debug!("Dropping live {} instance without an id", signature);
                continue;
            };

            flattened.push(NormalizedPluginInstance {
                signature: signature.to_string(),
                instance,
                start: to_optional_string(find_key(record, "start")),
                last_alive: to_optional_string(find_key(record, "last_alive")),
                last_error: to_optional_string(find_key(record, "last_error")),
                instance_conf: instance_conf.clone(),
            });
        }
    }

    flattened
}

/// Normalize the plugin collection of a declarative pipeline record.
pub fn normalize_pipeline_plugins(pipeline: &JsonMap) -> Vec<NormalizedPluginInstance> {
    PipelinePlugins::from_value(find_key(pipeline, "PLUGINS"))
        .map(PipelinePlugins::normalize)
        .unwrap_or_default()
}

fn normalize_plugin_blocks(blocks: &[Value]) -> Vec<NormalizedPluginInstance> {
    let mut flattened = Vec::new();

    for (plugin_index, block) in blocks.iter().enumerate() {
        let block = to_object(Some(block));
        let Some(signature) = to_optional_string(find_key(block, "SIGNATURE")) else {
            continue;
        };
        let Some(instances) = to_array(find_key(block, "INSTANCES")) else {
            continue;
        };

        for (instance_index, raw) in instances.iter().enumerate() {
            flattened.push(pipeline_instance(&signature, raw, || {
                format!("instance_{}_{}", plugin_index, instance_index)
            }));
        }
    }

    flattened
}

// Synthesized ids count across all signatures so they stay unique in the map.
fn normalize_plugin_map(map: &JsonMap) -> Vec<NormalizedPluginInstance> {
    let mut flattened = Vec::new();
    let mut index = 0usize;

    for (signature, instances) in map {
        let signature = signature.trim();
        if signature.is_empty() {
            continue;
        }
        let Some(instances) = to_array(Some(instances)) else {
            continue;
        };

        for raw in instances {
            let position = index;
            flattened.push(pipeline_instance(signature, raw, || {
                format!("instance_{}", position)
            }));
            index += 1;
        }
    }

    flattened
}

fn pipeline_instance(
    signature: &str,
    raw: &Value,
    synthesize_id: impl FnOnce() -> String,
) -> NormalizedPluginInstance {
    let record = to_object(Some(raw));
    let instance_conf = match find_key(record, "instance_conf") {
        Some(Value::Object(conf)) => conf,
        _ => record,
    };
    let instance = to_optional_string(find_key(instance_conf, "INSTANCE_ID"))
        .or_else(|| to_optional_string(find_key(record, "instance")))
        .unwrap_or_else(synthesize_id);

    NormalizedPluginInstance {
        signature: signature.to_string(),
        instance,
        start: None,
        last_alive: None,
        last_error: None,
        instance_conf: instance_conf.clone(),
    }
}

/// The pipeline record without its plugin and specs sub-keys, kept as an opaque
/// blob for display.
pub fn build_pipeline_data(pipeline: &JsonMap) -> Value {
    let stripped: JsonMap = pipeline
        .iter()
        .filter(|(key, _)| {
            !key.eq_ignore_ascii_case("plugins")
                && !SPECS_KEYS.iter().any(|specs| key.eq_ignore_ascii_case(specs))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(stripped)
}
