//! Defensive normalization of untyped `get_apps` payloads

pub mod address;
pub mod plugins;
pub mod specs;
pub mod values;

pub use address::{normalize_node_address, normalize_node_address_with_prefix};
pub use plugins::{
    build_pipeline_data, flatten_online_plugins, normalize_pipeline_plugins,
    NormalizedPluginInstance, PipelinePlugins,
};
pub use specs::{get_pipeline_specs, normalize_specs, DeeploySpecs, JobSpecConfig, SpecsInput};
pub use values::{
    find_key, get_key, to_boolean_value, to_number_value, to_object, to_string_value, JsonMap,
};
