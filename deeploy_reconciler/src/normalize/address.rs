//! Node address canonicalization

use crate::config::DEFAULT_NODE_ADDRESS_PREFIX;
use crate::normalize::values::{to_array, to_string_value};
use serde_json::Value;

/// Canonicalize a node address using the network's default prefix.
pub fn normalize_node_address(raw: &str) -> Option<String> {
    normalize_node_address_with_prefix(raw, DEFAULT_NODE_ADDRESS_PREFIX)
}

/// Trim `raw` and make sure it carries `prefix`. Blank input yields `None`, so the
/// result is never a bare or empty address.
pub fn normalize_node_address_with_prefix(raw: &str, prefix: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(prefix) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}{}", prefix, trimmed))
    }
}

/// Stringify an untyped value and canonicalize it.
pub fn normalize_node_address_value(value: Option<&Value>, prefix: &str) -> Option<String> {
    normalize_node_address_with_prefix(&to_string_value(value), prefix)
}

/// Normalize every element of a JSON array, dropping blanks.
/// Anything other than an array yields an empty list.
pub fn normalize_address_list(value: Option<&Value>, prefix: &str) -> Vec<String> {
    to_array(value)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| normalize_node_address_value(Some(item), prefix))
                .collect()
        })
        .unwrap_or_default()
}
