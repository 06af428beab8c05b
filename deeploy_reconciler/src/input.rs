//! Loading of contract job records and `get_apps` responses

use crate::common::{Error, Result};
use crate::jobs::record::BlockchainJobRecord;
use crate::normalize::values::get_key;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parse job records from a JSON array or a `{"jobs": [...]}` object.
pub fn parse_running_jobs(text: &str) -> Result<Vec<BlockchainJobRecord>> {
    let document: Value = serde_json::from_str(text)?;
    let records = match document {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove("jobs")
            .filter(Value::is_array)
            .ok_or_else(|| Error::invalid_document("expected a \"jobs\" array"))?,
        _ => return Err(Error::invalid_document("expected an array of job records")),
    };
    Ok(serde_json::from_value(records)?)
}

/// Parse a `get_apps` payload, unwrapping `{"apps": ..}` and
/// `{"result": {"apps": ..}}` envelopes.
pub fn parse_apps(text: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(text)?;
    if !document.is_object() {
        return Err(Error::invalid_document("apps payload must be a JSON object"));
    }
    Ok(unwrap_apps_envelope(document))
}

fn unwrap_apps_envelope(document: Value) -> Value {
    let nested = get_key(Some(&document), "result")
        .and_then(|result| get_key(Some(result), "apps"))
        .or_else(|| get_key(Some(&document), "apps"))
        .filter(|apps| apps.is_object())
        .cloned();

    match nested {
        Some(apps) => apps,
        None => document,
    }
}

pub fn load_running_jobs(path: &Path) -> Result<Vec<BlockchainJobRecord>> {
    log::debug!("Reading job records from {}", path.display());
    parse_running_jobs(&fs::read_to_string(path)?)
}

pub fn load_apps(path: &Path) -> Result<Value> {
    log::debug!("Reading apps payload from {}", path.display());
    parse_apps(&fs::read_to_string(path)?)
}
