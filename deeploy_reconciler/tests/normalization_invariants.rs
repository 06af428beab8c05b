//! Property tests for the normalization helpers

use deeploy_reconciler::normalize::address::normalize_node_address_with_prefix;
use deeploy_reconciler::normalize::values::{to_boolean_value, to_number_value, to_string_value};
use deeploy_reconciler::normalize::{normalize_pipeline_plugins, to_object};
use deeploy_reconciler::{normalize_get_apps_to_running_jobs_with_details, BlockchainJobRecord};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 _]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_address_always_prefixed_and_idempotent(raw in "\\PC{0,24}") {
        match normalize_node_address_with_prefix(&raw, "0xai_") {
            Some(address) => {
                prop_assert!(address.starts_with("0xai_"));
                prop_assert_eq!(
                    normalize_node_address_with_prefix(&address, "0xai_"),
                    Some(address.clone())
                );
            }
            None => prop_assert!(raw.trim().is_empty()),
        }
    }

    #[test]
    fn prop_numeric_strings_parse(n in -1_000_000i64..1_000_000) {
        let text = json!(format!("  {}  ", n));
        prop_assert_eq!(to_number_value(Some(&text), f64::NAN), n as f64);
        prop_assert_eq!(to_string_value(Some(&json!(n))), n.to_string());
    }

    #[test]
    fn prop_coercions_never_panic(value in arb_json(), fallback in any::<bool>()) {
        let number = to_number_value(Some(&value), 0.0);
        prop_assert!(number.is_finite());
        let _ = to_boolean_value(Some(&value), fallback);
        let _ = to_string_value(Some(&value));
    }

    #[test]
    fn prop_synthesized_ids_unique(shape in prop::collection::vec(0usize..4, 0..6)) {
        let blocks: Vec<Value> = shape
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let instances = vec![json!({}); *count];
                json!({"SIGNATURE": format!("SIG_{}", i), "INSTANCES": instances})
            })
            .collect();
        let pipeline = json!({"PLUGINS": blocks});
        let plugins = normalize_pipeline_plugins(to_object(Some(&pipeline)));

        prop_assert_eq!(plugins.len(), shape.iter().sum::<usize>());
        let ids: HashSet<&str> = plugins.iter().map(|p| p.instance.as_str()).collect();
        prop_assert_eq!(ids.len(), plugins.len());
        prop_assert!(plugins.iter().all(|p| !p.signature.is_empty() && !p.instance.is_empty()));
    }

    #[test]
    fn prop_reconciler_tolerates_arbitrary_entries(entry in arb_json(), id in 0u64..5) {
        let jobs = vec![BlockchainJobRecord::new(id, "0xp")];
        let apps = json!({ id.to_string(): entry });

        let first = normalize_get_apps_to_running_jobs_with_details(&jobs, &apps);
        let second = normalize_get_apps_to_running_jobs_with_details(&jobs, &apps);
        prop_assert!(first.len() <= 1);
        prop_assert_eq!(first, second);
    }
}
