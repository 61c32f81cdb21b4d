use cwmetrics_common::{validate_config, CwMetricsError, PluginConfig};
use serde_json::json;

#[test]
fn test_missing_plugins_section() {
    assert_eq!(validate_config(&json!({})), Err(CwMetricsError::PluginConfigRequired));
    assert_eq!(validate_config(&json!(null)), Err(CwMetricsError::PluginConfigRequired));
}

#[test]
fn test_missing_cloudwatch_section() {
    let config = json!({ "plugins": { "statsd": { "host": "localhost" } } });
    assert_eq!(validate_config(&config), Err(CwMetricsError::PluginConfigRequired));
}

#[test]
fn test_non_object_cloudwatch_section_is_reported_missing() {
    let config = json!({ "plugins": { "cloudwatch": "my-namespace" } });
    assert_eq!(validate_config(&config), Err(CwMetricsError::PluginConfigRequired));
}

#[test]
fn test_missing_namespace() {
    let config = json!({ "plugins": { "cloudwatch": {} } });
    assert_eq!(validate_config(&config), Err(CwMetricsError::NamespaceRequired));
}

#[test]
fn test_non_string_namespace() {
    for value in [json!(42), json!(true), json!(null), json!(["ns"]), json!({ "name": "ns" })] {
        let config = json!({ "plugins": { "cloudwatch": { "namespace": value } } });
        assert_eq!(validate_config(&config), Err(CwMetricsError::NamespaceMustBeString));
    }
}

#[test]
fn test_empty_namespace() {
    let config = json!({ "plugins": { "cloudwatch": { "namespace": "" } } });
    assert_eq!(validate_config(&config), Err(CwMetricsError::NamespaceEmpty));
}

#[test]
fn test_valid_config_returns_owned_copy() {
    let mut config = json!({ "plugins": { "cloudwatch": { "namespace": "load-tests" } } });
    let plugin_config = validate_config(&config).unwrap();
    assert_eq!(plugin_config, PluginConfig { namespace: "load-tests".to_string() });

    // Later changes to the script configuration do not reach the validated copy.
    config["plugins"]["cloudwatch"]["namespace"] = json!("changed");
    assert_eq!(plugin_config.namespace, "load-tests");
}

#[test]
fn test_extra_keys_are_ignored() {
    let config = json!({
        "target": "http://localhost:3000",
        "plugins": { "cloudwatch": { "namespace": "ns", "metrics": [] } }
    });
    assert_eq!(validate_config(&config).unwrap().namespace, "ns");
}
