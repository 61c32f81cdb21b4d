use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CwMetricsError, Result};

/// Key of the plugin section under `config.plugins`.
pub const PLUGIN_NAME: &str = "cloudwatch";
pub const PLUGIN_PARAM_NAMESPACE: &str = "namespace";

/// Validated plugin settings, detached from the script configuration they were read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub namespace: String,
}

/// Check `plugins.cloudwatch.namespace` in a script configuration and return an owned copy.
///
/// The checks run in order and stop at the first failure:
/// the section must exist, `namespace` must be present, it must be a string,
/// and it must be non-empty. A section that exists but is not an object is
/// reported as missing.
pub fn validate_config(script_config: &Value) -> Result<PluginConfig> {
    let section = script_config
        .get("plugins")
        .and_then(|plugins| plugins.get(PLUGIN_NAME))
        .and_then(Value::as_object)
        .ok_or(CwMetricsError::PluginConfigRequired)?;

    let namespace = section
        .get(PLUGIN_PARAM_NAMESPACE)
        .ok_or(CwMetricsError::NamespaceRequired)?
        .as_str()
        .ok_or(CwMetricsError::NamespaceMustBeString)?;

    if namespace.is_empty() {
        return Err(CwMetricsError::NamespaceEmpty);
    }

    Ok(PluginConfig { namespace: namespace.to_string() })
}
