// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Terraform output retrieval

use crate::error::{Result, VerifyError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, instrument};

#[derive(Deserialize)]
struct RawOutput {
    value: Value,
    #[serde(default)]
    sensitive: bool,
}

/// Named outputs of a completed `terraform apply`, read once per run
#[derive(Debug, Clone, Default)]
pub struct DeploymentOutputs {
    values: BTreeMap<String, String>,
}

impl DeploymentOutputs {
    /// Run `terraform output -json` in the given folder and parse the result
    #[instrument(skip(terraform_bin))]
    pub async fn load(terraform_bin: &str, dir: &Path) -> Result<Self> {
        info!("Reading Terraform outputs from {}", dir.display());

        let output = Command::new(terraform_bin)
            .args(["output", "-json", "-no-color"])
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| {
                VerifyError::Terraform(format!("Failed to run {}: {}", terraform_bin, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifyError::Terraform(format!(
                "terraform output failed in {}: {}",
                dir.display(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::from_json(&stdout)
    }

    /// Parse the document printed by `terraform output -json`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawOutput> = serde_json::from_str(json)
            .map_err(|e| VerifyError::Terraform(format!("Invalid output document: {}", e)))?;

        let values = raw
            .into_iter()
            .map(|(name, output)| {
                debug!(name = %name, sensitive = output.sensitive, "Loaded output");
                (name, render_value(output.value))
            })
            .collect();

        Ok(Self { values })
    }

    /// Get an output value by name
    pub fn get(&self, name: &str) -> Result<&str> {
        if self.values.is_empty() {
            return Err(VerifyError::Configuration(
                "The deployment produced no outputs".to_string(),
            ));
        }

        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                VerifyError::Configuration(format!("Output '{}' not found in deployment", name))
            })
    }

    /// Get an output value that must not be empty
    pub fn require(&self, name: &str) -> Result<&str> {
        let value = self.get(name)?;
        if value.is_empty() {
            return Err(VerifyError::Configuration(format!(
                "Output '{}' must not be empty",
                name
            )));
        }
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for DeploymentOutputs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Strings are used verbatim, everything else as compact JSON
fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::outputs as names;

    const OUTPUT_JSON: &str = r#"{
        "cluster_name": {"sensitive": false, "type": "string", "value": "aks-prod-1"},
        "cluster_id": {"sensitive": false, "type": "string", "value": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.ContainerService/managedClusters/aks-prod-1"},
        "resource_group_name": {"sensitive": false, "type": "string", "value": "rg1"},
        "host": {"sensitive": true, "type": "string", "value": "https://aks-prod-1-abcd.hcp.eastus.azmk8s.io:443"},
        "node_pools": {"sensitive": false, "type": ["list", "string"], "value": ["default", "user"]},
        "empty": {"sensitive": false, "type": "string", "value": ""}
    }"#;

    #[test]
    fn test_from_json_reads_string_outputs() {
        let outputs = DeploymentOutputs::from_json(OUTPUT_JSON).unwrap();

        assert_eq!(outputs.get(names::CLUSTER_NAME).unwrap(), "aks-prod-1");
        assert_eq!(outputs.get(names::RESOURCE_GROUP_NAME).unwrap(), "rg1");
        assert_eq!(
            outputs.get(names::HOST).unwrap(),
            "https://aks-prod-1-abcd.hcp.eastus.azmk8s.io:443"
        );
    }

    #[test]
    fn test_from_json_renders_non_string_outputs_as_json() {
        let outputs = DeploymentOutputs::from_json(OUTPUT_JSON).unwrap();
        assert_eq!(outputs.get("node_pools").unwrap(), r#"["default","user"]"#);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let outputs = DeploymentOutputs::from_json(OUTPUT_JSON).unwrap();

        let first = outputs.get(names::CLUSTER_ID).unwrap().to_string();
        let second = outputs.get(names::CLUSTER_ID).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_output_is_configuration_error() {
        let outputs = DeploymentOutputs::from_json(OUTPUT_JSON).unwrap();

        let err = outputs.get(names::KUBE_CONFIG_RAW).unwrap_err();
        assert!(matches!(err, VerifyError::Configuration(_)));
        assert!(err.to_string().contains("kube_config_raw"));
    }

    #[test]
    fn test_no_outputs_is_configuration_error() {
        let outputs = DeploymentOutputs::from_json("{}").unwrap();

        assert!(outputs.is_empty());
        let err = outputs.get(names::CLUSTER_NAME).unwrap_err();
        assert!(err.to_string().contains("no outputs"));
    }

    #[test]
    fn test_require_rejects_empty_value() {
        let outputs = DeploymentOutputs::from_json(OUTPUT_JSON).unwrap();

        assert!(outputs.get("empty").is_ok());
        assert!(matches!(
            outputs.require("empty"),
            Err(VerifyError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            DeploymentOutputs::from_json("not json"),
            Err(VerifyError::Terraform(_))
        ));
    }

    #[tokio::test]
    async fn test_load_reports_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeploymentOutputs::load("definitely-not-terraform", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Terraform(_)));
    }
}
