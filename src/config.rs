// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{arm, scenario, smoke};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Harness configuration, resolved once from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Subscription that owns the cluster under test
    pub subscription_id: String,
    /// Azure Resource Manager base URL
    pub arm_endpoint: Url,
    pub credentials: CredentialConfig,
    /// Terraform example folder holding the applied scenario
    pub example_dir: PathBuf,
    pub var_file: String,
    pub terraform_bin: String,
    /// Upper bound for a single ARM request
    pub http_timeout: Duration,
    pub smoke: SmokeConfig,
}

/// Inputs for the default Azure credential chain
#[derive(Debug, Clone, Default)]
pub struct CredentialConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Fixtures for the public-cluster workload smoke test
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    pub manifest_path: PathBuf,
    pub namespace: String,
    pub kubeconfig_path: PathBuf,
    pub service_name: String,
    pub service_port: i32,
    pub node_pool_marker: String,
    pub expected_node_count: usize,
    pub retries: u32,
    pub retry_interval: Duration,
    /// Upper bound for a single HTTP probe of the demo service
    pub request_timeout: Duration,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(smoke::MANIFEST_PATH),
            namespace: smoke::NAMESPACE.to_string(),
            kubeconfig_path: PathBuf::from(smoke::KUBECONFIG_PATH),
            service_name: smoke::SERVICE_NAME.to_string(),
            service_port: smoke::SERVICE_PORT,
            node_pool_marker: smoke::NODE_POOL_MARKER.to_string(),
            expected_node_count: smoke::EXPECTED_NODE_COUNT,
            retries: smoke::RETRIES,
            retry_interval: Duration::from_secs(smoke::RETRY_INTERVAL_SECS),
            request_timeout: Duration::from_secs(smoke::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let subscription_id = lookup("AZURE_SUBSCRIPTION_ID")
            .filter(|s| !s.is_empty())
            .context("AZURE_SUBSCRIPTION_ID is not set in the environment variables")?;

        let arm_endpoint = lookup("AZURE_RESOURCE_MANAGER_ENDPOINT")
            .unwrap_or_else(|| arm::PUBLIC_CLOUD_ENDPOINT.to_string());
        let arm_endpoint = Url::parse(&arm_endpoint)
            .with_context(|| format!("Invalid AZURE_RESOURCE_MANAGER_ENDPOINT: {}", arm_endpoint))?;

        let credentials = CredentialConfig {
            tenant_id: lookup("AZURE_TENANT_ID"),
            client_id: lookup("AZURE_CLIENT_ID"),
            client_secret: lookup("AZURE_CLIENT_SECRET"),
        };

        let defaults = SmokeConfig::default();
        let smoke = SmokeConfig {
            manifest_path: lookup("SMOKE_MANIFEST_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_path),
            namespace: lookup("SMOKE_NAMESPACE").unwrap_or(defaults.namespace),
            kubeconfig_path: lookup("SMOKE_KUBECONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.kubeconfig_path),
            service_name: lookup("SMOKE_SERVICE_NAME").unwrap_or(defaults.service_name),
            service_port: parse_or(&lookup, "SMOKE_SERVICE_PORT", defaults.service_port)?,
            node_pool_marker: lookup("SMOKE_NODE_POOL_MARKER")
                .unwrap_or(defaults.node_pool_marker),
            expected_node_count: parse_or(
                &lookup,
                "SMOKE_EXPECTED_NODES",
                defaults.expected_node_count,
            )?,
            retries: parse_or(&lookup, "SMOKE_RETRIES", defaults.retries)?,
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "SMOKE_RETRY_INTERVAL_SECS",
                defaults.retry_interval.as_secs(),
            )?),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SMOKE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
        };

        if smoke.retries == 0 {
            bail!("SMOKE_RETRIES must be at least 1");
        }
        if smoke.request_timeout.is_zero() {
            bail!("SMOKE_REQUEST_TIMEOUT_SECS must be at least 1");
        }

        Ok(Config {
            subscription_id,
            arm_endpoint,
            credentials,
            example_dir: lookup("TF_EXAMPLE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(scenario::EXAMPLE_DIR)),
            var_file: lookup("TF_VAR_FILE").unwrap_or_else(|| scenario::TF_VAR_FILE.to_string()),
            terraform_bin: lookup("TERRAFORM_BIN").unwrap_or_else(|| "terraform".to_string()),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                arm::HTTP_TIMEOUT_SECS,
            )?),
            smoke,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
