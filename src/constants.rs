// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Terraform output names read by the verification suites
pub mod outputs {
    pub const CLUSTER_NAME: &str = "cluster_name";
    pub const CLUSTER_ID: &str = "cluster_id";
    pub const RESOURCE_GROUP_NAME: &str = "resource_group_name";
    pub const HOST: &str = "host";
    pub const KUBE_CONFIG_RAW: &str = "kube_config_raw";
}

/// Azure Resource Manager settings
pub mod arm {
    pub const PUBLIC_CLOUD_ENDPOINT: &str = "https://management.azure.com";
    pub const SCOPE: &str = "https://management.azure.com/.default";
    /// API version of Microsoft.ContainerService/managedClusters
    pub const CONTAINER_SERVICE_API_VERSION: &str = "2024-02-01";
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Deployment scenario defaults
pub mod scenario {
    pub const EXAMPLE_DIR: &str = "examples/private-cluster";
    pub const TF_VAR_FILE: &str = "test.tfvars";
    pub const PRIVATE_CLUSTER: &str = "private-cluster";
    pub const PUBLIC_CLUSTER: &str = "public-cluster";
}

/// Workload smoke test defaults
pub mod smoke {
    pub const MANIFEST_PATH: &str = "resources/hello-world-app/app.yaml";
    pub const NAMESPACE: &str = "demo";
    pub const KUBECONFIG_PATH: &str = "./kubeconfig";
    pub const SERVICE_NAME: &str = "aks-helloworld";
    pub const SERVICE_PORT: i32 = 80;
    pub const NODE_POOL_MARKER: &str = "aks-default";
    pub const EXPECTED_NODE_COUNT: usize = 2;
    pub const RESPONSE_MARKER: &str = "Hello World";
    pub const RETRIES: u32 = 10;
    pub const RETRY_INTERVAL_SECS: u64 = 10;
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "aks-verify";
