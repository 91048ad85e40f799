// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Microsoft.ContainerService/managedClusters over the ARM REST API

use crate::azure::credential::DefaultCredential;
use crate::constants::arm;
use crate::error::{Result, VerifyError};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

/// A managed cluster as returned by ARM (only the fields we assert on)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: ManagedClusterProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(default, rename = "privateFQDN")]
    pub private_fqdn: Option<String>,
}

/// One kubeconfig in a credential response
#[derive(Debug, Clone)]
pub struct CredentialResult {
    pub name: String,
    pub value: Vec<u8>,
}

#[derive(Deserialize)]
struct RawCredentialResults {
    #[serde(default)]
    kubeconfigs: Vec<RawCredentialResult>,
}

#[derive(Deserialize)]
struct RawCredentialResult {
    #[serde(default)]
    name: String,
    value: String,
}

/// The live cluster resource plus its admin credentials
#[derive(Debug, Clone)]
pub struct ClusterDescriptor {
    pub name: String,
    pub id: String,
    pub admin_credentials: Vec<CredentialResult>,
}

impl ClusterDescriptor {
    /// The first admin kubeconfig; a response with none is an API error
    pub fn admin_kubeconfig(&self) -> Result<&[u8]> {
        self.admin_credentials
            .first()
            .map(|c| c.value.as_slice())
            .ok_or_else(|| {
                VerifyError::Api(format!(
                    "Admin credential response for cluster {} contains no kubeconfigs",
                    self.name
                ))
            })
    }
}

/// Client for managed clusters in one subscription
pub struct ManagedClustersClient {
    endpoint: Url,
    subscription_id: String,
    credential: DefaultCredential,
    http: reqwest::Client,
}

impl ManagedClustersClient {
    pub fn new(
        endpoint: Url,
        subscription_id: &str,
        credential: DefaultCredential,
        http: reqwest::Client,
    ) -> Self {
        Self {
            endpoint,
            subscription_id: subscription_id.to_string(),
            credential,
            http,
        }
    }

    fn cluster_url(&self, resource_group: &str, name: &str, action: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                VerifyError::Configuration(format!("Invalid ARM endpoint: {}", self.endpoint))
            })?;
            segments.pop_if_empty().extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                resource_group,
                "providers",
                "Microsoft.ContainerService",
                "managedClusters",
                name,
            ]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        url.query_pairs_mut()
            .append_pair("api-version", arm::CONTAINER_SERVICE_API_VERSION);
        Ok(url)
    }

    /// Get the managed cluster resource
    #[instrument(skip(self))]
    pub async fn get(&self, resource_group: &str, name: &str) -> Result<ManagedCluster> {
        let url = self.cluster_url(resource_group, name, None)?;
        let token = self.credential.bearer().await?;
        debug!(%url, "ARM GET");

        let resp = self.http.get(url).bearer_auth(&token).send().await?;
        let body = read_arm_body(resp).await?;

        serde_json::from_value(body)
            .map_err(|e| VerifyError::Api(format!("Malformed managed cluster {}: {}", name, e)))
    }

    /// List the admin kubeconfigs of the managed cluster
    #[instrument(skip(self))]
    pub async fn list_cluster_admin_credentials(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Vec<CredentialResult>> {
        let url = self.cluster_url(resource_group, name, Some("listClusterAdminCredential"))?;
        let token = self.credential.bearer().await?;
        debug!(%url, "ARM POST");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        let body = read_arm_body(resp).await?;

        let raw: RawCredentialResults = serde_json::from_value(body).map_err(|e| {
            VerifyError::Api(format!("Malformed credential response for {}: {}", name, e))
        })?;

        raw.kubeconfigs
            .into_iter()
            .map(|k| {
                let value = STANDARD.decode(k.value.as_bytes()).map_err(|e| {
                    VerifyError::Api(format!("Kubeconfig '{}' is not valid base64: {}", k.name, e))
                })?;
                Ok(CredentialResult {
                    name: k.name,
                    value,
                })
            })
            .collect()
    }

    /// Fetch the cluster and its admin credentials as one descriptor
    pub async fn fetch_descriptor(&self, resource_group: &str, name: &str) -> Result<ClusterDescriptor> {
        let cluster = self.get(resource_group, name).await?;
        info!("ClusterId: {}", cluster.id);

        let admin_credentials = self.list_cluster_admin_credentials(resource_group, name).await?;
        debug!(
            "Received {} admin kubeconfig(s) for cluster {}",
            admin_credentials.len(),
            name
        );

        Ok(ClusterDescriptor {
            name: cluster.name,
            id: cluster.id,
            admin_credentials,
        })
    }
}

/// Turn a non-2xx ARM reply into an API error carrying `code: message`
async fn read_arm_body(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(VerifyError::Api(format!(
            "ARM returned {}: {}",
            status,
            parse_arm_error(&body)
        )));
    }
    Ok(body)
}

fn parse_arm_error(body: &Value) -> String {
    let err = body.get("error").unwrap_or(body);
    let code = err["code"].as_str().unwrap_or("Unknown");
    let message = err["message"].as_str().unwrap_or("unknown error");
    format!("{}: {}", code, message)
}
