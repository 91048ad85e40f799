// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Multi-document manifest apply and delete

use crate::constants::FIELD_MANAGER;
use crate::error::{Result, VerifyError};
use kube::{
    api::{DeleteParams, DynamicObject, GroupVersionKind, Patch, PatchParams},
    discovery::{self, ApiResource, Scope},
    Api, Client,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, instrument};

/// One object of a manifest file
#[derive(Debug, Clone)]
pub struct ManifestObject {
    pub gvk: GroupVersionKind,
    pub name: String,
    pub namespace: Option<String>,
    pub body: Value,
}

/// The objects of a manifest file, in document order
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    objects: Vec<ManifestObject>,
}

impl Manifest {
    /// Read and parse a manifest file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path).await.map_err(|e| {
            VerifyError::Manifest(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::parse(&yaml)
    }

    /// Parse every non-empty YAML document as a Kubernetes object
    pub fn parse(yaml: &str) -> Result<Self> {
        let mut objects = Vec::new();

        for doc in serde_yaml::Deserializer::from_str(yaml) {
            let value = Value::deserialize(doc)
                .map_err(|e| VerifyError::Manifest(format!("Invalid YAML: {}", e)))?;
            if value.is_null() {
                continue;
            }
            objects.push(parse_object(value)?);
        }

        if objects.is_empty() {
            return Err(VerifyError::Manifest("Manifest contains no objects".to_string()));
        }

        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[ManifestObject] {
        &self.objects
    }

    /// Look up each object's API resource and scope on the cluster
    #[instrument(skip(self, client))]
    pub async fn resolve(&self, client: &Client, default_namespace: &str) -> Result<ResolvedManifest> {
        let mut objects = Vec::with_capacity(self.objects.len());

        for object in &self.objects {
            let (resource, caps) = discovery::pinned_kind(client, &object.gvk).await?;
            let namespace = match caps.scope {
                Scope::Namespaced => Some(
                    object
                        .namespace
                        .clone()
                        .unwrap_or_else(|| default_namespace.to_string()),
                ),
                Scope::Cluster => None,
            };

            let mut body = object.body.clone();
            if let (Some(ns), Some(metadata)) = (&namespace, body.get_mut("metadata")) {
                metadata["namespace"] = Value::String(ns.clone());
            }

            objects.push(ResolvedObject {
                resource,
                namespace,
                name: object.name.clone(),
                body,
            });
        }

        Ok(ResolvedManifest {
            client: client.clone(),
            objects,
        })
    }
}

fn parse_object(value: Value) -> Result<ManifestObject> {
    let kind = value
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VerifyError::Manifest("Missing kind".to_string()))?;
    let api_version = value
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VerifyError::Manifest(format!("{} is missing apiVersion", kind)))?;
    let name = value
        .pointer("/metadata/name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VerifyError::Manifest(format!("{} is missing metadata.name", kind)))?;
    let namespace = value
        .pointer("/metadata/namespace")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    };

    Ok(ManifestObject {
        gvk: GroupVersionKind {
            group,
            version,
            kind: kind.to_string(),
        },
        name: name.to_string(),
        namespace,
        body: value.clone(),
    })
}

#[derive(Debug, Clone)]
struct ResolvedObject {
    resource: ApiResource,
    namespace: Option<String>,
    name: String,
    body: Value,
}

impl ResolvedObject {
    fn api(&self, client: &Client) -> Api<DynamicObject> {
        match &self.namespace {
            Some(ns) => Api::namespaced_with(client.clone(), ns, &self.resource),
            None => Api::all_with(client.clone(), &self.resource),
        }
    }
}

/// A manifest bound to a cluster, ready to apply or delete
#[derive(Clone)]
pub struct ResolvedManifest {
    client: Client,
    objects: Vec<ResolvedObject>,
}

impl ResolvedManifest {
    /// Server-side apply every object in document order
    pub async fn apply(&self) -> Result<()> {
        let params = PatchParams::apply(FIELD_MANAGER).force();

        for object in &self.objects {
            object
                .api(&self.client)
                .patch(&object.name, &params, &Patch::Apply(&object.body))
                .await?;
            debug!(kind = %object.resource.kind, name = %object.name, "Applied object");
        }

        info!("Applied {} object(s)", self.objects.len());
        Ok(())
    }

    /// Delete every object in reverse document order, ignoring ones already gone
    pub async fn delete(&self) -> Result<()> {
        for object in self.objects.iter().rev() {
            match object
                .api(&self.client)
                .delete(&object.name, &DeleteParams::default())
                .await
            {
                Ok(_) => debug!(kind = %object.resource.kind, name = %object.name, "Deleted object"),
                Err(kube::Error::Api(err)) if err.code == 404 => {
                    debug!(kind = %object.resource.kind, name = %object.name, "Object already gone")
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Deleted {} object(s)", self.objects.len());
        Ok(())
    }
}
