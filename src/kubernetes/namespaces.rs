// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ephemeral namespace management

use crate::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument, warn};

/// Create a namespace, reusing it if it already exists.
///
/// Returns `true` only when this call created the namespace.
#[instrument(skip(client))]
pub async fn create_namespace(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            info!("Namespace {} created successfully", namespace);
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            warn!("Namespace {} already exists, reusing it", namespace);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a namespace; a namespace that is already gone is not an error
#[instrument(skip(client))]
pub async fn delete_namespace(client: &Client, namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(namespace, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Namespace {} deleted", namespace);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Namespace {} already deleted", namespace);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
