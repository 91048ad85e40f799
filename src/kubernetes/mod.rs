// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for namespaces, manifests, nodes and workloads.

pub mod manifest;
pub mod namespaces;
pub mod nodes;
pub mod workloads;

pub use manifest::{Manifest, ResolvedManifest};
pub use namespaces::{create_namespace, delete_namespace};
pub use nodes::{count_pool_nodes, list_nodes};
pub use workloads::{get_deployment, service_endpoint, wait_until_service_available, ServiceEndpoint};
