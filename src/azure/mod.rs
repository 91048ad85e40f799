// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Azure Resource Manager access: credentials and managed cluster lookup.

pub mod credential;
pub mod managed_clusters;

pub use credential::DefaultCredential;
pub use managed_clusters::{ClusterDescriptor, CredentialResult, ManagedCluster, ManagedClustersClient};
