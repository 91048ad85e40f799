// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Node listing and node pool membership

use crate::error::Result;
use k8s_openapi::api::core::v1::Node;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, info, instrument};

/// List all nodes in the cluster
#[instrument(skip(client))]
pub async fn list_nodes(client: &Client) -> Result<Vec<Node>> {
    let nodes: Api<Node> = Api::all(client.clone());
    let node_list = nodes.list(&ListParams::default()).await?;

    info!("Found {} node(s)", node_list.items.len());
    for node in &node_list.items {
        debug!("Node: {}", node.name_any());
    }

    Ok(node_list.items)
}

/// Count nodes whose name contains the node pool marker
pub fn count_pool_nodes(nodes: &[Node], marker: &str) -> usize {
    nodes
        .iter()
        .filter(|n| n.name_any().contains(marker))
        .count()
}

/// First address of the given type (e.g. "ExternalIP") across nodes
pub fn first_node_address(nodes: &[Node], address_type: &str) -> Option<String> {
    nodes
        .iter()
        .filter_map(|n| n.status.as_ref())
        .filter_map(|s| s.addresses.as_ref())
        .flatten()
        .find(|a| a.type_ == address_type)
        .map(|a| a.address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{node_list_json, MockService};
    use kube::api::ObjectMeta;

    fn make_node(name: &str) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_count_pool_nodes_exact() {
        let nodes = vec![
            make_node("aks-default-35749218-vmss000000"),
            make_node("aks-default-35749218-vmss000001"),
            make_node("aks-user-12345678-vmss000000"),
        ];

        assert_eq!(count_pool_nodes(&nodes, "aks-default"), 2);
    }

    #[test]
    fn test_count_pool_nodes_all_matching() {
        let nodes = vec![
            make_node("aks-default-35749218-vmss000000"),
            make_node("aks-default-35749218-vmss000001"),
            make_node("aks-default-35749218-vmss000002"),
        ];

        assert_eq!(count_pool_nodes(&nodes, "aks-default"), 3);
    }

    #[test]
    fn test_count_pool_nodes_empty() {
        assert_eq!(count_pool_nodes(&[], "aks-default"), 0);
    }

    #[test]
    fn test_first_node_address() {
        let list: serde_json::Value = serde_json::from_str(&node_list_json(&["aks-default-0"])).unwrap();
        let nodes: Vec<Node> = serde_json::from_value(list["items"].clone()).unwrap();

        assert_eq!(first_node_address(&nodes, "ExternalIP").as_deref(), Some("20.1.2.3"));
        assert_eq!(first_node_address(&nodes, "Hostname"), None);
    }

    #[tokio::test]
    async fn test_list_nodes() {
        let client = MockService::new()
            .on_get(
                "/api/v1/nodes",
                200,
                &node_list_json(&["aks-default-1", "aks-default-2"]),
            )
            .into_client();

        let nodes = list_nodes(&client).await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name_any(), "aks-default-1");
    }
}
