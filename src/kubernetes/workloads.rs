// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment and service lookups for the demo workload

use crate::error::{Result, VerifyError};
use crate::kubernetes::nodes::{first_node_address, list_nodes};
use crate::verify::poll::Poller;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client, ResourceExt};
use std::fmt;
use std::net::IpAddr;
use tracing::{info, instrument};
use url::Url;

/// Externally reachable address of a service port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: i32,
}

impl ServiceEndpoint {
    /// Plain HTTP URL for the endpoint root
    pub fn http_url(&self) -> Result<Url> {
        Url::parse(&format!("http://{}/", self))
            .map_err(|e| VerifyError::Api(format!("Invalid service endpoint {}: {}", self, e)))
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => write!(f, "[{}]:{}", ip, self.port),
            _ => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

/// Get a deployment by name
#[instrument(skip(client))]
pub async fn get_deployment(client: &Client, namespace: &str, name: &str) -> Result<Deployment> {
    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    Ok(deployments.get(name).await?)
}

/// Get a service by name
#[instrument(skip(client))]
pub async fn get_service(client: &Client, namespace: &str, name: &str) -> Result<Service> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    Ok(services.get(name).await?)
}

/// A LoadBalancer service is available once it has an ingress address;
/// other service types are available as soon as they exist
pub fn is_service_available(service: &Service) -> bool {
    let is_load_balancer = service
        .spec
        .as_ref()
        .and_then(|s| s.type_.as_deref())
        .is_some_and(|t| t == "LoadBalancer");

    !is_load_balancer || load_balancer_address(service).is_some()
}

fn load_balancer_address(service: &Service) -> Option<String> {
    service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .into_iter()
        .flatten()
        .find_map(|i| i.ip.clone().or_else(|| i.hostname.clone()))
}

/// Poll until the service exists and is available
#[instrument(skip(client, poller))]
pub async fn wait_until_service_available(
    client: &Client,
    namespace: &str,
    name: &str,
    poller: &Poller,
) -> Result<Service> {
    let what = format!("service {}/{} available", namespace, name);
    let service = poller
        .run(&what, move || async move {
            let service = get_service(client, namespace, name)
                .await
                .map_err(|e| e.to_string())?;
            if is_service_available(&service) {
                Ok(service)
            } else {
                Err(format!("service {} has no load balancer ingress yet", name))
            }
        })
        .await?;

    info!("Service {}/{} is now available", namespace, name);
    Ok(service)
}

/// Resolve the address for reaching the service from outside the cluster
pub async fn service_endpoint(client: &Client, service: &Service, port: i32) -> Result<ServiceEndpoint> {
    let name = service.name_any();
    let spec = service
        .spec
        .as_ref()
        .ok_or_else(|| VerifyError::Api(format!("Service {} has no spec", name)))?;
    let service_port = spec
        .ports
        .as_ref()
        .into_iter()
        .flatten()
        .find(|p| p.port == port)
        .ok_or_else(|| VerifyError::Api(format!("Service {} does not expose port {}", name, port)))?;

    match spec.type_.as_deref().unwrap_or("ClusterIP") {
        "LoadBalancer" => {
            let host = load_balancer_address(service).ok_or_else(|| {
                VerifyError::Api(format!("Service {} has no load balancer ingress", name))
            })?;
            Ok(ServiceEndpoint {
                host,
                port: service_port.port,
            })
        }
        "NodePort" => {
            let node_port = service_port.node_port.ok_or_else(|| {
                VerifyError::Api(format!("Service {} has no node port for {}", name, port))
            })?;
            let nodes = list_nodes(client).await?;
            let host = first_node_address(&nodes, "ExternalIP")
                .or_else(|| first_node_address(&nodes, "InternalIP"))
                .ok_or_else(|| VerifyError::Api("No node has a reachable address".to_string()))?;
            Ok(ServiceEndpoint {
                host,
                port: node_port,
            })
        }
        _ => {
            let cluster_ip = spec.cluster_ip.as_deref().ok_or_else(|| {
                VerifyError::Api(format!("Service {} has no cluster IP", name))
            })?;
            Ok(ServiceEndpoint {
                host: cluster_ip.to_string(),
                port: service_port.port,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{load_balancer_service_json, node_list_json, MockService};
    use std::time::Duration;

    const SERVICE_PATH: &str = "/api/v1/namespaces/demo/services/aks-helloworld";

    fn service(json: &str) -> Service {
        serde_json::from_str(json).unwrap()
    }

    fn poller(attempts: u32) -> Poller {
        Poller::new(attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_load_balancer_without_ingress_is_unavailable() {
        let svc = service(&load_balancer_service_json("aks-helloworld", "demo", 80, None));
        assert!(!is_service_available(&svc));
    }

    #[test]
    fn test_load_balancer_with_ingress_is_available() {
        let svc = service(&load_balancer_service_json("aks-helloworld", "demo", 80, Some("20.9.8.7")));
        assert!(is_service_available(&svc));
    }

    #[test]
    fn test_cluster_ip_service_is_available() {
        let svc = service(
            &serde_json::json!({
                "apiVersion": "v1",
                "kind": "Service",
                "metadata": { "name": "internal" },
                "spec": { "type": "ClusterIP", "clusterIP": "10.0.0.5", "ports": [{ "port": 80 }] }
            })
            .to_string(),
        );
        assert!(is_service_available(&svc));
    }

    #[tokio::test]
    async fn test_load_balancer_endpoint() {
        let client = MockService::new().into_client();
        let svc = service(&load_balancer_service_json("aks-helloworld", "demo", 80, Some("20.9.8.7")));

        let endpoint = service_endpoint(&client, &svc, 80).await.unwrap();
        assert_eq!(endpoint.to_string(), "20.9.8.7:80");
        assert_eq!(endpoint.http_url().unwrap().as_str(), "http://20.9.8.7/");
    }

    #[tokio::test]
    async fn test_ipv6_load_balancer_endpoint() {
        let client = MockService::new().into_client();
        let svc = service(&load_balancer_service_json("aks-helloworld", "demo", 8080, Some("2001:db8::1")));

        let endpoint = service_endpoint(&client, &svc, 8080).await.unwrap();
        assert_eq!(endpoint.to_string(), "[2001:db8::1]:8080");
        assert_eq!(endpoint.http_url().unwrap().as_str(), "http://[2001:db8::1]:8080/");
    }

    #[test]
    fn test_hostname_endpoint_url() {
        let endpoint = ServiceEndpoint {
            host: "aks-helloworld.eastus.cloudapp.azure.com".to_string(),
            port: 8080,
        };
        assert_eq!(
            endpoint.http_url().unwrap().as_str(),
            "http://aks-helloworld.eastus.cloudapp.azure.com:8080/"
        );
    }

    #[tokio::test]
    async fn test_endpoint_unknown_port() {
        let client = MockService::new().into_client();
        let svc = service(&load_balancer_service_json("aks-helloworld", "demo", 80, Some("20.9.8.7")));

        assert!(service_endpoint(&client, &svc, 8080).await.is_err());
    }

    #[tokio::test]
    async fn test_node_port_endpoint_uses_node_address() {
        let client = MockService::new()
            .on_get("/api/v1/nodes", 200, &node_list_json(&["aks-default-0"]))
            .into_client();
        let svc = service(
            &serde_json::json!({
                "apiVersion": "v1",
                "kind": "Service",
                "metadata": { "name": "np" },
                "spec": { "type": "NodePort", "ports": [{ "port": 80, "nodePort": 30080 }] }
            })
            .to_string(),
        );

        assert_eq!(
            service_endpoint(&client, &svc, 80).await.unwrap(),
            ServiceEndpoint {
                host: "20.1.2.3".to_string(),
                port: 30080
            }
        );
    }

    #[tokio::test]
    async fn test_wait_until_service_available() {
        let client = MockService::new()
            .on_get(
                SERVICE_PATH,
                200,
                &load_balancer_service_json("aks-helloworld", "demo", 80, Some("20.9.8.7")),
            )
            .into_client();

        let svc = wait_until_service_available(&client, "demo", "aks-helloworld", &poller(3))
            .await
            .unwrap();
        assert_eq!(svc.name_any(), "aks-helloworld");
    }

    #[tokio::test]
    async fn test_wait_until_service_available_exhausts_budget() {
        let mock = MockService::new().on_get(
            SERVICE_PATH,
            200,
            &load_balancer_service_json("aks-helloworld", "demo", 80, None),
        );
        let client = mock.clone().into_client();

        let err = wait_until_service_available(&client, "demo", "aks-helloworld", &poller(3))
            .await
            .unwrap_err();

        assert!(matches!(err, VerifyError::RetryExhausted { attempts: 3, .. }));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_get_deployment_missing() {
        let client = MockService::new().into_client();
        let err = get_deployment(&client, "demo", "aks-helloworld").await.unwrap_err();
        assert!(matches!(err, VerifyError::Kube(_)));
    }
}
