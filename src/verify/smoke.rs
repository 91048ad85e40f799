// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload smoke test for publicly reachable clusters

use crate::config::SmokeConfig;
use crate::constants::{outputs, smoke};
use crate::error::Result;
use crate::kubeconfig::{client_from_kubeconfig, TempKubeconfig};
use crate::kubernetes::{
    count_pool_nodes, create_namespace, delete_namespace, get_deployment, list_nodes,
    service_endpoint, wait_until_service_available, Manifest, ResolvedManifest,
};
use crate::terraform::DeploymentOutputs;
use crate::verify::cleanup::CleanupStack;
use crate::verify::poll::Poller;
use crate::verify::report::{assert_equal, Report};
use futures::FutureExt;
use kube::{Client, ResourceExt};
use std::panic::{resume_unwind, AssertUnwindSafe};
use tracing::{error, info, instrument};

pub const CHECK_DEFAULT_NODE_POOL_NODES: &str = "default_node_pool_nodes";
pub const CHECK_K8S_SERVICE: &str = "k8s_service";
pub const CHECK_TEARDOWN: &str = "teardown";

/// Deploys the demo workload and probes it over HTTP
pub struct SmokeTestRunner {
    config: SmokeConfig,
    http: reqwest::Client,
}

impl SmokeTestRunner {
    pub fn new(config: SmokeConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn poller(&self) -> Poller {
        Poller::new(self.config.retries, self.config.retry_interval)
    }

    /// Materialize the deployment's kubeconfig and run the smoke checks
    /// against the cluster it points to.
    ///
    /// The kubeconfig file is removed on every exit path, after the
    /// in-cluster resources are gone.
    #[instrument(skip(self, outputs))]
    pub async fn run(&self, suite: &str, outputs: &DeploymentOutputs) -> Result<Report> {
        let raw = outputs.require(outputs::KUBE_CONFIG_RAW)?;
        let kubeconfig_file = TempKubeconfig::write(&self.config.kubeconfig_path, raw.as_bytes())?;

        let result = async {
            let client = client_from_kubeconfig(kubeconfig_file.load()?).await?;
            self.run_with_client(suite, &client).await
        }
        .await;

        finish_report(result, kubeconfig_file.release())
    }

    /// Run the smoke checks with an existing client inside an ephemeral namespace
    pub async fn run_with_client(&self, suite: &str, client: &Client) -> Result<Report> {
        let namespace = &self.config.namespace;
        let mut report = Report::new(suite);
        let mut cleanup = CleanupStack::new();

        // A namespace that already existed is left in place
        if create_namespace(client, namespace).await? {
            let client = client.clone();
            let namespace = namespace.clone();
            cleanup.defer(format!("namespace {}", namespace), async move {
                delete_namespace(&client, &namespace).await
            });
        }

        let checks = AssertUnwindSafe(async {
            report.record(CHECK_DEFAULT_NODE_POOL_NODES, self.check_nodes(client).await);
            report.record(CHECK_K8S_SERVICE, self.check_service(client).await);
        })
        .catch_unwind()
        .await;

        let cleaned = cleanup.unwind().await;
        if let Err(panic) = checks {
            if let Err(e) = cleaned {
                error!("{}", e);
            }
            resume_unwind(panic);
        }

        finish_report(Ok(report), cleaned)
    }

    async fn check_nodes(&self, client: &Client) -> Result<()> {
        let nodes = list_nodes(client).await?;
        let count = count_pool_nodes(&nodes, &self.config.node_pool_marker);
        info!(
            "Found {} node(s) matching '{}' out of {}",
            count,
            self.config.node_pool_marker,
            nodes.len()
        );

        assert_equal(
            self.config.expected_node_count,
            count,
            "Node pool size must match",
        )
    }

    async fn check_service(&self, client: &Client) -> Result<()> {
        let manifest = Manifest::from_file(&self.config.manifest_path).await?;
        let resolved = manifest.resolve(client, &self.config.namespace).await?;

        // Registered before apply so a partially applied manifest is removed too
        let mut cleanup = CleanupStack::new();
        {
            let resolved = resolved.clone();
            cleanup.defer(
                format!("manifest {}", self.config.manifest_path.display()),
                async move { resolved.delete().await },
            );
        }

        let result = AssertUnwindSafe(self.exercise_service(client, &resolved))
            .catch_unwind()
            .await;

        let cleaned = cleanup.unwind().await;
        match result {
            Ok(result) => settle(result, cleaned),
            Err(panic) => {
                if let Err(e) = cleaned {
                    error!("{}", e);
                }
                resume_unwind(panic)
            }
        }
    }

    async fn exercise_service(&self, client: &Client, resolved: &ResolvedManifest) -> Result<()> {
        let namespace = &self.config.namespace;
        let name = &self.config.service_name;
        let poller = self.poller();

        resolved.apply().await?;

        let service = wait_until_service_available(client, namespace, name, &poller).await?;

        let deployment = get_deployment(client, namespace, name).await?;
        assert_equal(
            name.as_str(),
            deployment.name_any().as_str(),
            "Deployment name must match",
        )?;

        let endpoint = service_endpoint(client, &service, self.config.service_port).await?;
        info!("Service endpoint: {}", endpoint);

        self.check_http(endpoint.http_url()?.as_str()).await
    }

    /// Poll `url` until it answers 200 with a body containing the response marker
    #[instrument(skip(self))]
    pub async fn check_http(&self, url: &str) -> Result<()> {
        let http = &self.http;
        let timeout = self.config.request_timeout;
        let what = format!("GET {}", url);

        self.poller()
            .run(&what, move || async move {
                let response = http
                    .get(url)
                    .timeout(timeout)
                    .send()
                    .await
                    .map_err(|e| e.to_string())?;
                let status = response.status();
                let body = response.text().await.map_err(|e| e.to_string())?;

                if status != reqwest::StatusCode::OK {
                    return Err(format!("unexpected status {}", status));
                }
                if !body.contains(smoke::RESPONSE_MARKER) {
                    return Err(format!(
                        "response body does not contain '{}'",
                        smoke::RESPONSE_MARKER
                    ));
                }
                Ok(())
            })
            .await?;

        info!("{} returned the expected response", url);
        Ok(())
    }
}

/// A teardown failure after a completed run becomes a failed check, so the
/// checks that did run are still reported
fn finish_report(result: Result<Report>, cleanup: Result<()>) -> Result<Report> {
    match result {
        Ok(mut report) => {
            if cleanup.is_err() {
                report.record(CHECK_TEARDOWN, cleanup);
            }
            Ok(report)
        }
        Err(e) => {
            if let Err(cleanup) = cleanup {
                error!("{}", cleanup);
            }
            Err(e)
        }
    }
}

/// Keep the primary error; a cleanup error only surfaces when nothing else failed
fn settle<T>(result: Result<T>, cleanup: Result<()>) -> Result<T> {
    match (result, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            error!("{}", cleanup);
            Err(e)
        }
    }
}
