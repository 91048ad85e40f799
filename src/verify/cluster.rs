// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster identity verification against the live ARM resource

use crate::azure::ManagedClustersClient;
use crate::constants::outputs;
use crate::error::Result;
use crate::kubeconfig;
use crate::terraform::DeploymentOutputs;
use crate::verify::report::{assert_equal, assert_equal_ignore_case, assert_not_empty, Report};
use tracing::{info, instrument};

pub const CHECK_CLUSTER_IS_CREATED: &str = "cluster_is_created";
pub const CHECK_API_SERVER_URL: &str = "api_server_url";
pub const CHECK_CLUSTER_ID: &str = "cluster_id";

/// Expected cluster properties, borrowed from the deployment outputs
#[derive(Debug, Clone, Copy)]
pub struct ClusterExpectation<'a> {
    pub cluster_name: &'a str,
    pub resource_group_name: &'a str,
    pub cluster_id: &'a str,
    pub host: &'a str,
}

impl<'a> ClusterExpectation<'a> {
    pub fn from_outputs(outputs: &'a DeploymentOutputs) -> Result<Self> {
        Ok(Self {
            cluster_name: outputs.get(outputs::CLUSTER_NAME)?,
            resource_group_name: outputs.get(outputs::RESOURCE_GROUP_NAME)?,
            cluster_id: outputs.get(outputs::CLUSTER_ID)?,
            host: outputs.get(outputs::HOST)?,
        })
    }
}

/// Compare expectations against the actual cluster id and API server URL.
///
/// All three checks always run and are reported separately.
pub fn verify_cluster(
    suite: &str,
    expected: &ClusterExpectation<'_>,
    actual_cluster_id: &str,
    actual_server: &str,
) -> Report {
    let mut report = Report::new(suite);

    report.record(
        CHECK_CLUSTER_IS_CREATED,
        assert_not_empty(expected.cluster_name, "Cluster Name must not be empty").and(
            assert_not_empty(
                expected.resource_group_name,
                "Resource Group Name must not be empty",
            ),
        ),
    );

    report.record(
        CHECK_API_SERVER_URL,
        assert_equal(expected.host, actual_server, "FQDN must match"),
    );

    // ARM is not consistent about the casing of the resourceGroups segment
    report.record(
        CHECK_CLUSTER_ID,
        assert_equal_ignore_case(expected.cluster_id, actual_cluster_id, "ID must match"),
    );

    report
}

/// Look the cluster up in ARM and verify its identity.
///
/// Missing outputs, authentication and API failures abort the suite; the
/// checks themselves are recorded in the returned report.
#[instrument(skip(outputs, clusters))]
pub async fn run_identity_suite(
    suite: &str,
    outputs: &DeploymentOutputs,
    clusters: &ManagedClustersClient,
) -> Result<Report> {
    let expected = ClusterExpectation::from_outputs(outputs)?;

    let descriptor = clusters
        .fetch_descriptor(expected.resource_group_name, expected.cluster_name)
        .await?;

    let admin_kubeconfig = kubeconfig::parse(descriptor.admin_kubeconfig()?)?;
    let server = kubeconfig::first_server(&admin_kubeconfig)?;
    info!("Server Name: {}", server);

    Ok(verify_cluster(suite, &expected, &descriptor.id, server))
}
