// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment scenarios and the suites each one runs

use crate::azure::ManagedClustersClient;
use crate::constants::scenario;
use crate::error::Result;
use crate::terraform::DeploymentOutputs;
use crate::verify::{run_identity_suite, Report, SmokeTestRunner};
use std::fmt;
use std::path::Path;
use tracing::{error, info};

/// The deployment scenario, selected by the Terraform example folder name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// API server reachable only inside the virtual network
    PrivateCluster,
    /// Publicly reachable API server; the demo workload is deployed too
    PublicCluster,
    /// Any other composition of the module
    Composable,
}

impl Scenario {
    pub fn from_example_dir(dir: &Path) -> Self {
        match dir.file_name().and_then(|n| n.to_str()) {
            Some(scenario::PRIVATE_CLUSTER) => Scenario::PrivateCluster,
            Some(scenario::PUBLIC_CLUSTER) => Scenario::PublicCluster,
            _ => Scenario::Composable,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::PrivateCluster => scenario::PRIVATE_CLUSTER,
            Scenario::PublicCluster => scenario::PUBLIC_CLUSTER,
            Scenario::Composable => "composable",
        }
    }

    /// Only a public cluster can be reached to deploy a workload
    pub fn runs_smoke_suite(&self) -> bool {
        matches!(self, Scenario::PublicCluster)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A suite that either produced a report or aborted with a fatal error
#[derive(Debug)]
pub struct SuiteRun {
    pub name: String,
    pub result: Result<Report>,
}

impl SuiteRun {
    pub fn passed(&self) -> bool {
        self.result.as_ref().is_ok_and(Report::passed)
    }
}

impl fmt::Display for SuiteRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(report) => write!(f, "{}", report),
            Err(e) => writeln!(f, "{}: aborted: {}", self.name, e),
        }
    }
}

/// Run every suite of `scenario`. A fatal error in one suite does not
/// prevent the next one from running.
pub async fn run_scenario(
    scenario: Scenario,
    outputs: &DeploymentOutputs,
    clusters: &ManagedClustersClient,
    smoke: &SmokeTestRunner,
) -> Vec<SuiteRun> {
    let mut runs = Vec::new();

    let name = format!("{}/identity", scenario);
    info!("Running suite {}", name);
    let result = run_identity_suite(&name, outputs, clusters).await;
    runs.push(finish(name, result));

    if scenario.runs_smoke_suite() {
        let name = format!("{}/smoke", scenario);
        info!("Running suite {}", name);
        let result = smoke.run(&name, outputs).await;
        runs.push(finish(name, result));
    }

    runs
}

fn finish(name: String, result: Result<Report>) -> SuiteRun {
    if let Err(e) = &result {
        error!("Suite {} aborted: {}", name, e);
    }
    SuiteRun { name, result }
}
