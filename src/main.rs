// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use aks_verify::azure::{DefaultCredential, ManagedClustersClient};
use aks_verify::config::Config;
use aks_verify::scenario::{run_scenario, Scenario};
use aks_verify::terraform::DeploymentOutputs;
use aks_verify::verify::SmokeTestRunner;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<bool> {
    info!("Starting AKS deployment verification");

    // Load configuration
    let config = Config::from_env()?;
    let scenario = Scenario::from_example_dir(&config.example_dir);
    info!(
        "Configuration loaded: scenario={}, example_dir={}, var_file={}",
        scenario,
        config.example_dir.display(),
        config.var_file
    );

    let outputs = DeploymentOutputs::load(&config.terraform_bin, &config.example_dir)
        .await
        .context("Unable to read deployment outputs")?;
    info!("Read {} deployment output(s)", outputs.len());

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .connect_timeout(config.smoke.request_timeout)
        .build()
        .context("Unable to create HTTP client")?;
    let credential = DefaultCredential::from_config(&config.credentials);
    let clusters = ManagedClustersClient::new(
        config.arm_endpoint.clone(),
        &config.subscription_id,
        credential,
        http.clone(),
    );
    let smoke = SmokeTestRunner::new(config.smoke.clone(), http);

    let runs = run_scenario(scenario, &outputs, &clusters, &smoke).await;

    let mut passed = true;
    for run in &runs {
        print!("{}", run);
        passed &= run.passed();
    }

    if passed {
        info!("All suites passed");
    } else {
        error!("Verification failed");
    }
    Ok(passed)
}
