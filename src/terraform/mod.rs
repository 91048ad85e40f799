// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading the results of a Terraform deployment.

pub mod outputs;

pub use outputs::DeploymentOutputs;
