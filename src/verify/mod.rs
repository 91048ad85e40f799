// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Verification suites and the machinery they share.

pub mod cleanup;
pub mod cluster;
pub mod poll;
pub mod report;
pub mod smoke;

pub use cluster::{run_identity_suite, verify_cluster, ClusterExpectation};
pub use report::{CheckResult, Outcome, Report};
pub use smoke::SmokeTestRunner;
