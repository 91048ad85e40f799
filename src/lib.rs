// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod azure;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubeconfig;
pub mod kubernetes;
pub mod scenario;
pub mod terraform;
pub mod verify;

#[cfg(test)]
pub mod test_utils;
