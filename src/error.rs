// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Terraform error: {0}")]
    Terraform(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("{what} not satisfied after {attempts} attempts: {last_error}")]
    RetryExhausted {
        what: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
