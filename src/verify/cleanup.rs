// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deferred teardown of resources created during a test

use crate::error::{Result, VerifyError};
use futures::future::BoxFuture;
use std::future::Future;
use tracing::{debug, error, warn};

/// Cleanup actions, executed in reverse registration order by [`CleanupStack::unwind`].
///
/// Register an action right after the resource it releases has been created.
#[derive(Default)]
pub struct CleanupStack {
    actions: Vec<(String, BoxFuture<'static, Result<()>>)>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer `action`; it does not run until the stack is unwound
    pub fn defer<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let name = name.into();
        debug!("Registered cleanup: {}", name);
        self.actions.push((name, Box::pin(action)));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every action, newest first. All actions run even if some fail;
    /// the failures are reported together.
    pub async fn unwind(mut self) -> Result<()> {
        let mut failures = Vec::new();

        while let Some((name, action)) = self.actions.pop() {
            debug!("Running cleanup: {}", name);
            if let Err(e) = action.await {
                error!("Cleanup '{}' failed: {}", name, e);
                failures.push(format!("{}: {}", name, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Cleanup(failures.join("; ")))
        }
    }
}

impl Drop for CleanupStack {
    fn drop(&mut self) {
        if !self.actions.is_empty() {
            warn!(
                "{} cleanup action(s) dropped without running: {}",
                self.actions.len(),
                self.actions
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}
