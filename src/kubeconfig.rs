// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig parsing, temporary materialization and client creation

use crate::error::{Result, VerifyError};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Parse a kubeconfig blob that must describe at least one cluster
pub fn parse(raw: &[u8]) -> Result<Kubeconfig> {
    let kubeconfig: Kubeconfig = serde_yaml::from_slice(raw)
        .map_err(|e| VerifyError::Kubeconfig(format!("Unable to unmarshal: {}", e)))?;

    if kubeconfig.clusters.is_empty() {
        return Err(VerifyError::Kubeconfig(
            "Kubeconfig contains no cluster entries".to_string(),
        ));
    }

    Ok(kubeconfig)
}

/// Server URL of the first cluster entry
pub fn first_server(kubeconfig: &Kubeconfig) -> Result<&str> {
    let first = kubeconfig.clusters.first().ok_or_else(|| {
        VerifyError::Kubeconfig("Kubeconfig contains no cluster entries".to_string())
    })?;

    first
        .cluster
        .as_ref()
        .and_then(|c| c.server.as_deref())
        .ok_or_else(|| {
            VerifyError::Kubeconfig(format!("Cluster entry '{}' has no server URL", first.name))
        })
}

/// Create a Kubernetes client from a parsed kubeconfig
pub async fn client_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| VerifyError::Kubeconfig(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| VerifyError::Kubeconfig(format!("Failed to create client: {}", e)))
}

/// A kubeconfig written to disk for the duration of a test.
///
/// The file is removed by [`TempKubeconfig::release`], or on drop if the
/// guard is never released.
#[derive(Debug)]
pub struct TempKubeconfig {
    path: Option<PathBuf>,
}

impl TempKubeconfig {
    /// Write the raw kubeconfig verbatim with owner-only permissions
    #[instrument(skip(raw))]
    pub fn write(path: &Path, raw: &[u8]) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        // An existing file keeps its old mode, so tighten it explicitly
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(raw)?;
        file.sync_all()?;

        info!("Wrote temporary kubeconfig to {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Read the materialized file back the way an external tool would
    pub fn load(&self) -> Result<Kubeconfig> {
        Kubeconfig::read_from(self.path())
            .map_err(|e| VerifyError::Kubeconfig(format!("Failed to read {}: {}", self.path().display(), e)))
    }

    /// Remove the file, reporting any failure
    pub fn release(mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => {
                std::fs::remove_file(&path).map_err(|e| {
                    VerifyError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Unable to remove kubeconfig file {}: {}", path.display(), e),
                    ))
                })?;
                debug!("Removed temporary kubeconfig {}", path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for TempKubeconfig {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Unable to remove kubeconfig file {}: {}", path.display(), e);
            }
        }
    }
}
