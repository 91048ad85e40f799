// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Azure access token acquisition
//!
//! `DefaultCredential` tries, in order: a service principal client secret
//! (when configured), managed identity, and the Azure CLI. The first
//! credential that yields a token is remembered and used from then on.

use crate::config::CredentialConfig;
use crate::constants::arm;
use crate::error::{Result, VerifyError};
use azure_core::credentials::TokenCredential;
use azure_identity::{AzureCliCredential, ClientSecretCredential, ManagedIdentityCredential};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Ordered credential chain for Azure Resource Manager
pub struct DefaultCredential {
    credentials: Vec<(&'static str, Arc<dyn TokenCredential>)>,
    selected: Mutex<Option<usize>>,
}

impl DefaultCredential {
    /// Build the chain from whichever credential inputs are configured.
    ///
    /// Credentials that cannot be constructed in this environment are left
    /// out of the chain.
    pub fn from_config(config: &CredentialConfig) -> Self {
        let mut credentials: Vec<(&'static str, Arc<dyn TokenCredential>)> = Vec::new();

        if let (Some(tenant), Some(client), Some(secret)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) {
            match ClientSecretCredential::new(tenant, client.to_string(), secret.to_string().into(), None) {
                Ok(credential) => credentials.push(("client secret", credential as Arc<dyn TokenCredential>)),
                Err(e) => warn!("Client secret credential unavailable: {}", e),
            }
        }

        match ManagedIdentityCredential::new(None) {
            Ok(credential) => credentials.push(("managed identity", credential as Arc<dyn TokenCredential>)),
            Err(e) => debug!("Managed identity credential unavailable: {}", e),
        }

        match AzureCliCredential::new(None) {
            Ok(credential) => credentials.push(("Azure CLI", credential as Arc<dyn TokenCredential>)),
            Err(e) => debug!("Azure CLI credential unavailable: {}", e),
        }

        Self::with_credentials(credentials)
    }

    pub fn with_credentials(credentials: Vec<(&'static str, Arc<dyn TokenCredential>)>) -> Self {
        Self {
            credentials,
            selected: Mutex::new(None),
        }
    }

    /// Return a bearer token for ARM.
    ///
    /// Token caching is left to the individual credentials.
    #[instrument(skip(self))]
    pub async fn bearer(&self) -> Result<String> {
        let mut selected = self.selected.lock().await;

        if let Some(index) = *selected {
            let (name, credential) = &self.credentials[index];
            return request_token(credential.as_ref())
                .await
                .map_err(|e| VerifyError::Authentication(format!("{}: {}", name, e)));
        }

        let mut failures = Vec::new();
        for (index, (name, credential)) in self.credentials.iter().enumerate() {
            match request_token(credential.as_ref()).await {
                Ok(token) => {
                    info!("Authenticated to Azure using {} credential", name);
                    *selected = Some(index);
                    return Ok(token);
                }
                Err(e) => {
                    debug!("{} credential unavailable: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        warn!("No Azure credential in the chain produced a token");
        Err(VerifyError::Authentication(format!(
            "Unable to get credentials: {}",
            failures.join("; ")
        )))
    }
}

async fn request_token(credential: &dyn TokenCredential) -> azure_core::Result<String> {
    let token = credential.get_token(&[arm::SCOPE], None).await?;
    Ok(token.token.secret().to_string())
}

/// Fixed token, for tests against mocked ARM endpoints
#[cfg(test)]
#[derive(Debug)]
pub struct StaticToken(pub String);

#[cfg(test)]
impl StaticToken {
    pub fn credential(token: &str) -> DefaultCredential {
        let credential: Arc<dyn TokenCredential> = Arc::new(StaticToken(token.to_string()));
        DefaultCredential::with_credentials(vec![("static", credential)])
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl TokenCredential for StaticToken {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<azure_core::credentials::TokenRequestOptions>,
    ) -> azure_core::Result<azure_core::credentials::AccessToken> {
        Ok(azure_core::credentials::AccessToken::new(
            self.0.clone(),
            azure_core::date::OffsetDateTime::now_utc() + std::time::Duration::from_secs(3600),
        ))
    }
}
