// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading the kubeconfig a vcluster publishes in its host namespace

use crate::constants::credentials::{DATA_KEY, SECRET_PREFIX};
use crate::error::{Result, VclusterError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::config::Kubeconfig;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Source of the access credentials of a vcluster.
///
/// Implementations return [`VclusterError::CredentialNotReady`] while the
/// credentials do not exist yet; any other error is final.
#[async_trait]
pub trait CredentialFetcher: Send + Sync {
    async fn fetch(&self, name: &str, namespace: &str) -> Result<Kubeconfig>;
}

/// Name of the Secret holding the kubeconfig of vcluster `name`
pub fn credential_secret_name(name: &str) -> String {
    format!("{}{}", SECRET_PREFIX, name)
}

/// Reads the kubeconfig Secret the vcluster syncer writes on startup
#[derive(Clone)]
pub struct SecretCredentialFetcher {
    client: Client,
}

impl SecretCredentialFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialFetcher for SecretCredentialFetcher {
    #[instrument(skip(self), fields(vcluster = %name))]
    async fn fetch(&self, name: &str, namespace: &str) -> Result<Kubeconfig> {
        let secret_name = credential_secret_name(name);
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        debug!("Getting kubeconfig secret '{}/{}'", namespace, secret_name);

        let secret = match secrets.get(&secret_name).await {
            Ok(secret) => secret,
            Err(kube::Error::Api(err)) if err.code == 404 => {
                return Err(VclusterError::CredentialNotReady(format!(
                    "secret {}/{} does not exist",
                    namespace, secret_name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(data) = secret.data.as_ref().and_then(|d| d.get(DATA_KEY)) else {
            return Err(VclusterError::CredentialNotReady(format!(
                "secret {}/{} does not contain '{}' key",
                namespace, secret_name, DATA_KEY
            )));
        };

        let raw = std::str::from_utf8(&data.0).map_err(|e| {
            VclusterError::Credential(format!(
                "Failed to decode kubeconfig of vcluster {}: {}",
                name, e
            ))
        })?;

        Kubeconfig::from_yaml(raw).map_err(|e| {
            VclusterError::Credential(format!(
                "Failed to parse kubeconfig of vcluster {}: {}",
                name, e
            ))
        })
    }
}
