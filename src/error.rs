// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VclusterError {
    #[error("Failed to list vcluster workloads: {0}")]
    Discovery(#[source] kube::Error),

    #[error(
        "Found multiple vclusters named '{name}' in namespaces [{}], please specify a namespace",
        .namespaces.join(", ")
    )]
    Ambiguous { name: String, namespaces: Vec<String> },

    #[error(
        "vcluster {namespace}/{name} is backed by several live workloads ({}), remove the stale one",
        .workloads.join(", ")
    )]
    DuplicateWorkloads {
        name: String,
        namespace: String,
        workloads: Vec<String>,
    },

    #[error("Couldn't find vcluster '{name}'{}", in_namespace(.namespace))]
    NotFound { name: String, namespace: String },

    #[error(
        "Timed out waiting for vcluster {namespace}/{name} (last pod status: {})",
        .last_phase.as_deref().unwrap_or("no pods")
    )]
    WaitTimedOut {
        name: String,
        namespace: String,
        last_phase: Option<String>,
    },

    #[error("Aborted waiting for vcluster {namespace}/{name}")]
    WaitAborted { name: String, namespace: String },

    #[error("Kubernetes API error while waiting for vcluster {namespace}/{name}: {source}")]
    FatalApi {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Kubeconfig of vcluster not available yet: {0}")]
    CredentialNotReady(String),

    #[error("Invalid vcluster kubeconfig: {0}")]
    Credential(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn in_namespace(namespace: &str) -> String {
    if namespace.is_empty() {
        String::new()
    } else {
        format!(" in namespace {}", namespace)
    }
}

pub type Result<T> = std::result::Result<T, VclusterError>;
