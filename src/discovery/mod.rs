// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finding vclusters in the host cluster and collapsing duplicate workloads.

pub mod dedup;
pub mod matcher;

pub use dedup::{dedupe, resolve};
pub use matcher::{find_candidates, instance_selector};

use crate::error::{Result, VclusterError};
use crate::types::{Instance, Resolution};
use kube::Client;
use tracing::{info, instrument, warn};

/// Find every vcluster called `name` within `namespace` (empty for all namespaces)
#[instrument(skip(client))]
pub async fn find_instances(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<Vec<Resolution>> {
    let candidates = find_candidates(client, name, namespace).await?;
    let resolutions = resolve(dedupe(candidates));

    info!("Found {} vcluster(s) named '{}'", resolutions.len(), name);
    Ok(resolutions)
}

/// Pick the single vcluster to connect to.
///
/// Several identities ask the user for a namespace. One identity backed by
/// several live workloads cannot be resolved by a namespace and is reported
/// as such.
pub fn select_instance(
    mut resolutions: Vec<Resolution>,
    name: &str,
    namespace: &str,
) -> Result<Instance> {
    match resolutions.len() {
        0 => Err(VclusterError::NotFound {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }),
        1 => match resolutions.remove(0) {
            Resolution::Unique(instance) => Ok(instance),
            Resolution::Ambiguous(all) => {
                for instance in &all {
                    warn!(
                        "vcluster {}/{} backed by {} with {} replica(s)",
                        instance.namespace,
                        instance.name,
                        instance.source_kind,
                        instance.desired_replicas
                    );
                }
                Err(VclusterError::DuplicateWorkloads {
                    name: name.to_string(),
                    namespace: all
                        .first()
                        .map(|i| i.namespace.clone())
                        .unwrap_or_else(|| namespace.to_string()),
                    workloads: all.iter().map(|i| i.source_kind.to_string()).collect(),
                })
            }
        },
        _ => Err(VclusterError::Ambiguous {
            name: name.to_string(),
            namespaces: resolutions.iter().map(|r| r.namespace().to_string()).collect(),
        }),
    }
}
