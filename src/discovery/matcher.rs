// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Listing the workloads that back a named vcluster

use crate::constants::labels;
use crate::error::{Result, VclusterError};
use crate::types::Candidate;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::NamespaceResourceScope;
use kube::{api::ListParams, Api, Client, Resource};
use tracing::{debug, instrument};

/// Label selector matching every object that belongs to vcluster `name`
pub fn instance_selector(name: &str) -> String {
    format!(
        "{}={},{}={}",
        labels::APP,
        labels::APP_VALUE,
        labels::RELEASE,
        name
    )
}

/// An empty namespace selects all namespaces visible to the client
fn scoped_api<K>(client: &Client, namespace: &str) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    <K as Resource>::DynamicType: Default,
{
    if namespace.is_empty() {
        Api::all(client.clone())
    } else {
        Api::namespaced(client.clone(), namespace)
    }
}

/// List the Deployments and StatefulSets labelled as vcluster `name`.
///
/// No match is an empty result. API failures are returned as
/// [`VclusterError::Discovery`] without retrying.
#[instrument(skip(client))]
pub async fn find_candidates(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<Vec<Candidate>> {
    let lp = ListParams::default().labels(&instance_selector(name));

    let deployments: Api<Deployment> = scoped_api(client, namespace);
    let deployments = deployments.list(&lp).await.map_err(VclusterError::Discovery)?;

    let statefulsets: Api<StatefulSet> = scoped_api(client, namespace);
    let statefulsets = statefulsets.list(&lp).await.map_err(VclusterError::Discovery)?;

    debug!(
        "Matched {} deployment(s) and {} statefulset(s)",
        deployments.items.len(),
        statefulsets.items.len()
    );

    Ok(deployments
        .items
        .iter()
        .map(Candidate::from_deployment)
        .chain(statefulsets.items.iter().map(Candidate::from_statefulset))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, status_json, workload_json, MockService};
    use crate::types::SourceKind;
    use serde_json::Value;

    fn mock_workloads(deployments: Vec<Value>, statefulsets: Vec<Value>) -> MockService {
        MockService::new()
            .on_get(
                "/apis/apps/v1/deployments",
                200,
                &list_json("apps/v1", "Deployment", deployments),
            )
            .on_get(
                "/apis/apps/v1/statefulsets",
                200,
                &list_json("apps/v1", "StatefulSet", statefulsets),
            )
    }

    #[test]
    fn test_instance_selector() {
        assert_eq!(instance_selector("my-vcluster"), "app=vcluster,release=my-vcluster");
    }

    #[tokio::test]
    async fn test_find_candidates_none() {
        let client = mock_workloads(vec![], vec![]).into_client();

        let candidates = find_candidates(&client, "my-vcluster", "").await.unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_find_candidates_both_kinds() {
        let client = mock_workloads(
            vec![workload_json("Deployment", "my-vcluster", "my-vcluster-ns", None)],
            vec![workload_json("StatefulSet", "my-vcluster", "my-vcluster-ns", Some(0))],
        )
        .into_client();

        let candidates = find_candidates(&client, "my-vcluster", "").await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].source_kind, SourceKind::Deployment);
        assert_eq!(candidates[0].desired_replicas, 1);
        assert_eq!(candidates[1].source_kind, SourceKind::StatefulSet);
        assert_eq!(candidates[1].desired_replicas, 0);
        assert!(candidates
            .iter()
            .all(|c| c.identity() == ("my-vcluster", "my-vcluster-ns")));
    }

    #[tokio::test]
    async fn test_find_candidates_list_error() {
        let client = MockService::new()
            .on_get(
                "/apis/apps/v1/deployments",
                500,
                &status_json(500, "InternalError", "etcd unavailable"),
            )
            .into_client();

        let err = find_candidates(&client, "my-vcluster", "").await.unwrap_err();

        assert!(matches!(err, VclusterError::Discovery(_)));
    }
}
