// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::ResourceExt;
use std::fmt;

/// Workload kind a vcluster was found through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Deployment,
    StatefulSet,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Deployment => write!(f, "Deployment"),
            SourceKind::StatefulSet => write!(f, "StatefulSet"),
        }
    }
}

/// A vcluster running in the host cluster.
///
/// Identity is `(name, namespace)`. `source_kind` and `desired_replicas`
/// only record which workload it was discovered through.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instance {
    pub name: String,
    pub namespace: String,
    pub source_kind: SourceKind,
    pub desired_replicas: i32,
}

/// A workload observed with the vcluster labels, before deduplication
pub type Candidate = Instance;

impl Instance {
    pub fn identity(&self) -> (&str, &str) {
        (&self.name, &self.namespace)
    }

    /// A StatefulSet scaled to zero, typically left behind by a redeploy
    pub fn is_scaled_down_statefulset(&self) -> bool {
        self.source_kind == SourceKind::StatefulSet && self.desired_replicas == 0
    }

    /// Unset replica counts fall back to the Kubernetes default of 1
    pub fn from_deployment(deployment: &Deployment) -> Self {
        Self {
            name: deployment.name_any(),
            namespace: deployment.namespace().unwrap_or_default(),
            source_kind: SourceKind::Deployment,
            desired_replicas: deployment
                .spec
                .as_ref()
                .and_then(|s| s.replicas)
                .unwrap_or(1),
        }
    }

    pub fn from_statefulset(statefulset: &StatefulSet) -> Self {
        Self {
            name: statefulset.name_any(),
            namespace: statefulset.namespace().unwrap_or_default(),
            source_kind: SourceKind::StatefulSet,
            desired_replicas: statefulset
                .spec
                .as_ref()
                .and_then(|s| s.replicas)
                .unwrap_or(1),
        }
    }
}

/// Discovery outcome for one `(name, namespace)` identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Unique(Instance),
    /// Several live workloads claim the same identity; the caller has to pick
    Ambiguous(Vec<Instance>),
}

impl Resolution {
    pub fn name(&self) -> &str {
        match self {
            Resolution::Unique(i) => &i.name,
            Resolution::Ambiguous(all) => all.first().map(|i| i.name.as_str()).unwrap_or_default(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Resolution::Unique(i) => &i.namespace,
            Resolution::Ambiguous(all) => {
                all.first().map(|i| i.namespace.as_str()).unwrap_or_default()
            }
        }
    }

    pub fn instances(&self) -> &[Instance] {
        match self {
            Resolution::Unique(i) => std::slice::from_ref(i),
            Resolution::Ambiguous(all) => all,
        }
    }
}
