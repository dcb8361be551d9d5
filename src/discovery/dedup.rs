// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Collapsing workloads that describe the same vcluster

use crate::types::{Candidate, Instance, Resolution, SourceKind};
use std::collections::BTreeMap;

/// Group candidates by `(name, namespace)` while keeping discovery order
fn group_by_identity(candidates: Vec<Candidate>) -> BTreeMap<(String, String), Vec<Candidate>> {
    let mut groups: BTreeMap<(String, String), Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry((candidate.namespace.clone(), candidate.name.clone()))
            .or_default()
            .push(candidate);
    }
    groups
}

/// A scaled down StatefulSet is a leftover when a live workload shares its identity
fn drop_scaled_down_remnant(group: Vec<Candidate>) -> Vec<Candidate> {
    let remnants = group.iter().filter(|c| c.is_scaled_down_statefulset()).count();
    let live = group.iter().any(|c| match c.source_kind {
        SourceKind::Deployment => true,
        SourceKind::StatefulSet => c.desired_replicas >= 1,
    });

    if remnants == 1 && live {
        group
            .into_iter()
            .filter(|c| !c.is_scaled_down_statefulset())
            .collect()
    } else {
        group
    }
}

/// Collapse candidates into instances.
///
/// Within one identity, a single StatefulSet scaled to zero is dropped if a
/// Deployment or a running StatefulSet exists next to it. Everything else is
/// kept, so two live workloads for one identity yield two instances.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Instance> {
    group_by_identity(candidates)
        .into_values()
        .flat_map(drop_scaled_down_remnant)
        .collect()
}

/// Turn deduplicated instances into one [`Resolution`] per identity
pub fn resolve(instances: Vec<Instance>) -> Vec<Resolution> {
    group_by_identity(instances)
        .into_values()
        .filter_map(|mut group| match group.len() {
            0 => None,
            1 => group.pop().map(Resolution::Unique),
            _ => Some(Resolution::Ambiguous(group)),
        })
        .collect()
}
