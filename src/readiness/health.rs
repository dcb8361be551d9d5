// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod status derivation and health classification

use crate::constants::CRITICAL_STATUSES;
use k8s_openapi::api::core::v1::{ContainerStateTerminated, ContainerStatus, Pod};
use std::cmp::Ordering;

/// Health of a vcluster pod at one point in time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Ready,
    Waiting,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodHealth {
    pub classification: Classification,
    /// Display status the classification was derived from
    pub reason: String,
}

impl PodHealth {
    pub fn is_ready(&self) -> bool {
        self.classification == Classification::Ready
    }
}

fn terminated_reason(terminated: &ContainerStateTerminated) -> String {
    match (terminated.reason.as_deref(), terminated.signal) {
        (Some(reason), _) if !reason.is_empty() => reason.to_string(),
        (_, Some(signal)) if signal != 0 => format!("Signal:{}", signal),
        _ => format!("ExitCode:{}", terminated.exit_code),
    }
}

/// Status of the first init container that has not completed, if any
fn init_status(pod: &Pod, statuses: &[ContainerStatus]) -> Option<String> {
    let total = pod
        .spec
        .as_ref()
        .and_then(|s| s.init_containers.as_ref())
        .map_or(statuses.len(), Vec::len);

    for (i, status) in statuses.iter().enumerate() {
        let state = status.state.as_ref();
        let terminated = state.and_then(|s| s.terminated.as_ref());
        let waiting_reason = state
            .and_then(|s| s.waiting.as_ref())
            .and_then(|w| w.reason.as_deref())
            .filter(|r| !r.is_empty() && *r != "PodInitializing");

        let reason = match (terminated, waiting_reason) {
            (Some(t), _) if t.exit_code == 0 => continue,
            (Some(t), _) => format!("Init:{}", terminated_reason(t)),
            (None, Some(reason)) => format!("Init:{}", reason),
            (None, None) => format!("Init:{}/{}", i, total),
        };
        return Some(reason);
    }

    None
}

/// Display status of a pod, as `kubectl get pods` reports it
pub fn pod_status(pod: &Pod) -> String {
    let status = pod.status.as_ref();
    let status_reason = status
        .and_then(|s| s.reason.as_deref())
        .filter(|r| !r.is_empty());

    let mut reason = status_reason
        .or_else(|| status.and_then(|s| s.phase.as_deref()))
        .filter(|r| !r.is_empty())
        .unwrap_or("Pending")
        .to_string();

    let init_statuses = status
        .and_then(|s| s.init_container_statuses.as_deref())
        .unwrap_or_default();

    if let Some(init) = init_status(pod, init_statuses) {
        reason = init;
    } else {
        let mut has_running = false;
        let containers = status
            .and_then(|s| s.container_statuses.as_deref())
            .unwrap_or_default();

        for container in containers.iter().rev() {
            let Some(state) = container.state.as_ref() else {
                continue;
            };
            let waiting = state
                .waiting
                .as_ref()
                .and_then(|w| w.reason.as_deref())
                .filter(|r| !r.is_empty());

            if let Some(waiting) = waiting {
                reason = waiting.to_string();
            } else if let Some(terminated) = state.terminated.as_ref() {
                reason = terminated_reason(terminated);
            } else if container.ready && state.running.is_some() {
                has_running = true;
            }
        }

        if reason == "Completed" && has_running {
            reason = "Running".to_string();
        }
    }

    if pod.metadata.deletion_timestamp.is_some() {
        reason = if status_reason == Some("NodeLost") {
            "Unknown".to_string()
        } else {
            "Terminating".to_string()
        };
    }

    reason
}

/// Whether a display status is one a pod will not recover from on its own
pub fn is_critical_status(status: &str) -> bool {
    let status = status.strip_prefix("Init:").unwrap_or(status);
    CRITICAL_STATUSES.contains(&status)
}

/// Every container reports ready and running; a pod without statuses is not
pub fn all_containers_ready(pod: &Pod) -> bool {
    let containers = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default();

    !containers.is_empty()
        && containers.iter().all(|cs| {
            cs.ready && cs.state.as_ref().is_some_and(|s| s.running.is_some())
        })
}

pub fn classify(pod: &Pod) -> PodHealth {
    let reason = pod_status(pod);

    let classification = if is_critical_status(&reason) {
        Classification::Critical
    } else if all_containers_ready(pod) {
        Classification::Ready
    } else {
        Classification::Waiting
    };

    PodHealth {
        classification,
        reason,
    }
}

/// Pick the most recently created pod; older ones are being replaced.
/// Equal timestamps fall back to the lexicographically smallest name.
pub fn newest_pod(pods: &[Pod]) -> Option<&Pod> {
    pods.iter().min_by(|a, b| {
        match b
            .metadata
            .creation_timestamp
            .cmp(&a.metadata.creation_timestamp)
        {
            Ordering::Equal => a.metadata.name.cmp(&b.metadata.name),
            other => other,
        }
    })
}
