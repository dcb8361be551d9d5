// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for a vcluster to come up and handing out its kubeconfig.

pub mod health;
pub mod waiter;

pub use health::{classify, newest_pod, pod_status, Classification, PodHealth};
pub use waiter::ReadinessWaiter;
