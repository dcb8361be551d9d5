// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Polling loop that waits for a vcluster pod to become ready and its
//! kubeconfig to become readable.

use crate::constants::wait::{POLL_INTERVAL_SECS, TIMEOUT_SECS, WARNING_COOLDOWN_SECS};
use crate::discovery::instance_selector;
use crate::error::{Result, VclusterError};
use crate::kubernetes::CredentialFetcher;
use crate::readiness::health::{classify, newest_pod, Classification};
use k8s_openapi::api::core::v1::Pod;
use kube::config::Kubeconfig;
use kube::{api::ListParams, Api, Client, ResourceExt};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Deadline used when the timeout does not fit into an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// State of a single wait, never shared between waits
struct WaitSession {
    deadline: Instant,
    warning_cooldown: Duration,
    printed_waiting: bool,
    last_warning_at: Option<Instant>,
    last_phase: Option<String>,
}

impl WaitSession {
    fn new(timeout: Duration, warning_cooldown: Duration) -> Self {
        let now = Instant::now();
        Self {
            deadline: now
                .checked_add(timeout)
                .unwrap_or_else(|| now + FAR_FUTURE),
            warning_cooldown,
            printed_waiting: false,
            last_warning_at: None,
            last_phase: None,
        }
    }

    fn announce_waiting(&mut self) {
        if !self.printed_waiting {
            info!("Waiting for vcluster to come up...");
            self.printed_waiting = true;
        }
    }

    /// At most one warning per cooldown window
    fn should_warn(&mut self, now: Instant) -> bool {
        match self.last_warning_at {
            Some(last) if now.duration_since(last) < self.warning_cooldown => false,
            _ => {
                self.last_warning_at = Some(now);
                true
            }
        }
    }
}

enum Tick {
    Pending,
    Ready(Kubeconfig),
}

/// First waiting or terminated message reported by the pod's containers
fn container_message(pod: &Pod) -> Option<String> {
    let status = pod.status.as_ref()?;
    status
        .init_container_statuses
        .iter()
        .chain(status.container_statuses.iter())
        .flatten()
        .filter_map(|cs| cs.state.as_ref())
        .find_map(|state| {
            state
                .waiting
                .as_ref()
                .and_then(|w| w.message.clone())
                .or_else(|| state.terminated.as_ref().and_then(|t| t.message.clone()))
        })
}

/// Waits for the newest pod of a vcluster to be ready, then reads its
/// kubeconfig through a [`CredentialFetcher`].
///
/// Failing pods are not fatal since crash looping pods may recover; API
/// errors while listing pods end the wait immediately.
pub struct ReadinessWaiter<F> {
    client: Client,
    fetcher: F,
    poll_interval: Duration,
    timeout: Duration,
    warning_cooldown: Duration,
}

impl<F: CredentialFetcher> ReadinessWaiter<F> {
    pub fn new(client: Client, fetcher: F) -> Self {
        Self {
            client,
            fetcher,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(TIMEOUT_SECS),
            warning_cooldown: Duration::from_secs(WARNING_COOLDOWN_SECS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_warning_cooldown(mut self, warning_cooldown: Duration) -> Self {
        self.warning_cooldown = warning_cooldown;
        self
    }

    /// Poll until the vcluster kubeconfig can be read, the timeout expires or
    /// `cancel` fires.
    #[instrument(
        skip(self, name, namespace, cancel),
        fields(vcluster = %name, namespace = %namespace)
    )]
    pub async fn wait(
        &self,
        name: &str,
        namespace: &str,
        cancel: &CancellationToken,
    ) -> Result<Kubeconfig> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = ListParams::default().labels(&instance_selector(name));
        let mut session = WaitSession::new(self.timeout, self.warning_cooldown);

        let aborted = || VclusterError::WaitAborted {
            name: name.to_string(),
            namespace: namespace.to_string(),
        };

        loop {
            let tick = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(aborted()),
                tick = self.tick(&pods, &lp, name, namespace, &mut session) => tick?,
            };

            if let Tick::Ready(kubeconfig) = tick {
                info!("vcluster {}/{} is ready", namespace, name);
                return Ok(kubeconfig);
            }

            let now = Instant::now();
            if now >= session.deadline {
                return Err(VclusterError::WaitTimedOut {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                    last_phase: session.last_phase.take(),
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(aborted()),
                _ = sleep(self.poll_interval.min(session.deadline - now)) => {}
            }
        }
    }

    async fn tick(
        &self,
        pods: &Api<Pod>,
        lp: &ListParams,
        name: &str,
        namespace: &str,
        session: &mut WaitSession,
    ) -> Result<Tick> {
        let pod_list = pods.list(lp).await.map_err(|source| VclusterError::FatalApi {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source,
        })?;

        let Some(pod) = newest_pod(&pod_list.items) else {
            debug!("No pods for vcluster {}/{} yet", namespace, name);
            session.announce_waiting();
            return Ok(Tick::Pending);
        };

        let health = classify(pod);
        session.last_phase = Some(health.reason.clone());

        match health.classification {
            Classification::Critical => {
                session.announce_waiting();
                if session.should_warn(Instant::now()) {
                    warn!(
                        "vcluster pod {}/{} has status {}: {}",
                        namespace,
                        pod.name_any(),
                        health.reason,
                        container_message(pod).unwrap_or_default()
                    );
                }
                return Ok(Tick::Pending);
            }
            Classification::Waiting => {
                session.announce_waiting();
                if health.reason != "Running" {
                    debug!("vcluster pod {} is {}", pod.name_any(), health.reason);
                }
                return Ok(Tick::Pending);
            }
            Classification::Ready => {}
        }

        match self.fetcher.fetch(name, namespace).await {
            Ok(kubeconfig) => Ok(Tick::Ready(kubeconfig)),
            Err(VclusterError::CredentialNotReady(reason)) => {
                debug!("{}", reason);
                session.announce_waiting();
                Ok(Tick::Pending)
            }
            Err(VclusterError::Kube(source)) => Err(VclusterError::FatalApi {
                name: name.to_string(),
                namespace: namespace.to_string(),
                source,
            }),
            Err(e) => Err(e),
        }
    }
}
