// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vcluster_access::config::Config;
use vcluster_access::discovery::{find_instances, select_instance};
use vcluster_access::kubernetes::{
    random_local_port, rewrite_server, single_context_config, update_kubeconfig,
    SecretCredentialFetcher,
};
use vcluster_access::readiness::ReadinessWaiter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: vcluster={}, namespace={}",
        config.vcluster_name,
        if config.namespace.is_empty() { "<all>" } else { config.namespace.as_str() }
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to host cluster");

    let found = find_instances(&client, &config.vcluster_name, &config.namespace).await?;
    let namespace = select_instance(found, &config.vcluster_name, &config.namespace)?.namespace;

    // Abort the wait on Ctrl-C
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let waiter = ReadinessWaiter::new(client.clone(), SecretCredentialFetcher::new(client))
        .with_poll_interval(config.poll_interval)
        .with_timeout(config.timeout);
    let vcluster_kubeconfig = waiter
        .wait(&config.vcluster_name, &namespace, &cancel)
        .await
        .context("wait for vcluster")?;

    let context_name = config.context_name_for(&namespace);
    let local_port = config.local_port.unwrap_or_else(random_local_port);

    let mut kubeconfig = single_context_config(&context_name, &vcluster_kubeconfig)?;
    rewrite_server(&mut kubeconfig, &format!("https://localhost:{}", local_port));

    let (Some(cluster), Some(auth_info)) = (
        kubeconfig.clusters.pop().and_then(|c| c.cluster),
        kubeconfig.auth_infos.pop().and_then(|a| a.auth_info),
    ) else {
        anyhow::bail!("vcluster kubeconfig is missing a cluster or user");
    };

    update_kubeconfig(
        &config.kubeconfig_path,
        &context_name,
        cluster,
        auth_info,
        config.set_active,
    )?;

    info!(
        "vcluster {}/{} is reachable through context '{}' once local port {} is forwarded",
        namespace, config.vcluster_name, context_name, local_port
    );
    info!(
        "Run: kubectl port-forward -n {} svc/{} {}:443",
        namespace, config.vcluster_name, local_port
    );
    Ok(())
}
