// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local kubeconfig handling: merging a vcluster context into a kubeconfig
//! file and reducing a vcluster kubeconfig to a single context.

use crate::error::{Result, VclusterError};
use kube::config::{
    AuthInfo, Cluster, Context, KubeConfigOptions, Kubeconfig, NamedAuthInfo, NamedCluster,
    NamedContext,
};
use std::path::Path;
use tracing::{debug, info, instrument};

fn kubeconfig_error(action: &str, e: impl std::fmt::Display) -> VclusterError {
    VclusterError::Kubeconfig(format!("Failed to {}: {}", action, e))
}

/// A context pointing at the cluster and user both registered as `name`
fn context_for(name: &str) -> Result<Context> {
    serde_json::from_value(serde_json::json!({ "cluster": name, "user": name }))
        .map_err(|e| kubeconfig_error("build context", e))
}

/// Read the kubeconfig at `path`, a missing or empty file is an empty config
pub fn load_kubeconfig(path: &Path) -> Result<Kubeconfig> {
    if !path.exists() {
        debug!("Kubeconfig {} does not exist yet", path.display());
        return Ok(Kubeconfig::default());
    }

    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Kubeconfig::default());
    }

    Kubeconfig::from_yaml(&raw)
        .map_err(|e| kubeconfig_error(&format!("parse kubeconfig {}", path.display()), e))
}

/// Serialize a kubeconfig to YAML
pub fn to_yaml(config: &Kubeconfig) -> Result<String> {
    serde_yaml::to_string(config).map_err(|e| kubeconfig_error("serialize kubeconfig", e))
}

fn upsert<T>(entries: &mut Vec<T>, entry: T, name_of: impl Fn(&T) -> &str) {
    let name = name_of(&entry).to_string();
    match entries.iter().position(|e| name_of(e) == name) {
        Some(i) => entries[i] = entry,
        None => entries.push(entry),
    }
}

/// Merge a cluster, user and context named `context_name` into the kubeconfig
/// at `path`, replacing entries with the same name.
#[instrument(skip(cluster, auth_info))]
pub fn update_kubeconfig(
    path: &Path,
    context_name: &str,
    cluster: Cluster,
    auth_info: AuthInfo,
    set_active: bool,
) -> Result<()> {
    let mut config = load_kubeconfig(path)?;

    upsert(
        &mut config.clusters,
        NamedCluster {
            name: context_name.to_string(),
            cluster: Some(cluster),
        },
        |c| c.name.as_str(),
    );
    upsert(
        &mut config.auth_infos,
        NamedAuthInfo {
            name: context_name.to_string(),
            auth_info: Some(auth_info),
        },
        |a| a.name.as_str(),
    );
    upsert(
        &mut config.contexts,
        NamedContext {
            name: context_name.to_string(),
            context: Some(context_for(context_name)?),
        },
        |c| c.name.as_str(),
    );

    if set_active {
        config.current_context = Some(context_name.to_string());
    }
    config.kind.get_or_insert_with(|| "Config".to_string());
    config.api_version.get_or_insert_with(|| "v1".to_string());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_yaml(&config)?)?;

    info!("Updated kubeconfig {} with context '{}'", path.display(), context_name);
    Ok(())
}

/// Build a config with a single context named `context_name` out of the
/// first cluster and user of `source`.
pub fn single_context_config(context_name: &str, source: &Kubeconfig) -> Result<Kubeconfig> {
    let cluster = source
        .clusters
        .iter()
        .find_map(|c| c.cluster.clone())
        .ok_or_else(|| VclusterError::Credential("kubeconfig contains no cluster".to_string()))?;
    let auth_info = source
        .auth_infos
        .iter()
        .find_map(|a| a.auth_info.clone())
        .ok_or_else(|| VclusterError::Credential("kubeconfig contains no user".to_string()))?;

    Ok(Kubeconfig {
        clusters: vec![NamedCluster {
            name: context_name.to_string(),
            cluster: Some(cluster),
        }],
        auth_infos: vec![NamedAuthInfo {
            name: context_name.to_string(),
            auth_info: Some(auth_info),
        }],
        contexts: vec![NamedContext {
            name: context_name.to_string(),
            context: Some(context_for(context_name)?),
        }],
        current_context: Some(context_name.to_string()),
        kind: Some("Config".to_string()),
        api_version: Some("v1".to_string()),
        ..Default::default()
    })
}

/// Point every cluster of `config` at `server`
pub fn rewrite_server(config: &mut Kubeconfig, server: &str) {
    for cluster in config.clusters.iter_mut().filter_map(|c| c.cluster.as_mut()) {
        debug!(
            "Rewriting cluster server from {} to {}",
            cluster.server.as_deref().unwrap_or_default(),
            server
        );
        cluster.server = Some(server.to_string());
    }
}

/// Client configuration for a single context kubeconfig
pub async fn client_config(config: Kubeconfig) -> Result<kube::Config> {
    kube::Config::from_custom_kubeconfig(config, &KubeConfigOptions::default())
        .await
        .map_err(|e| kubeconfig_error("create client config", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::credentials::tests::VCLUSTER_KUBECONFIG;

    const EXISTING_KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: host
  cluster:
    server: https://host.example.com:6443
users:
- name: host-admin
  user:
    token: host-token
contexts:
- name: host
  context:
    cluster: host
    user: host-admin
current-context: host
"#;

    fn vcluster_config() -> Kubeconfig {
        Kubeconfig::from_yaml(VCLUSTER_KUBECONFIG).unwrap()
    }

    fn vcluster_parts() -> (Cluster, AuthInfo) {
        let config = vcluster_config();
        (
            config.clusters[0].cluster.clone().unwrap(),
            config.auth_infos[0].auth_info.clone().unwrap(),
        )
    }

    #[test]
    fn test_load_missing_kubeconfig_is_empty() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_kubeconfig(&dir.path().join("config")).unwrap();

        assert!(config.clusters.is_empty());
        assert!(config.current_context.is_none());
    }

    #[test]
    fn test_update_kubeconfig_merges_and_activates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, EXISTING_KUBECONFIG).unwrap();
        let (cluster, auth_info) = vcluster_parts();

        update_kubeconfig(&path, "vcluster_my-vcluster_ns", cluster, auth_info, true).unwrap();

        let config = load_kubeconfig(&path).unwrap();
        assert_eq!(config.clusters.len(), 2);
        assert_eq!(config.auth_infos.len(), 2);
        assert_eq!(config.contexts.len(), 2);
        assert_eq!(config.current_context.as_deref(), Some("vcluster_my-vcluster_ns"));
        let context = config
            .contexts
            .iter()
            .find(|c| c.name == "vcluster_my-vcluster_ns")
            .and_then(|c| c.context.as_ref())
            .unwrap();
        assert_eq!(context.cluster, "vcluster_my-vcluster_ns");
    }

    #[test]
    fn test_update_kubeconfig_replaces_and_keeps_current_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let (cluster, auth_info) = vcluster_parts();

        update_kubeconfig(&path, "dev", cluster.clone(), auth_info.clone(), false).unwrap();
        let mut moved = cluster;
        moved.server = Some("https://localhost:10443".to_string());
        update_kubeconfig(&path, "dev", moved, auth_info, false).unwrap();

        let config = load_kubeconfig(&path).unwrap();
        assert_eq!(config.clusters.len(), 1);
        assert_eq!(
            config.clusters[0].cluster.as_ref().unwrap().server.as_deref(),
            Some("https://localhost:10443")
        );
        assert!(config.current_context.is_none());
    }

    #[test]
    fn test_single_context_config() {
        let single = single_context_config("my-context", &vcluster_config()).unwrap();

        assert_eq!(single.current_context.as_deref(), Some("my-context"));
        assert_eq!(single.clusters.len(), 1);
        assert_eq!(single.clusters[0].name, "my-context");
        assert_eq!(single.auth_infos[0].name, "my-context");
        assert!(to_yaml(&single).unwrap().contains("my-context"));
    }

    #[test]
    fn test_single_context_config_without_cluster() {
        let err = single_context_config("my-context", &Kubeconfig::default()).unwrap_err();
        assert!(matches!(err, VclusterError::Credential(_)));
    }

    #[test]
    fn test_rewrite_server() {
        let mut config = vcluster_config();

        rewrite_server(&mut config, "https://localhost:12345");

        assert_eq!(
            config.clusters[0].cluster.as_ref().unwrap().server.as_deref(),
            Some("https://localhost:12345")
        );
    }

    #[tokio::test]
    async fn test_client_config_from_single_context() {
        let mut single = single_context_config("my-context", &vcluster_config()).unwrap();
        rewrite_server(&mut single, "https://localhost:12345");

        let config = client_config(single).await.unwrap();

        assert_eq!(config.cluster_url.port_u16(), Some(12345));
    }
}
