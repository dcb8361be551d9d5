// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::wait;
use crate::util::files::expand_path;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Tool configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the vcluster to connect to
    pub vcluster_name: String,
    /// Namespace to search in, empty searches all namespaces
    pub namespace: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Context name written to the local kubeconfig
    pub context_name: Option<String>,
    pub kubeconfig_path: PathBuf,
    pub set_active: bool,
    /// Local port the vcluster will be reachable on, random when unset
    pub local_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let vcluster_name =
            env::var("VCLUSTER_NAME").context("VCLUSTER_NAME environment variable not set")?;
        if vcluster_name.trim().is_empty() {
            bail!("VCLUSTER_NAME must not be empty");
        }
        let namespace = env::var("VCLUSTER_NAMESPACE").unwrap_or_default();

        let poll_interval =
            Duration::from_secs(parse_var("POLL_INTERVAL_SECS", wait::POLL_INTERVAL_SECS)?);
        let timeout = Duration::from_secs(parse_var("WAIT_TIMEOUT_SECS", wait::TIMEOUT_SECS)?);

        let context_name = env::var("KUBE_CONTEXT_NAME").ok().filter(|s| !s.is_empty());
        let kubeconfig_path = env::var("KUBECONFIG_PATH")
            .or_else(|_| env::var("KUBECONFIG"))
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| env::split_paths(&s).next())
            .unwrap_or_else(|| PathBuf::from("~/.kube/config"));
        let kubeconfig_path = PathBuf::from(expand_path(&kubeconfig_path.to_string_lossy()));

        let set_active = parse_var("SET_ACTIVE_CONTEXT", true)?;
        let local_port = env::var("LOCAL_PORT")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<u16>())
            .transpose()
            .context("LOCAL_PORT must be a valid port number")?;

        Ok(Config {
            vcluster_name,
            namespace,
            poll_interval,
            timeout,
            context_name,
            kubeconfig_path,
            set_active,
            local_port,
        })
    }

    /// Context name to use for the vcluster once its namespace is known
    pub fn context_name_for(&self, namespace: &str) -> String {
        self.context_name
            .clone()
            .unwrap_or_else(|| format!("vcluster_{}_{}", self.vcluster_name, namespace))
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", v, key)),
        _ => Ok(default),
    }
}
