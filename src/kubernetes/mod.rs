// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for vcluster credentials, local kubeconfig files and
//! local port selection.

pub mod credentials;
pub mod kubeconfig;
pub mod ports;

pub use credentials::{CredentialFetcher, SecretCredentialFetcher};
pub use kubeconfig::{rewrite_server, single_context_config, update_kubeconfig};
pub use ports::random_local_port;
