// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Labels carried by every workload and pod of a vcluster
pub mod labels {
    pub const APP: &str = "app";
    pub const APP_VALUE: &str = "vcluster";
    /// Holds the vcluster (release) name
    pub const RELEASE: &str = "release";
}

/// Readiness polling configuration
pub mod wait {
    /// Delay between two polls of the vcluster pods
    pub const POLL_INTERVAL_SECS: u64 = 1;
    /// Overall budget for the vcluster to become reachable
    pub const TIMEOUT_SECS: u64 = 600;
    /// Minimum delay between two warnings about a failing pod
    pub const WARNING_COOLDOWN_SECS: u64 = 6;
}

/// Pod display statuses that will not resolve without intervention.
/// `Init:` prefixed variants are matched after stripping the prefix.
pub const CRITICAL_STATUSES: &[&str] = &[
    "Error",
    "Unknown",
    "ImagePullBackOff",
    "CrashLoopBackOff",
    "RunContainerError",
    "ErrImagePull",
    "CreateContainerConfigError",
    "InvalidImageName",
];

/// Location of the kubeconfig a vcluster publishes about itself
pub mod credentials {
    /// Secret name is `<SECRET_PREFIX><vcluster name>`
    pub const SECRET_PREFIX: &str = "vc-";
    pub const DATA_KEY: &str = "config";
}

/// Local port selection for reaching a vcluster
pub mod ports {
    pub const RANGE_START: u16 = 10000;
    pub const RANGE_END: u16 = 13000;
    /// Number of random ports probed before settling on an unchecked one
    pub const ATTEMPTS: usize = 10;
}
