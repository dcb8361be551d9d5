// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Picking a free local port to reach a vcluster on

use crate::constants::ports::{ATTEMPTS, RANGE_END, RANGE_START};
use rand::Rng;
use std::net::TcpListener;
use std::ops::Range;
use tracing::debug;

/// Whether a TCP listener can be bound on the loopback port right now
pub fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Probe up to `attempts` random ports from `range` and return the first one
/// `is_free` accepts. Falls back to an unchecked random port from the range.
pub fn pick_port<R>(
    range: Range<u16>,
    attempts: usize,
    mut is_free: impl FnMut(u16) -> bool,
    rng: &mut R,
) -> u16
where
    R: Rng,
{
    for _ in 0..attempts {
        let port = rng.random_range(range.clone());
        if is_free(port) {
            return port;
        }
        debug!("Local port {} is in use", port);
    }

    rng.random_range(range)
}

/// A random, most likely free, local port
pub fn random_local_port() -> u16 {
    pick_port(
        RANGE_START..RANGE_END,
        ATTEMPTS,
        port_is_free,
        &mut rand::rng(),
    )
}
