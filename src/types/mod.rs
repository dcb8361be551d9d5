// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by discovery and readiness.

pub mod instance;

pub use instance::{Candidate, Instance, Resolution, SourceKind};
