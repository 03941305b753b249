//! Compilation engine for the pinmulti workspace.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod engine;
pub mod hash;
pub mod lockfile;
pub mod plan;
pub mod verify;
