//! # pinmulti-compose
//!
//! Turns a directory of requirement files into an ordered set of
//! environments.
//!
//! Handles:
//! - **Discovery**: one environment per input file in the configured directory.
//! - **References**: `-r other.in` lines linking environments together.
//! - **Validator**: undefined and self references.
//! - **Selection**: `--only-name` filtering with transitive references.
//! - **Graph**: dependency ordering and parallel compilation levels.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod discovery;
pub mod graph;
pub mod references;
pub mod selection;
pub mod validator;
