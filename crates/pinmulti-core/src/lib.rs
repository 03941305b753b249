//! # pinmulti-core
//!
//! Decision engine for multi-environment lock compilation.
//!
//! Handles:
//! - **Feature**: the contract every policy implements to contribute
//!   resolver arguments per environment.
//! - **Package cache**: lazily parsed, memoized pins of existing output files.
//! - **Upgrade**: full upgrade vs. selective upgrade, and the staleness
//!   decision that skips environments untouched by a selective upgrade.
//! - **Hashes / Post / Compatible**: hash pinning, post-release rejection,
//!   and compatible-release relaxation.
//! - **Controller**: the feature registry that composes arguments and decides
//!   whether each environment must be recompiled.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod compatible;
pub mod controller;
pub mod feature;
pub mod hashes;
pub mod package_cache;
pub mod post;
pub mod upgrade;

pub use controller::Controller;
pub use feature::{Arity, Feature, OptionDescriptor};
