//! # extra-assets
//!
//! Reconciles front-end asset requirements (npm and bower) declared in the `extra` section of
//! Composer packages into one reproducible install per package manager.
//!
//! `extra-assets update` merges every declaration, lets npm and bower resolve them and records
//! the exact installed trees in `extra-assets.lock`. `extra-assets install` replays that lock
//! file and fails if the package managers install anything else.
//!
//! ## Modules Overview
//! - [`package`] – Packages and their asset declarations
//! - [`graph`] – Access to the Composer package graph
//! - [`merge`] – Merging requirement sets across packages
//! - [`matcher`] – Version range compatibility checks
//! - [`collector`] – Gathering isolated and exposed requirements from the graph
//! - [`installer`] – Driving npm and bower at one install path
//! - [`tree`] – Resolved dependency trees and their comparison
//! - [`lock`] – The `extra-assets.lock` file
//! - [`shims`] – Publishing npm binaries into the Composer bin dir
//! - [`orchestrator`] – The `install` and `update` flows
//! - [`config`] – `extra-assets.toml` and resolved settings
//! - [`runner`] – Running external tools

pub mod error;
pub mod package;
pub mod graph;
pub mod merge;
pub mod matcher;
pub mod collector;
pub mod tree;
pub mod lock;
pub mod manifest;
pub mod runner;
pub mod installer;
pub mod shims;
pub mod orchestrator;
pub mod config;
pub mod util;

pub use error::*;
pub use package::*;
pub use graph::*;
pub use merge::*;
pub use matcher::*;
pub use collector::*;
pub use tree::*;
pub use lock::*;
pub use runner::*;
pub use installer::*;
pub use shims::*;
pub use orchestrator::*;
pub use config::*;
