//! OSV CLI - Command line tools for planning and simulating supply vessel voyages.
//!
//! This crate provides the `osv-voyage` binary:
//! - plan: land-aware route between two points, exported as CSV
//! - simulate: port → rig → port voyage with on-site operations
//! - summary: statistics for an exported trajectory

pub mod scenario;

pub use scenario::{parse_coordinate, Scenario};
