#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Province/city/location drill-down for the workspace map.
//!
//! [`machine::SelectionMachine`] is the only writer of the selection
//! state. Entering a province groups the matching locations into city
//! aggregates ([`aggregate`]) using the permissive city-name heuristic in
//! [`matching`]; entering a city fixes the member list that the location
//! level and the detail panel read from. No data is refetched on any
//! transition.

pub mod aggregate;
pub mod machine;
pub mod matching;

pub use machine::SelectionMachine;
