#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keeps a map surface in step with the drill-down selection.
//!
//! [`sync::Synchronizer`] turns a selection into a [`sync::ViewFrame`]
//! (camera target, marker set, mask). [`session::MapSession`] owns the
//! surface and applies frames to it: markers are always torn down and
//! rebuilt, the first camera move is instant and every later one is
//! animated, and pan bounds are re-clamped after each change.

pub mod clamp;
pub mod config;
pub mod headless;
pub mod hover;
pub mod mercator;
pub mod session;
pub mod surface;
pub mod sync;

pub use config::ViewportConfig;
pub use session::MapSession;
pub use surface::MapSurface;
