#![warn(missing_docs)]

//! Rib generation and lofting core.
//!
//! This crate builds sequences of cross-section "ribs" from boundary
//! geometry and assembles them into surfaces and solids: profiles swept
//! along an axis or a path and scaled into hull-curve envelopes, and
//! interpolated segments blended between two boundary shapes.
//!
//! # Example
//!
//! ```ignore
//! use ribloft_core::{generate, RibConfig, RibInput};
//!
//! let input = RibInput::Axis { base, hull_curves, axis };
//! let config = RibConfig { item_count: 8, ..RibConfig::default() };
//! let shape = generate(&input, &config);
//! ```

pub mod blend;
pub mod config;
pub mod distribution;
pub mod envelope;
pub mod error;
pub mod generator;
pub mod loft;
pub mod network;
pub mod scaling;
pub mod shape;

pub use blend::{blend_networks, BlendMode, BlendSource};
pub use config::RibConfig;
pub use distribution::{Distribution, DistributionKind};
pub use envelope::{envelope_from_intersections, Envelope, PointReduction};
pub use error::{Result, RibloftError};
pub use generator::{generate, RecomputeState, RibGenerator, RibInput};
pub use loft::{make_surface_solid, plan_segments};
pub use network::{match_networks, reorder_edges, reorder_points, Correspondence};
pub use scaling::scale_by_envelope;
pub use shape::{Edge, Face, Rib, Shape, Shell, Solid, Wire};
