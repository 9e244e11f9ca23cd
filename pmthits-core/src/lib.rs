//! pmthits-core: Hit records and gate queries for per-sensor photo-hits.
//!
//! This crate provides the per-sensor hit record used by event-based
//! detector simulations, the gate windows and configuration used to query
//! it, and the run-scoped peak tracker shared by all records of a run.
//!

pub mod error;
pub mod gate;
pub mod geometry;
pub mod hit;
pub mod peak;

pub use error::{Error, Result};
pub use gate::{GateConfig, GateWindow};
pub use geometry::{Vec3, VolumeRef};
pub use hit::{HitRecord, PhotonArrival};
pub use peak::PeakTracker;
