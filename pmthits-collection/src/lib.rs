//! pmthits-collection: Per-event hit collections and trigger gates.
//!
//! This crate provides:
//! - **`HitsCollection`** - arena of hit records for one event, keyed by sensor id
//! - **`evaluate_gates`** - first-arrival and gate-count queries across every sensor
//!
#![warn(missing_docs)]

pub mod collection;
pub mod error;
pub mod trigger;

pub use collection::{HitHandle, HitsCollection};
pub use error::{Error, Result};
pub use trigger::{evaluate_gates, EventGateSummary, SensorGate};

// Re-export the record types the collection hands out
pub use pmthits_core::{GateConfig, HitRecord, PeakTracker};
