//! Boundary reconstruction: surface extraction and linkage repair.

pub mod repair;
pub mod surface;

pub use repair::{ContactState, RepairAction, RepairReport, TopologyRepairer};
pub use surface::SurfaceExtractor;
