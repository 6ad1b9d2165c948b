//! Kinematic vehicle simulator used by the mission tools.

pub mod vehicle;

pub use vehicle::{SimParams, SimVehicle};
