//! Platform abstraction layer
//!
//! Turns whatever the device offers into a gravity vector for the
//! simulation: accelerometer tilt, a pointer fallback for devices without
//! one, or a seeded wandering tilt for headless runs.

pub mod input;

pub use input::{Accelerometer, InputSource, PointerInput, WanderingTilt};
