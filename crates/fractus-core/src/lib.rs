//! # fractus-core
//!
//! Types shared across the Fractus crates: configuration, colour maps,
//! complex arithmetic, and the error type.

pub mod color;
pub mod config;
pub mod error;
pub mod math;

pub use config::*;

pub use color::ColorMap;
pub use error::{FractusError, FractusResult};
pub use math::Complex;
