//! Register definitions for the RHD2000 series
//! Generated from the RHD2000 datasheet register map

mod power;
mod rom;

pub use power::*;
pub use rom::*;
