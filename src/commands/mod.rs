//! RHD command implementations
//!
//! Each command is a [`regiface::Command`] whose id is the 2-bit opcode and
//! whose parameters are the two remaining fields of the frame, packed as
//! `[address, payload]`. [`Device::execute_command`](crate::Device::execute_command)
//! reassembles the id and parameters into a [`CommandFrame`](crate::CommandFrame).
//!
//! # Command Categories
//! - [`register`]: READ and WRITE
//! - [`convert`]: CONVERT, with or without high-pass filter reset
//! - [`calibration`]: ADC self-calibration
//!
//! All argument checking happens in the constructors, so a command value
//! that exists always encodes to a well formed frame.
//!
//! # Important Notes
//! - Responses are delayed by two transactions; the response returned by
//!   `execute_command` belongs to an earlier command
//! - CALIBRATE must be followed by nine further transactions before the
//!   ADC can be trusted

mod calibration;
mod convert;
mod register;

pub use calibration::*;
pub use convert::*;
pub use register::*;

use core::convert::Infallible;

use regiface::ToByteArray;

/// Address and payload fields of a command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameBody {
    /// Register or channel number, bits 13-8
    pub address: u8,
    /// Data or flag byte, bits 7-0
    pub payload: u8,
}

impl ToByteArray for FrameBody {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address, self.payload])
    }
}
