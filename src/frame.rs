//! 16-bit command frame codec
//!
//! Every exchange with an RHD chip is a single 16-bit word clocked out MSB
//! first while the chip clocks a 16-bit response back:
//!
//! ```text
//!  15 14 | 13 12 11 10  9  8 | 7  6  5  4  3  2  1  0
//! opcode |      address       |        payload
//! ```
//!
//! The chip answers with a two-command delay: the word returned during
//! transaction `n` is the result of the command sent in transaction `n - 2`.

use core::convert::Infallible;

use regiface::{FromByteArray, ToByteArray};

use crate::errors::ParameterOutOfRange;

/// Number of transactions between a command and its response
pub const PIPELINE_DEPTH: usize = 2;

/// Highest address that fits the 6-bit field
pub const MAX_ADDRESS: u8 = 0x3F;

const OPCODE_SHIFT: u16 = 14;
const ADDRESS_SHIFT: u16 = 8;
const ADDRESS_MASK: u16 = 0x3F;
const PAYLOAD_MASK: u16 = 0xFF;

/// Command type carried in bits 15-14
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Sample an amplifier channel (`00`)
    Convert = 0b00,
    /// Calibrate / clear-calibration family (`01`)
    Calibrate = 0b01,
    /// Write a RAM register (`10`)
    Write = 0b10,
    /// Read a RAM or ROM register (`11`)
    Read = 0b11,
}

impl TryFrom<u8> for Opcode {
    type Error = ParameterOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(Self::Convert),
            0b01 => Ok(Self::Calibrate),
            0b10 => Ok(Self::Write),
            0b11 => Ok(Self::Read),
            invalid => Err(ParameterOutOfRange::Opcode(invalid)),
        }
    }
}

/// A complete command word ready to go on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame(u16);

impl CommandFrame {
    /// Builds a frame from its three fields.
    ///
    /// # Errors
    /// `address` does not fit in 6 bits. Reported as
    /// `ParameterOutOfRange::ReadRegister` or `WriteRegister` for register
    /// commands, `ParameterOutOfRange::Channel` otherwise.
    pub fn new(opcode: Opcode, address: u8, payload: u8) -> Result<Self, ParameterOutOfRange> {
        if address > MAX_ADDRESS {
            return Err(match opcode {
                Opcode::Read => ParameterOutOfRange::ReadRegister(address),
                Opcode::Write => ParameterOutOfRange::WriteRegister(address),
                Opcode::Convert | Opcode::Calibrate => ParameterOutOfRange::Channel(address),
            });
        }
        Ok(Self(
            (opcode as u16) << OPCODE_SHIFT
                | (address as u16) << ADDRESS_SHIFT
                | payload as u16,
        ))
    }

    /// Wraps a raw word. Every 16-bit value is a well formed frame.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn opcode(self) -> Opcode {
        match self.0 >> OPCODE_SHIFT {
            0b00 => Opcode::Convert,
            0b01 => Opcode::Calibrate,
            0b10 => Opcode::Write,
            _ => Opcode::Read,
        }
    }

    pub const fn address(self) -> u8 {
        ((self.0 >> ADDRESS_SHIFT) & ADDRESS_MASK) as u8
    }

    pub const fn payload(self) -> u8 {
        (self.0 & PAYLOAD_MASK) as u8
    }
}

impl ToByteArray for CommandFrame {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.0.to_be_bytes())
    }
}

impl FromByteArray for CommandFrame {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(u16::from_be_bytes(bytes)))
    }
}

/// Word clocked back by the chip during one transaction
///
/// Belongs to the command sent [`PIPELINE_DEPTH`] transactions earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response(pub u16);

impl Response {
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Register contents when this word answers a READ
    pub const fn register_value(self) -> u8 {
        (self.0 & PAYLOAD_MASK) as u8
    }

    /// True when this word is a WRITE echo (`0xFF` in the upper byte)
    pub const fn is_write_echo(self) -> bool {
        self.0 >> 8 == 0xFF
    }
}

impl FromByteArray for Response {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(u16::from_be_bytes(bytes)))
    }
}

/// Raw ADC result returned by a CONVERT command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample(pub u16);

impl Sample {
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The sample word reinterpreted as a signed 16-bit value
    pub const fn as_i16(self) -> i16 {
        self.0 as i16
    }
}

impl From<Response> for Sample {
    fn from(response: Response) -> Self {
        Self(response.0)
    }
}

impl FromByteArray for Sample {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(u16::from_be_bytes(bytes)))
    }
}
