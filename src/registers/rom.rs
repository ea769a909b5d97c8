//! Read-only identification registers
//!
//! Registers 40-44 hold the ASCII string `INTAN`. Registers 60-63 describe
//! the die: revision, amplifier polarity, amplifier count and chip ID.
//! Writes to these addresses are rejected by the driver.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

/// First of the five company ID registers
pub const COMPANY_ID_FIRST: u8 = 40;

/// Contents of registers 40-44 on every RHD2000 die
pub const COMPANY_ID: [u8; 5] = *b"INTAN";

/// Die revision register (address: 60)
#[register(60u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DieRevision {
    pub revision: u8,
}

/// Amplifier polarity register (address: 61)
///
/// - true = unipolar amplifiers (RHD2132, RHD2164)
/// - false = bipolar amplifiers (RHD2216)
#[register(61u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnipolarAmplifiers {
    pub unipolar: bool,
}

/// Number of amplifiers register (address: 62)
#[register(62u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmplifierCount {
    pub count: u8,
}

/// Error type for chip ID conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownChip(pub u8);

/// Chip ID register (address: 63)
#[register(63u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipId {
    /// 32 unipolar amplifiers
    Rhd2132 = 1,
    /// 16 bipolar amplifiers
    Rhd2216 = 2,
    /// 64 unipolar amplifiers
    Rhd2164 = 4,
}

impl ChipId {
    pub const fn amplifiers(self) -> u8 {
        match self {
            ChipId::Rhd2132 => 32,
            ChipId::Rhd2216 => 16,
            ChipId::Rhd2164 => 64,
        }
    }
}

impl TryFrom<u8> for ChipId {
    type Error = UnknownChip;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChipId::Rhd2132),
            2 => Ok(ChipId::Rhd2216),
            4 => Ok(ChipId::Rhd2164),
            invalid => Err(UnknownChip(invalid)),
        }
    }
}

impl FromByteArray for DieRevision {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { revision: bytes[0] })
    }
}

impl FromByteArray for UnipolarAmplifiers {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            unipolar: bytes[0] & 0x01 != 0,
        })
    }
}

impl FromByteArray for AmplifierCount {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { count: bytes[0] })
    }
}

impl FromByteArray for ChipId {
    type Error = UnknownChip;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        ChipId::try_from(bytes[0])
    }
}
