//! Amplifier power registers
//!
//! Registers 14 and 15 each hold one power bit per amplifier, channels 0-7
//! in register 14 and channels 8-15 in register 15. A set bit powers the
//! amplifier on. Turning an amplifier off does not force its output to zero.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::commands::Channel;
use crate::errors::ParameterOutOfRange;

/// Channels covered by the two power bitmaps
pub const POWER_CHANNELS: u8 = 16;

bitflags! {
    /// One bit per amplifier within an 8-channel bank
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AmplifierPower: u8 {
        const AMP0 = 1 << 0;
        const AMP1 = 1 << 1;
        const AMP2 = 1 << 2;
        const AMP3 = 1 << 3;
        const AMP4 = 1 << 4;
        const AMP5 = 1 << 5;
        const AMP6 = 1 << 6;
        const AMP7 = 1 << 7;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AmplifierPower {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AmplifierPower({=u8:#b})", self.bits())
    }
}

/// Amplifier power for channels 0-7 (address: 14)
#[register(14u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct AmplifierPowerLow {
    pub enabled: AmplifierPower,
}

/// Amplifier power for channels 8-15 (address: 15)
#[register(15u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister, Default)]
pub struct AmplifierPowerHigh {
    pub enabled: AmplifierPower,
}

/// Which of the two power registers holds a channel's bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerBank {
    /// Register 14, channels 0-7
    Low,
    /// Register 15, channels 8-15
    High,
}

impl PowerBank {
    pub const fn register(self) -> u8 {
        match self {
            PowerBank::Low => 14,
            PowerBank::High => 15,
        }
    }
}

/// Location of one amplifier's power bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerBit {
    pub bank: PowerBank,
    pub mask: AmplifierPower,
}

impl PowerBit {
    /// Maps a channel to its register and bit.
    ///
    /// # Errors
    /// * `ParameterOutOfRange::PowerChannel` - channel 16 or above
    pub fn locate(channel: Channel) -> Result<Self, ParameterOutOfRange> {
        let index = channel.index();
        if index >= POWER_CHANNELS {
            return Err(ParameterOutOfRange::PowerChannel(index));
        }
        let (bank, bit) = if index < 8 {
            (PowerBank::Low, index)
        } else {
            (PowerBank::High, index - 8)
        };
        Ok(Self {
            bank,
            mask: AmplifierPower::from_bits_retain(1 << bit),
        })
    }
}

impl FromByteArray for AmplifierPowerLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            enabled: AmplifierPower::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for AmplifierPowerLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.enabled.bits()])
    }
}

impl FromByteArray for AmplifierPowerHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            enabled: AmplifierPower::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for AmplifierPowerHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.enabled.bits()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(index: u8) -> Result<PowerBit, ParameterOutOfRange> {
        PowerBit::locate(Channel::new(index).unwrap())
    }

    #[test]
    fn low_channels_map_to_register_14() {
        let bit = locate(0).unwrap();
        assert_eq!(bit.bank, PowerBank::Low);
        assert_eq!(bit.mask, AmplifierPower::AMP0);
        assert_eq!(locate(7).unwrap().mask, AmplifierPower::AMP7);
    }

    #[test]
    fn high_channels_map_to_register_15() {
        let bit = locate(8).unwrap();
        assert_eq!(bit.bank, PowerBank::High);
        assert_eq!(bit.bank.register(), 15);
        assert_eq!(bit.mask, AmplifierPower::AMP0);
        assert_eq!(locate(15).unwrap().mask, AmplifierPower::AMP7);
    }

    #[test]
    fn channels_past_the_bitmaps_are_rejected() {
        assert_eq!(locate(16), Err(ParameterOutOfRange::PowerChannel(16)));
        assert_eq!(locate(63), Err(ParameterOutOfRange::PowerChannel(63)));
    }
}
