//! Amplifier power control
//!
//! The chip's power bitmaps decide which amplifiers run, but an amplifier
//! that is switched off does not output zero. [`PowerState`] is the software
//! record of which of the two configured channels were enabled, and is what
//! the [`Sampler`](crate::Sampler) uses to zero readings from disabled ones.

use crate::commands::Channel;
use crate::config::Config;
use crate::device::Device;
use crate::errors::Error;
use crate::registers::{AmplifierPower, AmplifierPowerHigh, AmplifierPowerLow, PowerBank, PowerBit};

/// One of the two configured channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// `Config::first_channel`
    First,
    /// `Config::second_channel`
    Second,
}

impl Slot {
    pub const fn other(self) -> Self {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

/// Software-side power flags for the two configured channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerState {
    pub first: bool,
    pub second: bool,
}

impl PowerState {
    pub const fn is_enabled(&self, slot: Slot) -> bool {
        match slot {
            Slot::First => self.first,
            Slot::Second => self.second,
        }
    }

    /// Returns `value` if the slot is powered, zero otherwise.
    pub const fn gate(&self, slot: Slot, value: i16) -> i16 {
        if self.is_enabled(slot) {
            value
        } else {
            0
        }
    }
}

/// Snapshot of registers 14 and 15 during a power update
#[derive(Debug, Clone, Copy)]
struct PowerBitmaps {
    low: AmplifierPower,
    high: AmplifierPower,
}

impl PowerBitmaps {
    /// Sets `bit` and returns the register number and new contents.
    fn enable(&mut self, bit: PowerBit) -> (u8, u8) {
        let bank = match bit.bank {
            PowerBank::Low => &mut self.low,
            PowerBank::High => &mut self.high,
        };
        bank.insert(bit.mask);
        (bit.bank.register(), bank.bits())
    }
}

/// Resolves the power bit of every channel that is being enabled.
fn requested_bits<E>(
    config: &Config,
    first: bool,
    second: bool,
) -> Result<[Option<PowerBit>; 2], Error<E>> {
    let locate = |enabled: bool, channel: Channel| -> Result<Option<PowerBit>, Error<E>> {
        if enabled {
            Ok(Some(PowerBit::locate(channel)?))
        } else {
            Ok(None)
        }
    };
    Ok([
        locate(first, config.first_channel)?,
        locate(second, config.second_channel)?,
    ])
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Powers the configured amplifiers on and records the power flags.
    ///
    /// Reads registers 14 and 15, then for each enabled channel writes its
    /// register back with the channel's bit set. Other bits are preserved.
    /// A disabled channel causes no write; its amplifier keeps whatever
    /// state the chip already had and only the software flag is cleared.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - an enabled channel is 16 or above;
    ///   nothing is sent and the flags are unchanged
    pub fn set_amp_power(&mut self, first: bool, second: bool) -> Result<PowerState, Error<SPI::Error>> {
        let bits = requested_bits(&self.config, first, second)?;

        let mut bitmaps = PowerBitmaps {
            low: self.read_register::<AmplifierPowerLow>()?.enabled,
            high: self.read_register::<AmplifierPowerHigh>()?.enabled,
        };

        for bit in bits.into_iter().flatten() {
            let (register, data) = bitmaps.enable(bit);
            self.send_write(register, data)?;
        }

        self.power = PowerState { first, second };

        #[cfg(feature = "defmt")]
        defmt::debug!("amplifier power {}", self.power);

        Ok(self.power)
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// This is the async version of [`set_amp_power`](Device::set_amp_power).
    pub async fn set_amp_power_async(
        &mut self,
        first: bool,
        second: bool,
    ) -> Result<PowerState, Error<SPI::Error>> {
        let bits = requested_bits(&self.config, first, second)?;

        let mut bitmaps = PowerBitmaps {
            low: self.read_register_async::<AmplifierPowerLow>().await?.enabled,
            high: self.read_register_async::<AmplifierPowerHigh>().await?.enabled,
        };

        for bit in bits.into_iter().flatten() {
            let (register, data) = bitmaps.enable(bit);
            self.send_write_async(register, data).await?;
        }

        self.power = PowerState { first, second };

        #[cfg(feature = "defmt")]
        defmt::debug!("amplifier power {}", self.power);

        Ok(self.power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_zeroes_disabled_slots() {
        let state = PowerState {
            first: true,
            second: false,
        };
        assert_eq!(state.gate(Slot::First, -120), -120);
        assert_eq!(state.gate(Slot::Second, -120), 0);
    }

    #[test]
    fn bits_in_the_same_bank_accumulate() {
        let mut bitmaps = PowerBitmaps {
            low: AmplifierPower::AMP4,
            high: AmplifierPower::empty(),
        };
        let a = Channel::new(0).unwrap();
        let b = Channel::new(3).unwrap();
        assert_eq!(bitmaps.enable(PowerBit::locate(a).unwrap()), (14, 0b0001_0001));
        assert_eq!(bitmaps.enable(PowerBit::locate(b).unwrap()), (14, 0b0001_1001));
    }
}
