//! Driver configuration
//!
//! Board-level constants the driver needs: which two amplifier channels are
//! wired to the power flags and sampler, and the timing numbers taken from
//! the RHD2000 datasheet.

use crate::commands::{Channel, CALIBRATION_CYCLES};
use crate::errors::ParameterOutOfRange;
use crate::power::Slot;

/// Default interrupt period of the sampling loop, 2 kHz
pub const DEFAULT_SAMPLE_PERIOD_US: u32 = 500;

/// Register addressed by the dummy READs that clock calibration
pub const DEFAULT_DUMMY_REGISTER: u8 = 40;

/// Board configuration handed to [`Device::with_config`](crate::Device::with_config)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Channel behind the first power flag and sampler slot
    pub first_channel: Channel,
    /// Channel behind the second power flag and sampler slot
    pub second_channel: Channel,
    /// Dummy commands sent after CALIBRATE
    pub calibration_cycles: u8,
    /// Register number used for the dummy READs
    pub dummy_register: u8,
    /// Period of the caller's sampling interrupt in microseconds
    ///
    /// One [`Sampler::tick`](crate::Sampler::tick) must complete inside it.
    pub sample_period_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_channel: Channel::masked(0),
            second_channel: Channel::masked(15),
            calibration_cycles: CALIBRATION_CYCLES,
            dummy_register: DEFAULT_DUMMY_REGISTER,
            sample_period_us: DEFAULT_SAMPLE_PERIOD_US,
        }
    }
}

impl Config {
    /// Selects the two amplifier channels.
    ///
    /// # Errors
    /// * `ParameterOutOfRange::Channel` - either index above 63
    pub fn with_channels(mut self, first: u8, second: u8) -> Result<Self, ParameterOutOfRange> {
        self.first_channel = Channel::new(first)?;
        self.second_channel = Channel::new(second)?;
        Ok(self)
    }

    /// Channel converted for `slot`
    pub fn channel(&self, slot: Slot) -> Channel {
        match slot {
            Slot::First => self.first_channel,
            Slot::Second => self.second_channel,
        }
    }

    /// Sets how many dummy commands follow CALIBRATE.
    pub fn with_calibration_cycles(mut self, cycles: u8) -> Self {
        self.calibration_cycles = cycles;
        self
    }

    /// Sets the register the calibration dummy READs address.
    ///
    /// Checked when [`calibrate`](crate::Device::calibrate) runs.
    pub fn with_dummy_register(mut self, register: u8) -> Self {
        self.dummy_register = register;
        self
    }

    /// Sets the sampling interrupt period in microseconds.
    pub fn with_sample_period_us(mut self, period: u32) -> Self {
        self.sample_period_us = period;
        self
    }

    /// Update rate of each channel with two channels sharing the interrupt
    ///
    /// Zero when the period is zero or too long to express.
    pub fn per_channel_rate_hz(&self) -> u32 {
        self.sample_period_us
            .checked_mul(2)
            .map_or(0, |frame_us| 1_000_000 / frame_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_board() {
        let config = Config::default();
        assert_eq!(config.first_channel.index(), 0);
        assert_eq!(config.second_channel.index(), 15);
        assert_eq!(config.calibration_cycles, 9);
        assert_eq!(config.dummy_register, 40);
        assert_eq!(config.per_channel_rate_hz(), 1000);
    }

    #[test]
    fn channel_selection_is_checked() {
        let config = Config::default().with_channels(3, 8).unwrap();
        assert_eq!(config.first_channel.index(), 3);
        assert_eq!(config.channel(Slot::Second).index(), 8);
        assert_eq!(
            Config::default().with_channels(3, 64),
            Err(ParameterOutOfRange::Channel(64))
        );
    }

    #[test]
    fn rate_of_degenerate_periods_is_zero() {
        assert_eq!(Config::default().with_sample_period_us(0).per_channel_rate_hz(), 0);
        assert_eq!(
            Config::default().with_sample_period_us(u32::MAX).per_channel_rate_hz(),
            0
        );
        assert_eq!(
            Config::default().with_sample_period_us(u32::MAX / 2).per_channel_rate_hz(),
            0
        );
        assert_eq!(Config::default().with_sample_period_us(250).per_channel_rate_hz(), 2000);
    }
}
