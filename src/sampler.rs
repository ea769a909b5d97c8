//! Two-channel sampling loop
//!
//! [`Sampler`] is meant to be ticked from a periodic timer interrupt. Each
//! tick sends one CONVERT, alternating between the two configured channels,
//! so with the default 500 µs period every channel is sampled at 1 kHz.
//!
//! Because the chip answers two commands late, the sample returned by a tick
//! belongs to the conversion issued two ticks earlier. The sampler keeps the
//! slot of every conversion still in flight and files each sample under the
//! slot it was issued for. With strict alternation that is always the slot
//! being converted now, but priming or a changed order stays correct.
//!
//! # Important Notes
//! - Everything sent to the chip after the sampler starts must go through
//!   it, or the in-flight bookkeeping no longer matches the chip
//! - `set_amp_power` and `calibrate` must run before ticking starts, with
//!   the interrupt disabled
//! - A tick must finish within `Config::sample_period_us`

use crate::commands::Convert;
use crate::config::Config;
use crate::device::Device;
use crate::errors::Error;
use crate::frame::{Sample, PIPELINE_DEPTH};
use crate::power::{PowerState, Slot};

/// A sample filed under the slot it was converted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub slot: Slot,
    /// Sample value, zero when the slot is powered off
    pub value: i16,
}

/// Alternating two-channel conversion loop
///
/// Holds the slot order and in-flight bookkeeping; the [`Device`] it ticks
/// is borrowed per call.
#[derive(Debug, Clone)]
pub struct Sampler {
    next: Slot,
    in_flight: [Option<Slot>; PIPELINE_DEPTH],
    latest: [i16; 2],
    period_us: u32,
}

impl Sampler {
    /// Creates a sampler starting at [`Slot::First`] with an empty pipeline.
    pub fn new(config: &Config) -> Self {
        Self {
            next: Slot::First,
            in_flight: [None; PIPELINE_DEPTH],
            latest: [0; 2],
            period_us: config.sample_period_us,
        }
    }

    /// Slot the next tick converts
    pub fn next_slot(&self) -> Slot {
        self.next
    }

    /// Last value recorded for `slot`
    pub fn latest(&self, slot: Slot) -> i16 {
        self.latest[slot.index()]
    }

    /// Time a single tick is allowed to take
    pub fn tick_budget_us(&self) -> u32 {
        self.period_us
    }

    /// Records a conversion just sent and returns the slot whose conversion
    /// the accompanying sample answers.
    fn retire(&mut self, issued: Option<Slot>) -> Option<Slot> {
        let owner = self.in_flight[0];
        self.in_flight.rotate_left(1);
        self.in_flight[PIPELINE_DEPTH - 1] = issued;
        owner
    }

    fn record(&mut self, owner: Option<Slot>, sample: Sample, power: &PowerState) -> Option<Reading> {
        let slot = owner?;
        let value = power.gate(slot, sample.as_i16());
        self.latest[slot.index()] = value;
        Some(Reading { slot, value })
    }
}

impl Sampler {
    /// Converts the next slot's channel.
    ///
    /// Returns `None` while the pipeline still holds conversions that were
    /// not issued by this sampler.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed; the slot is not advanced
    pub fn tick<SPI>(&mut self, device: &mut Device<SPI>) -> Result<Option<Reading>, Error<SPI::Error>>
    where
        SPI: embedded_hal::spi::SpiDevice,
    {
        let slot = self.next;
        let channel = device.config().channel(slot);
        let sample = device.execute_command(Convert::new(channel))?;
        self.next = slot.other();

        let owner = self.retire(Some(slot));
        Ok(self.record(owner, sample, device.power_state()))
    }

    /// Resets the high-pass filter of both channels before recording.
    ///
    /// The conversions started here are not recorded. Samples that arrive
    /// for earlier sampler conversions still are.
    pub fn prime<SPI>(&mut self, device: &mut Device<SPI>) -> Result<(), Error<SPI::Error>>
    where
        SPI: embedded_hal::spi::SpiDevice,
    {
        for slot in [Slot::First, Slot::Second] {
            let channel = device.config().channel(slot);
            let sample = device.execute_command(Convert::with_filter_reset(channel))?;
            let owner = self.retire(None);
            self.record(owner, sample, device.power_state());
        }
        Ok(())
    }

    /// This is the async version of [`tick`](Sampler::tick).
    pub async fn tick_async<SPI>(
        &mut self,
        device: &mut Device<SPI>,
    ) -> Result<Option<Reading>, Error<SPI::Error>>
    where
        SPI: embedded_hal_async::spi::SpiDevice,
    {
        let slot = self.next;
        let channel = device.config().channel(slot);
        let sample = device.execute_command_async(Convert::new(channel)).await?;
        self.next = slot.other();

        let owner = self.retire(Some(slot));
        Ok(self.record(owner, sample, device.power_state()))
    }

    /// This is the async version of [`prime`](Sampler::prime).
    pub async fn prime_async<SPI>(&mut self, device: &mut Device<SPI>) -> Result<(), Error<SPI::Error>>
    where
        SPI: embedded_hal_async::spi::SpiDevice,
    {
        for slot in [Slot::First, Slot::Second] {
            let channel = device.config().channel(slot);
            let sample = device
                .execute_command_async(Convert::with_filter_reset(channel))
                .await?;
            let owner = self.retire(None);
            self.record(owner, sample, device.power_state());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_owned_by_the_conversion_two_back() {
        let mut sampler = Sampler::new(&Config::default());
        assert_eq!(sampler.retire(Some(Slot::First)), None);
        assert_eq!(sampler.retire(Some(Slot::Second)), None);
        assert_eq!(sampler.retire(Some(Slot::First)), Some(Slot::First));
        assert_eq!(sampler.retire(None), Some(Slot::Second));
        assert_eq!(sampler.retire(Some(Slot::Second)), Some(Slot::First));
        assert_eq!(sampler.retire(Some(Slot::First)), None);
    }

    #[test]
    fn disabled_slot_records_zero() {
        let mut sampler = Sampler::new(&Config::default());
        let power = PowerState {
            first: false,
            second: true,
        };
        let reading = sampler.record(Some(Slot::First), Sample(1234), &power);
        assert_eq!(reading, Some(Reading { slot: Slot::First, value: 0 }));
        let reading = sampler.record(Some(Slot::Second), Sample(1234), &power);
        assert_eq!(reading.map(|r| r.value), Some(1234));
        assert_eq!(sampler.latest(Slot::Second), 1234);
        assert_eq!(sampler.record(None, Sample(1), &power), None);
    }
}
