//! Conversion commands
//!
//! CONVERT runs the amplifier and ADC on one channel. Setting the frame's
//! LSB additionally resets that channel's DSP offset-removal filter to zero,
//! which settles a channel quickly after a large transient or before the
//! first recording.

use crate::errors::ParameterOutOfRange;
use crate::frame::{Opcode, Sample, MAX_ADDRESS};
use regiface::Command;

use super::FrameBody;

const RESET_FILTER: u8 = 0x01;

/// Amplifier channel index, 0-63
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    pub const fn new(index: u8) -> Result<Self, ParameterOutOfRange> {
        if index > MAX_ADDRESS {
            return Err(ParameterOutOfRange::Channel(index));
        }
        Ok(Self(index))
    }

    /// Drops any bits above the 6-bit address field
    pub(crate) const fn masked(index: u8) -> Self {
        Self(index & MAX_ADDRESS)
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Channel {
    type Error = ParameterOutOfRange;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

/// CONVERT command (`00`)
///
/// Frame: `00 | channel | 0000_000H` where `H` is the filter reset flag.
///
/// The returned [`Sample`] belongs to the conversion started two
/// transactions earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Convert {
    /// Channel to digitize
    pub channel: Channel,
    /// Reset the channel's high-pass filter output to zero
    pub reset_filter: bool,
}

impl Convert {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            reset_filter: false,
        }
    }

    pub fn with_filter_reset(channel: Channel) -> Self {
        Self {
            channel,
            reset_filter: true,
        }
    }
}

impl Command for Convert {
    type IdType = u8;
    type CommandParameters = FrameBody;
    type ResponseParameters = Sample;

    fn id() -> Self::IdType {
        Opcode::Convert as u8
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        FrameBody {
            address: self.channel.index(),
            payload: if self.reset_filter { RESET_FILTER } else { 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_range() {
        assert_eq!(Channel::new(63).map(Channel::index), Ok(63));
        assert_eq!(Channel::new(64), Err(ParameterOutOfRange::Channel(64)));
        assert_eq!(Channel::try_from(200), Err(ParameterOutOfRange::Channel(200)));
    }

    #[test]
    fn filter_reset_only_touches_the_lsb() {
        let channel = Channel::new(37).unwrap();
        let plain = Convert::new(channel).invoking_parameters();
        let reset = Convert::with_filter_reset(channel).invoking_parameters();
        assert_eq!(plain.address, reset.address);
        assert_eq!(plain.payload, 0);
        assert_eq!(reset.payload, 1);
    }
}
