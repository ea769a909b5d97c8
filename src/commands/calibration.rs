//! ADC calibration command

use crate::frame::{Opcode, Response};
use regiface::Command;

use super::FrameBody;

/// Address field of the CALIBRATE frame (`010101`)
const CALIBRATE_ADDRESS: u8 = 0b01_0101;

/// Number of dummy commands the calibration routine needs to finish
pub const CALIBRATION_CYCLES: u8 = 9;

/// CALIBRATE command (`0101_0101_0000_0000`)
///
/// Starts the ADC self-calibration routine. Run once after power-up and
/// register configuration.
///
/// # Important Notes
/// - The chip needs nine more commands to complete calibration; their
///   results are ignored
/// - There is no calibration status flag; an incomplete calibration only
///   shows up as noisy samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibrate;

impl Command for Calibrate {
    type IdType = u8;
    type CommandParameters = FrameBody;
    type ResponseParameters = Response;

    fn id() -> Self::IdType {
        Opcode::Calibrate as u8
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        FrameBody {
            address: CALIBRATE_ADDRESS,
            payload: 0,
        }
    }
}
