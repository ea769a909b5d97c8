//! Register access commands
//!
//! Registers 0-17 are writable RAM. Registers 40-44 and 60-63 are read-only
//! ROM holding the chip identification. READ accepts any 6-bit address.

use crate::errors::ParameterOutOfRange;
use crate::frame::{Opcode, Response, MAX_ADDRESS};
use regiface::Command;

use super::FrameBody;

/// Highest RAM register accepted by WRITE
pub const MAX_WRITE_REGISTER: u8 = 17;

/// READ command (`11`)
///
/// Frame: `11 | register | 0000_0000`
///
/// # Important Notes
/// - The register value arrives two transactions later, in bits 7-0
/// - Issue the same READ three times and keep the last response to get the
///   register's current contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadRegister {
    register: u8,
}

impl ReadRegister {
    pub fn new(register: u8) -> Result<Self, ParameterOutOfRange> {
        if register > MAX_ADDRESS {
            return Err(ParameterOutOfRange::ReadRegister(register));
        }
        Ok(Self { register })
    }

    pub fn register(&self) -> u8 {
        self.register
    }
}

impl Command for ReadRegister {
    type IdType = u8;
    type CommandParameters = FrameBody;
    type ResponseParameters = Response;

    fn id() -> Self::IdType {
        Opcode::Read as u8
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        FrameBody {
            address: self.register,
            payload: 0,
        }
    }
}

/// WRITE command (`10`)
///
/// Frame: `10 | register | data`
///
/// What `data` means depends on the register: bandwidth settings, ADC
/// configuration, amplifier power bitmaps. See the RHD2000 datasheet.
/// The chip echoes `0xFF` and the written byte two transactions later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteRegister {
    register: u8,
    data: u8,
}

impl WriteRegister {
    pub fn new(register: u8, data: u8) -> Result<Self, ParameterOutOfRange> {
        if register > MAX_WRITE_REGISTER {
            return Err(ParameterOutOfRange::WriteRegister(register));
        }
        Ok(Self { register, data })
    }

    pub fn register(&self) -> u8 {
        self.register
    }

    pub fn data(&self) -> u8 {
        self.data
    }
}

impl Command for WriteRegister {
    type IdType = u8;
    type CommandParameters = FrameBody;
    type ResponseParameters = Response;

    fn id() -> Self::IdType {
        Opcode::Write as u8
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        FrameBody {
            address: self.register,
            payload: self.data,
        }
    }
}
