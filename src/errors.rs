//! Error types
//!
//! Bus failures are passed through untouched. Everything else the driver can
//! reject is a value that does not fit the RHD command format, caught before
//! the frame reaches the bus.

/// Driver error, generic over the SPI device's error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE> {
    /// The underlying SPI transaction failed
    Spi(SpiE),
    /// A register, channel or opcode did not fit its field
    ParameterOutOfRange(ParameterOutOfRange),
    /// A register read back a value its type does not define
    InvalidRegisterValue { register: u8, value: u8 },
    /// ROM registers 40-44 did not read back `INTAN`
    NotDetected,
}

impl<E: core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(err) => write!(f, "SPI communication error: {}", err),
            Error::ParameterOutOfRange(param) => write!(f, "Parameter out of range: {}", param),
            Error::InvalidRegisterValue { register, value } => {
                write!(f, "Register {} holds unexpected value {:#04x}", register, value)
            }
            Error::NotDetected => write!(f, "RHD chip not detected"),
        }
    }
}

/// A value rejected while building a command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterOutOfRange {
    /// READ register number above 63
    ReadRegister(u8),
    /// WRITE register number above 17
    WriteRegister(u8),
    /// Amplifier channel above 63
    Channel(u8),
    /// Channel above 15 handed to the power controller
    PowerChannel(u8),
    /// Opcode wider than two bits
    Opcode(u8),
}

impl core::fmt::Display for ParameterOutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterOutOfRange::ReadRegister(value) => {
                write!(f, "Invalid READ register: {}", value)
            }
            ParameterOutOfRange::WriteRegister(value) => {
                write!(f, "Invalid WRITE register: {}", value)
            }
            ParameterOutOfRange::Channel(value) => {
                write!(f, "Invalid amplifier channel: {}", value)
            }
            ParameterOutOfRange::PowerChannel(value) => {
                write!(f, "Channel {} has no amplifier power bit", value)
            }
            ParameterOutOfRange::Opcode(value) => {
                write!(f, "Invalid opcode: {:#04b}", value)
            }
        }
    }
}

impl<SpiE> From<ParameterOutOfRange> for Error<SpiE> {
    fn from(e: ParameterOutOfRange) -> Self {
        Error::ParameterOutOfRange(e)
    }
}
