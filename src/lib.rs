#![no_std]
//! Intan RHD2000 Driver
//!
//! This crate provides a type-safe interface for the Intan RHD2000 series of
//! digital electrophysiology interface chips. The RHD2132, RHD2216 and
//! RHD2164 combine low-noise biopotential amplifiers with a multiplexed
//! 16-bit ADC behind a single SPI port.
//!
//! # Features
//! - 16-bit command framing: READ, WRITE, CONVERT, CALIBRATE
//! - Range-checked register and channel numbers
//! - Pipelined register reads that return the register's current contents
//! - Amplifier power control for two configured channels
//! - Two-channel alternating sampler for a periodic interrupt
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Main device interface for hardware interaction
//!   - Command encoders and the calibration sequence
//!   - Typed register access through the pipelined READ pattern
//!
//! - [`frame`]: 16-bit command frame codec
//!
//! - [`commands`]: Command types for the chip's command set
//!
//! - [`registers`]: Register definitions
//!   - Amplifier power bitmaps (registers 14-15)
//!   - ROM identification (registers 40-44, 60-63)
//!
//! - [`power`]: Amplifier power control and the software power flags
//!
//! - [`sampler`]: Interrupt-driven two-channel conversion loop
//!
//! - [`config`]: Board channel selection and timing constants
//!
//! # Pipelined responses
//! The chip returns the result of each command two commands later. A READ
//! must be repeated three times and the last response kept; a CONVERT
//! returns the sample of the conversion issued two transactions before it.
//!
//! Bring-up follows a specific sequence:
//!
//! 1. Create a new [`Device`] with your SPI device and [`Config`]
//! 2. Optionally check the chip with [`Device::verify_chip`]
//! 3. Configure registers and power with [`Device::set_amp_power`]
//! 4. Run [`Device::calibrate`]
//! 5. Tick a [`Sampler`] from the periodic interrupt
//!
//! # Important Notes
//! - Chip select must frame exactly one 16-bit word; use an `SpiDevice`
//!   whose transactions map to a single CS assertion
//! - Steps 3 and 4 must not interleave with sampling
//! - Powered-off amplifiers do not output zero; the sampler zeroes them
//!
//! # Example
//! ```no_run
//! use embedded_hal::spi::SpiDevice;
//! use intan_rhd::{Config, Device, Error, Sampler};
//!
//! fn start<SPI: SpiDevice>(spi: SPI) -> Result<(Device<SPI>, Sampler), Error<SPI::Error>> {
//!     let config = Config::default().with_channels(0, 15)?;
//!     let mut device = Device::with_config(spi, config);
//!
//!     device.set_amp_power(true, false)?;
//!     device.calibrate()?;
//!
//!     let sampler = Sampler::new(device.config());
//!     Ok((device, sampler))
//! }
//! ```

pub mod commands;
pub mod config;
pub mod device;
pub mod errors;
pub mod frame;
pub mod power;
pub mod registers;
pub mod sampler;

pub use commands::*;
pub use config::Config;
pub use device::Device;
pub use errors::{Error, ParameterOutOfRange};
pub use frame::{CommandFrame, Opcode, Response, Sample, PIPELINE_DEPTH};
pub use power::{PowerState, Slot};
pub use registers::*;
pub use sampler::{Reading, Sampler};
