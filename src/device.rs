//! RHD2000 Device Interface
//!
//! This module provides the interface for talking to an RHD2000 series chip
//! over SPI. It supports both synchronous and asynchronous operations.
//!
//! Each command is one 16-bit word sent in a single [`SpiDevice`] transaction,
//! so chip select is asserted around exactly one frame. The chip answers two
//! transactions late (see [`PIPELINE_DEPTH`]); the typed register accessors
//! account for this, the raw `send_*` encoders do not.
//!
//! [`SpiDevice`]: embedded_hal::spi::SpiDevice
//!
//! # Example
//! ```no_run
//! use embedded_hal::spi::SpiDevice;
//! use intan_rhd::{Device, Error};
//!
//! fn bring_up<SPI: SpiDevice>(spi: SPI) -> Result<Device<SPI>, Error<SPI::Error>> {
//!     let mut device = Device::new(spi);
//!
//!     device.verify_chip()?;
//!     device.set_amp_power(true, true)?;
//!     device.calibrate()?;
//!
//!     Ok(device)
//! }
//! ```

use core::convert::Infallible;

use regiface::{
    Command, FromByteArray, ReadableRegister, ToByteArray, WritableRegister,
};

use crate::commands::{Calibrate, Channel, Convert, ReadRegister, WriteRegister};
use crate::config::Config;
use crate::errors::Error;
use crate::frame::{CommandFrame, Opcode, Response, Sample, PIPELINE_DEPTH};
use crate::power::PowerState;
use crate::registers::{AmplifierCount, ChipId, COMPANY_ID, COMPANY_ID_FIRST};

/// Main device interface for an RHD2000 chip.
///
/// Owns the SPI device, the board [`Config`] and the software-side
/// [`PowerState`] flags.
pub struct Device<SPI> {
    spi: SPI,
    pub(crate) config: Config,
    pub(crate) power: PowerState,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device with the default [`Config`].
    pub fn new(spi: SPI) -> Self {
        Self::with_config(spi, Config::default())
    }

    /// Creates a new Device with a board-specific [`Config`].
    pub fn with_config(spi: SPI, config: Config) -> Self {
        Self {
            spi,
            config,
            power: PowerState::default(),
        }
    }

    /// Configuration the device was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Power flags as last set by [`set_amp_power`](Device::set_amp_power)
    pub fn power_state(&self) -> &PowerState {
        &self.power
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

/// Splits a command into the frame that carries it.
fn frame_for<C, E>(command: C) -> Result<CommandFrame, Error<E>>
where
    C: Command<IdType = u8>,
    C::CommandParameters: ToByteArray<Error = Infallible, Array = [u8; 2]>,
{
    let [address, payload] = command
        .invoking_parameters()
        .to_bytes()
        .unwrap_or_else(|e| match e {});
    Ok(CommandFrame::new(Opcode::try_from(C::id())?, address, payload)?)
}

fn response_into<R>(response: Response) -> R
where
    R: FromByteArray<Error = Infallible, Array = [u8; 2]>,
{
    R::from_bytes(response.bits().to_be_bytes()).unwrap_or_else(|e| match e {})
}

fn register_into<R, E>(value: u8) -> Result<R, Error<E>>
where
    R: ReadableRegister<IdType = u8, Array = [u8; 1]>,
{
    R::from_bytes([value]).map_err(|_| Error::InvalidRegisterValue {
        register: R::id(),
        value,
    })
}

fn register_byte<R>(register: R) -> u8
where
    R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
{
    let [data] = register.to_bytes().unwrap_or_else(|e| match e {});
    data
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Exchanges one frame with the chip.
    ///
    /// Returns the word clocked back during this transaction, which answers
    /// the frame sent [`PIPELINE_DEPTH`] transactions earlier.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    pub fn transfer(&mut self, frame: CommandFrame) -> Result<Response, Error<SPI::Error>> {
        let mut word = frame.bits().to_be_bytes();

        self.spi
            .transaction(&mut [embedded_hal::spi::Operation::TransferInPlace(&mut word)])
            .map_err(Error::Spi)?;

        Ok(Response(u16::from_be_bytes(word)))
    }

    /// Executes a command on the device.
    ///
    /// # Type Parameters
    /// * `C` - Command whose id is the opcode and whose parameters are
    ///   `[address, payload]`
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - opcode or address does not fit the frame
    pub fn execute_command<C>(&mut self, command: C) -> Result<C::ResponseParameters, Error<SPI::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible, Array = [u8; 2]>,
        C::ResponseParameters: FromByteArray<Error = Infallible, Array = [u8; 2]>,
    {
        let frame = frame_for(command)?;
        let response = self.transfer(frame)?;
        Ok(response_into(response))
    }

    /// Sends READ for register 0-63 and returns the pipelined response.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - register above 63
    pub fn send_read(&mut self, register: u8) -> Result<Response, Error<SPI::Error>> {
        self.execute_command(ReadRegister::new(register)?)
    }

    /// Sends WRITE of `data` to RAM register 0-17.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - register above 17
    pub fn send_write(&mut self, register: u8, data: u8) -> Result<Response, Error<SPI::Error>> {
        self.execute_command(WriteRegister::new(register, data)?)
    }

    /// Sends CONVERT for channel 0-63.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - channel above 63
    pub fn send_convert(&mut self, channel: u8) -> Result<Sample, Error<SPI::Error>> {
        self.execute_command(Convert::new(Channel::new(channel)?))
    }

    /// Sends CONVERT for channel 0-63 and resets its high-pass filter.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - channel above 63
    pub fn send_convert_h(&mut self, channel: u8) -> Result<Sample, Error<SPI::Error>> {
        self.execute_command(Convert::with_filter_reset(Channel::new(channel)?))
    }

    /// Reads the current contents of a register.
    ///
    /// Sends the same READ `PIPELINE_DEPTH + 1` times and keeps the last
    /// response, which answers the first of them.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - register above 63
    pub fn read_register_value(&mut self, register: u8) -> Result<u8, Error<SPI::Error>> {
        let command = ReadRegister::new(register)?;
        let mut response = Response::default();
        for _ in 0..=PIPELINE_DEPTH {
            response = self.execute_command(command)?;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("register {=u8} = {=u8:#x}", register, response.register_value());

        Ok(response.register_value())
    }

    /// Reads a register value from the device.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::InvalidRegisterValue` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8, Array = [u8; 1]>,
    {
        let value = self.read_register_value(R::id())?;
        register_into(value)
    }

    /// Writes a value to a device register.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::ParameterOutOfRange` - `R` is not a RAM register
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        self.send_write(R::id(), register_byte(register))?;
        Ok(())
    }

    /// Read-modify-write of a register.
    ///
    /// Returns the value written.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::InvalidRegisterValue` - Failed to parse register value
    pub fn modify_register<R, F>(&mut self, f: F) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8, Array = [u8; 1]>
            + WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>
            + Copy,
        F: FnOnce(R) -> R,
    {
        let value = f(self.read_register::<R>()?);
        self.write_register(value)?;
        Ok(value)
    }

    /// Runs the ADC self-calibration sequence.
    ///
    /// Sends CALIBRATE followed by `Config::calibration_cycles` dummy READs.
    /// Call once after power-up and register configuration, before trusting
    /// any conversion.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed, the sequence stops there
    /// * `Error::ParameterOutOfRange` - `Config::dummy_register` above 63
    pub fn calibrate(&mut self) -> Result<(), Error<SPI::Error>> {
        let dummy = ReadRegister::new(self.config.dummy_register)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("calibrating, {=u8} dummy cycles", self.config.calibration_cycles);

        self.execute_command(Calibrate)?;
        for _ in 0..self.config.calibration_cycles {
            self.execute_command(dummy)?;
        }
        Ok(())
    }

    /// Reads ROM registers 40-44.
    ///
    /// The five READs are sent back to back, followed by two dummy READs to
    /// drain the pipeline.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    pub fn read_company_id(&mut self) -> Result<[u8; 5], Error<SPI::Error>> {
        let mut id = [0u8; 5];
        let last = COMPANY_ID_FIRST + id.len() as u8 - 1;
        for i in 0..id.len() + PIPELINE_DEPTH {
            let register = (COMPANY_ID_FIRST + i as u8).min(last);
            let response = self.send_read(register)?;
            if let Some(slot) = i.checked_sub(PIPELINE_DEPTH) {
                id[slot] = response.register_value();
            }
        }
        Ok(id)
    }

    /// Reads ROM register 63.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    /// * `Error::InvalidRegisterValue` - the ID is not a known RHD variant
    pub fn read_chip_id(&mut self) -> Result<ChipId, Error<SPI::Error>> {
        self.read_register::<ChipId>()
    }

    /// Reads the number of amplifiers on the die from ROM register 62.
    ///
    /// # Errors
    /// * `Error::Spi` - SPI communication failed
    pub fn read_amplifier_count(&mut self) -> Result<u8, Error<SPI::Error>> {
        Ok(self.read_register::<AmplifierCount>()?.count)
    }

    /// Checks the `INTAN` signature and returns the chip variant.
    ///
    /// # Errors
    /// * `Error::NotDetected` - ROM registers 40-44 did not read `INTAN`
    pub fn verify_chip(&mut self) -> Result<ChipId, Error<SPI::Error>> {
        if self.read_company_id()? != COMPANY_ID {
            #[cfg(feature = "defmt")]
            defmt::warn!("RHD signature missing");
            return Err(Error::NotDetected);
        }
        let chip = self.read_chip_id()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("found {}", chip);

        Ok(chip)
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously exchanges one frame with the chip.
    ///
    /// This is the async version of [`transfer`](Device::transfer).
    pub async fn transfer_async(&mut self, frame: CommandFrame) -> Result<Response, Error<SPI::Error>> {
        let mut word = frame.bits().to_be_bytes();

        self.spi
            .transaction(&mut [embedded_hal_async::spi::Operation::TransferInPlace(&mut word)])
            .await
            .map_err(Error::Spi)?;

        Ok(Response(u16::from_be_bytes(word)))
    }

    /// Asynchronously executes a command on the device.
    ///
    /// This is the async version of [`execute_command`](Device::execute_command).
    pub async fn execute_command_async<C>(
        &mut self,
        command: C,
    ) -> Result<C::ResponseParameters, Error<SPI::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible, Array = [u8; 2]>,
        C::ResponseParameters: FromByteArray<Error = Infallible, Array = [u8; 2]>,
    {
        let frame = frame_for(command)?;
        let response = self.transfer_async(frame).await?;
        Ok(response_into(response))
    }

    /// This is the async version of [`send_read`](Device::send_read).
    pub async fn send_read_async(&mut self, register: u8) -> Result<Response, Error<SPI::Error>> {
        self.execute_command_async(ReadRegister::new(register)?).await
    }

    /// This is the async version of [`send_write`](Device::send_write).
    pub async fn send_write_async(
        &mut self,
        register: u8,
        data: u8,
    ) -> Result<Response, Error<SPI::Error>> {
        self.execute_command_async(WriteRegister::new(register, data)?)
            .await
    }

    /// This is the async version of [`send_convert`](Device::send_convert).
    pub async fn send_convert_async(&mut self, channel: u8) -> Result<Sample, Error<SPI::Error>> {
        self.execute_command_async(Convert::new(Channel::new(channel)?))
            .await
    }

    /// This is the async version of [`send_convert_h`](Device::send_convert_h).
    pub async fn send_convert_h_async(&mut self, channel: u8) -> Result<Sample, Error<SPI::Error>> {
        self.execute_command_async(Convert::with_filter_reset(Channel::new(channel)?))
            .await
    }

    /// This is the async version of [`read_register_value`](Device::read_register_value).
    pub async fn read_register_value_async(&mut self, register: u8) -> Result<u8, Error<SPI::Error>> {
        let command = ReadRegister::new(register)?;
        let mut response = Response::default();
        for _ in 0..=PIPELINE_DEPTH {
            response = self.execute_command_async(command).await?;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("register {=u8} = {=u8:#x}", register, response.register_value());

        Ok(response.register_value())
    }

    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8, Array = [u8; 1]>,
    {
        let value = self.read_register_value_async(R::id()).await?;
        register_into(value)
    }

    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        self.send_write_async(R::id(), register_byte(register))
            .await?;
        Ok(())
    }

    /// This is the async version of [`calibrate`](Device::calibrate).
    pub async fn calibrate_async(&mut self) -> Result<(), Error<SPI::Error>> {
        let dummy = ReadRegister::new(self.config.dummy_register)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("calibrating, {=u8} dummy cycles", self.config.calibration_cycles);

        self.execute_command_async(Calibrate).await?;
        for _ in 0..self.config.calibration_cycles {
            self.execute_command_async(dummy).await?;
        }
        Ok(())
    }
}
