//! A software RHD chip for driving the full command pipeline in tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

pub const PIPELINE_DEPTH: usize = 2;

/// Models the chip's register file and its two-command response delay.
pub struct SimulatedRhd {
    pub registers: [u8; 64],
    /// Every frame received, in order
    pub received: Vec<u16>,
    /// Channels whose high-pass filter was reset
    pub filter_resets: Vec<u8>,
    pending: VecDeque<u16>,
}

impl SimulatedRhd {
    pub fn new() -> Self {
        let mut registers = [0u8; 64];
        registers[40..45].copy_from_slice(b"INTAN");
        registers[60] = 1;
        registers[61] = 0;
        registers[62] = 16;
        registers[63] = 2;
        Self {
            registers,
            received: Vec::new(),
            filter_resets: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Sample value the simulated ADC produces for a channel
    pub fn sample_for(channel: u8) -> u16 {
        1000 + channel as u16
    }

    pub fn writes(&self) -> Vec<u16> {
        self.received
            .iter()
            .copied()
            .filter(|frame| frame >> 14 == 0b10)
            .collect()
    }

    fn execute(&mut self, frame: u16) -> u16 {
        let address = ((frame >> 8) & 0x3F) as u8;
        let payload = (frame & 0xFF) as u8;
        match frame >> 14 {
            0b11 => self.registers[address as usize] as u16,
            0b10 => {
                if address <= 17 {
                    self.registers[address as usize] = payload;
                }
                0xFF00 | payload as u16
            }
            0b00 => {
                if payload & 0x01 != 0 {
                    self.filter_resets.push(address);
                }
                Self::sample_for(address)
            }
            _ => 0,
        }
    }

    fn exchange(&mut self, frame: u16) -> u16 {
        self.received.push(frame);
        let result = self.execute(frame);
        self.pending.push_back(result);
        if self.pending.len() > PIPELINE_DEPTH {
            self.pending.pop_front().unwrap_or(0)
        } else {
            0
        }
    }
}

impl ErrorType for SimulatedRhd {
    type Error = Infallible;
}

impl SpiDevice for SimulatedRhd {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::TransferInPlace(word) => {
                    assert_eq!(word.len(), 2, "every RHD transaction is one 16-bit frame");
                    let reply = self.exchange(u16::from_be_bytes([word[0], word[1]]));
                    word.copy_from_slice(&reply.to_be_bytes());
                }
                _ => panic!("driver only issues transfer-in-place operations"),
            }
        }
        Ok(())
    }
}
