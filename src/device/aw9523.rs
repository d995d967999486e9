//! AW9523B 16-bit IO expander / LED driver (Core S3).

use embedded_hal::i2c::I2c;

use super::Direction;
use crate::{
    Error,
    i2c::Register,
};

pub const DEFAULT_ADDR: u8 = 0x58;
pub const CHIP_ID: u8 = 0x23;

const REG_INPUT: [u8; 2] = [0x00, 0x01];
const REG_OUTPUT: [u8; 2] = [0x02, 0x03];
/// 1 = input.
const REG_CONFIG: [u8; 2] = [0x04, 0x05];
const REG_ID: u8 = 0x10;
const REG_GCR: u8 = 0x11;
/// 0 = LED current sink, 1 = GPIO.
const REG_LED_MODE: [u8; 2] = [0x12, 0x13];
const REG_SOFT_RESET: u8 = 0x7f;

/// GCR bit 4: port 0 outputs are push-pull instead of open-drain.
const GCR_P0_PUSH_PULL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    P0 = 0,
    P1 = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Gpio,
    Led,
}

pub struct Aw9523<I> {
    dev: Option<Register<I>>,
}

impl<I: I2c> Default for Aw9523<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: I2c> Aw9523<I> {
    pub const fn new() -> Self {
        Self { dev: None }
    }

    pub fn init(&mut self, i2c: I, address: u8) -> Result<(), Error> {
        if self.dev.is_some() {
            warn!("[Aw9523] already initialized, deinitializing first");
            self.dev = None;
        }
        let mut dev = Register::new(i2c, address);
        let id = dev.read(REG_ID)?;
        if id != CHIP_ID {
            error!("[Aw9523] unexpected chip id {:#x}", id);
            return Err(Error::UnexpectedDevice {
                expected: CHIP_ID,
                found: id,
            });
        }
        self.dev = Some(dev);
        info!("[Aw9523] initialized at {:#x}", address);
        Ok(())
    }

    pub fn deinit(&mut self) {
        self.dev = None;
    }

    pub const fn is_initialized(&self) -> bool {
        self.dev.is_some()
    }

    fn dev(&mut self) -> Result<&mut Register<I>, Error> {
        self.dev.as_mut().ok_or_else(|| {
            error!("[Aw9523] not initialized");
            Error::InvalidState
        })
    }

    fn pin(pin: u8) -> Result<u8, Error> {
        if pin < 8 { Ok(pin) } else { Err(Error::InvalidArgument) }
    }

    /// Applies a `(register, value)` table, as used for board presets.
    pub fn apply(&mut self, table: &[(u8, u8)]) -> Result<(), Error> {
        self.dev()?.write_table(table)
    }

    pub fn set_direction(&mut self, port: Port, pin: u8, direction: Direction) -> Result<(), Error> {
        let pin = Self::pin(pin)?;
        self.dev()?
            .write_bit(REG_CONFIG[port as usize], pin, direction == Direction::Input)
    }

    pub fn set_level(&mut self, port: Port, pin: u8, high: bool) -> Result<(), Error> {
        let pin = Self::pin(pin)?;
        self.dev()?.write_bit(REG_OUTPUT[port as usize], pin, high)
    }

    pub fn level(&mut self, port: Port, pin: u8) -> Result<bool, Error> {
        let pin = Self::pin(pin)?;
        self.dev()?.read_bit(REG_INPUT[port as usize], pin)
    }

    pub fn read_port(&mut self, port: Port) -> Result<u8, Error> {
        self.dev()?.read(REG_INPUT[port as usize])
    }

    pub fn write_port(&mut self, port: Port, value: u8) -> Result<(), Error> {
        self.dev()?.write(REG_OUTPUT[port as usize], value)
    }

    /// Port 0 drive: push-pull when `true`, open-drain otherwise.
    pub fn set_port0_push_pull(&mut self, push_pull: bool) -> Result<(), Error> {
        self.dev()?.write_bit(REG_GCR, GCR_P0_PUSH_PULL, push_pull)
    }

    pub fn set_mode(&mut self, port: Port, pin: u8, mode: PinMode) -> Result<(), Error> {
        let pin = Self::pin(pin)?;
        self.dev()?
            .write_bit(REG_LED_MODE[port as usize], pin, mode == PinMode::Gpio)
    }

    /// Returns every register to its power-on value.
    pub fn soft_reset(&mut self) -> Result<(), Error> {
        self.dev()?.write(REG_SOFT_RESET, 0x00)?;
        info!("[Aw9523] soft reset");
        Ok(())
    }
}
