//! PI4IOE5V6408 8-bit I2C IO expander.
//!
//! The Tab5 carries two of them: 0x43 (LCD, touch and speaker enables) and
//! 0x44 (USB and Wi-Fi enables).

use embedded_hal::i2c::I2c;

use super::Direction;
use crate::{
    Error,
    i2c::Register,
};

/// Address with the ADDR pin low.
pub const ADDR_LOW: u8 = 0x43;
/// Address with the ADDR pin high.
pub const ADDR_HIGH: u8 = 0x44;

pub const PIN_COUNT: u8 = 8;

const REG_DEVICE_ID: u8 = 0x01;
const REG_DIRECTION: u8 = 0x03;
const REG_OUTPUT: u8 = 0x05;
const REG_OUTPUT_HIGH_Z: u8 = 0x07;
const REG_PULL_ENABLE: u8 = 0x0b;
const REG_PULL_SELECT: u8 = 0x0d;
const REG_INPUT: u8 = 0x0f;

/// Manufacturer ID in bits 7:5 of the device-ID register.
const MANUFACTURER_ID: u8 = 0b101;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    PushPull,
    OpenDrain,
}

pub struct Pi4ioe5v6408<I> {
    name: &'static str,
    dev: Option<Register<I>>,
}

impl<I: I2c> Pi4ioe5v6408<I> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, dev: None }
    }

    /// Probes the chip and puts every pin back to input.
    pub fn init(&mut self, i2c: I, address: u8) -> Result<(), Error> {
        if self.dev.is_some() {
            warn!("[{}] already initialized, deinitializing first", self.name);
            self.deinit();
        }

        let mut dev = Register::new(i2c, address);
        let id = dev.read(REG_DEVICE_ID).inspect_err(|e| {
            error!("[{}] no answer at {:#x}: {}", self.name, address, e.name());
        })?;
        if id >> 5 != MANUFACTURER_ID {
            error!("[{}] unexpected device id {:#x}", self.name, id);
            return Err(Error::UnexpectedDevice {
                expected: MANUFACTURER_ID,
                found: id >> 5,
            });
        }

        dev.write(REG_DIRECTION, 0x00)?;
        dev.write(REG_OUTPUT, 0x00)?;
        dev.write(REG_OUTPUT_HIGH_Z, 0x00)?;

        self.dev = Some(dev);
        info!("[{}] initialized at {:#x}", self.name, address);
        Ok(())
    }

    pub fn deinit(&mut self) {
        if self.dev.take().is_some() {
            info!("[{}] deinitialized", self.name);
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.dev.is_some()
    }

    fn dev(&mut self, pin: u8) -> Result<&mut Register<I>, Error> {
        if pin >= PIN_COUNT {
            error!("[{}] invalid pin {}", self.name, pin);
            return Err(Error::InvalidArgument);
        }
        self.dev.as_mut().ok_or_else(|| {
            error!("[{}] not initialized", self.name);
            Error::InvalidState
        })
    }

    pub fn set_direction(&mut self, pin: u8, direction: Direction) -> Result<(), Error> {
        self.dev(pin)?
            .write_bit(REG_DIRECTION, pin, direction == Direction::Output)
    }

    pub fn set_level(&mut self, pin: u8, high: bool) -> Result<(), Error> {
        self.dev(pin)?.write_bit(REG_OUTPUT, pin, high)
    }

    /// Level seen on the pin's input buffer.
    pub fn level(&mut self, pin: u8) -> Result<bool, Error> {
        self.dev(pin)?.read_bit(REG_INPUT, pin)
    }

    pub fn set_pull(&mut self, pin: u8, pull: Pull) -> Result<(), Error> {
        let dev = self.dev(pin)?;
        match pull {
            Pull::None => dev.write_bit(REG_PULL_ENABLE, pin, false),
            Pull::Up | Pull::Down => {
                dev.write_bit(REG_PULL_SELECT, pin, pull == Pull::Up)?;
                dev.write_bit(REG_PULL_ENABLE, pin, true)
            }
        }
    }

    /// Push-pull drives the pin. Open-drain outputs do not exist on this chip.
    pub fn set_output_mode(&mut self, pin: u8, mode: OutputMode) -> Result<(), Error> {
        let dev = self.dev(pin)?;
        match mode {
            OutputMode::PushPull => dev.write_bit(REG_OUTPUT_HIGH_Z, pin, false),
            OutputMode::OpenDrain => {
                error!("[{}] open-drain output not supported", self.name);
                Err(Error::Unsupported)
            }
        }
    }

    /// Logs direction, output latch and input level of every pin.
    pub fn print_state(&mut self) -> Result<(), Error> {
        let name = self.name;
        let dev = self.dev(0)?;
        let direction = dev.read(REG_DIRECTION)?;
        let output = dev.read(REG_OUTPUT)?;
        let input = dev.read(REG_INPUT)?;
        info!(
            "[{}] dir {:#b} out {:#b} in {:#b}",
            name, direction, output, input
        );
        for pin in 0..PIN_COUNT {
            let bit = 1 << pin;
            info!(
                "[{}]   P{}: {} out={} in={}",
                name,
                pin,
                if direction & bit != 0 { "output" } else { "input" },
                u8::from(output & bit != 0),
                u8::from(input & bit != 0)
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        FakeI2c,
        Journal,
    };

    fn expander(journal: &Journal) -> (FakeI2c, Pi4ioe5v6408<FakeI2c>) {
        let i2c = FakeI2c::new(journal);
        i2c.add_device(ADDR_LOW);
        i2c.set_reg(ADDR_LOW, REG_DEVICE_ID.into(), 0xa2);
        i2c.set_reg(ADDR_LOW, REG_DIRECTION.into(), 0xff);
        i2c.set_reg(ADDR_LOW, REG_OUTPUT_HIGH_Z.into(), 0xff);
        let mut exp = Pi4ioe5v6408::new("IoExpander0");
        exp.init(i2c.clone(), ADDR_LOW).unwrap();
        (i2c, exp)
    }

    #[test]
    fn init_resets_pins_to_inputs() {
        let journal = Journal::default();
        let (i2c, _exp) = expander(&journal);

        assert_eq!(i2c.reg(ADDR_LOW, REG_DIRECTION.into()), 0x00);
        assert_eq!(i2c.reg(ADDR_LOW, REG_OUTPUT_HIGH_Z.into()), 0x00);
    }

    #[test]
    fn init_rejects_a_foreign_chip() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(ADDR_HIGH);
        i2c.set_reg(ADDR_HIGH, REG_DEVICE_ID.into(), 0x23);
        let mut exp = Pi4ioe5v6408::new("IoExpander1");

        assert_eq!(
            exp.init(i2c, ADDR_HIGH),
            Err(Error::UnexpectedDevice {
                expected: 0b101,
                found: 0b001
            })
        );
        assert!(!exp.is_initialized());
    }

    #[test]
    fn absent_chip_reports_the_bus_error() {
        let journal = Journal::default();
        let mut exp = Pi4ioe5v6408::new("IoExpander0");

        let r = exp.init(FakeI2c::new(&journal), ADDR_LOW);

        assert!(matches!(r, Err(Error::I2c(_))));
    }

    #[test]
    fn pin_writes_touch_only_their_bit() {
        let journal = Journal::default();
        let (i2c, mut exp) = expander(&journal);
        i2c.set_reg(ADDR_LOW, REG_OUTPUT.into(), 0b0100_0001);

        exp.set_direction(4, Direction::Output).unwrap();
        exp.set_level(4, true).unwrap();
        exp.set_level(0, false).unwrap();

        assert_eq!(i2c.reg(ADDR_LOW, REG_DIRECTION.into()), 0b0001_0000);
        assert_eq!(i2c.reg(ADDR_LOW, REG_OUTPUT.into()), 0b0101_0000);
    }

    #[test]
    fn pull_and_output_mode() {
        let journal = Journal::default();
        let (i2c, mut exp) = expander(&journal);
        i2c.set_reg(ADDR_LOW, REG_OUTPUT_HIGH_Z.into(), 0xff);

        exp.set_pull(2, Pull::Down).unwrap();
        exp.set_pull(3, Pull::Up).unwrap();
        exp.set_output_mode(4, OutputMode::PushPull).unwrap();

        assert_eq!(i2c.reg(ADDR_LOW, REG_PULL_ENABLE.into()), 0b0000_1100);
        assert_eq!(i2c.reg(ADDR_LOW, REG_PULL_SELECT.into()), 0b0000_1000);
        assert_eq!(i2c.reg(ADDR_LOW, REG_OUTPUT_HIGH_Z.into()), 0b1110_1111);
        assert_eq!(
            exp.set_output_mode(4, OutputMode::OpenDrain),
            Err(Error::Unsupported)
        );
    }

    #[test]
    fn level_reads_the_input_register() {
        let journal = Journal::default();
        let (i2c, mut exp) = expander(&journal);
        i2c.set_reg(ADDR_LOW, REG_INPUT.into(), 0b1000_0000);

        assert_eq!(exp.level(7), Ok(true));
        assert_eq!(exp.level(6), Ok(false));
        assert_eq!(exp.level(8), Err(Error::InvalidArgument));
        exp.print_state().unwrap();
    }

    #[test]
    fn accessors_before_init_stay_off_the_bus() {
        let journal = Journal::default();
        let mut exp: Pi4ioe5v6408<FakeI2c> = Pi4ioe5v6408::new("IoExpander0");

        assert_eq!(exp.set_level(4, true), Err(Error::InvalidState));
        assert_eq!(exp.level(4), Err(Error::InvalidState));
        assert!(journal.events().is_empty());
    }

    #[test]
    fn reinit_moves_to_the_new_address() {
        let journal = Journal::default();
        let (i2c, mut exp) = expander(&journal);
        i2c.add_device(ADDR_HIGH);
        i2c.set_reg(ADDR_HIGH, REG_DEVICE_ID.into(), 0xa2);
        i2c.set_reg(ADDR_HIGH, REG_DIRECTION.into(), 0xff);
        journal.clear();

        exp.init(i2c.clone(), ADDR_HIGH).unwrap();
        exp.set_direction(1, Direction::Output).unwrap();

        assert!(exp.is_initialized());
        assert_eq!(journal.count("i2c 0x43"), 0);
        assert_eq!(i2c.reg(ADDR_HIGH, REG_DIRECTION.into()), 0b0000_0010);
        assert_eq!(i2c.reg(ADDR_LOW, REG_DIRECTION.into()), 0x00);
    }

    #[test]
    fn failed_reinit_leaves_the_expander_released() {
        let journal = Journal::default();
        let (i2c, mut exp) = expander(&journal);
        journal.clear();

        assert!(matches!(exp.init(i2c, ADDR_HIGH), Err(Error::I2c(_))));
        assert!(!exp.is_initialized());
        assert_eq!(exp.set_level(0, true), Err(Error::InvalidState));
        assert_eq!(journal.count("i2c 0x43"), 0);
    }
}
