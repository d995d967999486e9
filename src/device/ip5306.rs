//! IP5306 power bank SoC (charger and boost converter).

use embedded_hal::i2c::I2c;

use crate::{
    Error,
    i2c::Register,
};

pub const DEFAULT_ADDR: u8 = 0x75;

const REG_CHARGER_CTL0: u8 = 0x20;
const REG_READ1: u8 = 0x71;
const READ1_CHARGING_BIT: u8 = 3;
const CHARGER_VOLTAGE_MASK: u8 = 0b11;

/// Charge termination voltage, CHARGER_CTL0 bits 1:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargerVoltage {
    V4_2 = 0b00,
    V4_3 = 0b01,
    V4_35 = 0b10,
    V4_4 = 0b11,
}

impl ChargerVoltage {
    const fn from_bits(bits: u8) -> Self {
        match bits & CHARGER_VOLTAGE_MASK {
            0b00 => Self::V4_2,
            0b01 => Self::V4_3,
            0b10 => Self::V4_35,
            _ => Self::V4_4,
        }
    }
}

pub struct Ip5306<I> {
    dev: Option<Register<I>>,
}

impl<I: I2c> Default for Ip5306<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: I2c> Ip5306<I> {
    pub const fn new() -> Self {
        Self { dev: None }
    }

    /// The chip has no ID register; a successful read of CHARGER_CTL0 is
    /// taken as presence.
    pub fn init(&mut self, i2c: I, address: u8) -> Result<(), Error> {
        let mut dev = Register::new(i2c, address);
        dev.read(REG_CHARGER_CTL0).inspect_err(|e| {
            error!("[Ip5306] not found at {:#x}: {}", address, e.name());
        })?;
        self.dev = Some(dev);
        info!("[Ip5306] initialized");
        Ok(())
    }

    pub fn deinit(&mut self) {
        self.dev = None;
    }

    fn dev(&mut self) -> Result<&mut Register<I>, Error> {
        self.dev.as_mut().ok_or_else(|| {
            error!("[Ip5306] not initialized");
            Error::InvalidState
        })
    }

    pub fn charging_status(&mut self) -> Result<bool, Error> {
        self.dev()?
            .read_bit(REG_READ1, READ1_CHARGING_BIT)
            .inspect_err(|_| warn!("[Ip5306] failed to read charging status"))
    }

    pub fn set_charger_voltage(&mut self, voltage: ChargerVoltage) -> Result<(), Error> {
        self.dev()?
            .write_bits(REG_CHARGER_CTL0, CHARGER_VOLTAGE_MASK, voltage as u8)
    }

    pub fn charger_voltage(&mut self) -> Result<ChargerVoltage, Error> {
        let bits = self
            .dev()?
            .read_bits(REG_CHARGER_CTL0, CHARGER_VOLTAGE_MASK)
            .inspect_err(|_| warn!("[Ip5306] failed to read charger voltage"))?;
        Ok(ChargerVoltage::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        FakeI2c,
        Journal,
    };

    #[test]
    fn charger_voltage_round_trips_through_the_low_bits() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        i2c.set_reg(DEFAULT_ADDR, REG_CHARGER_CTL0.into(), 0b1010_0100);
        let mut ip = Ip5306::new();
        ip.init(i2c.clone(), DEFAULT_ADDR).unwrap();

        ip.set_charger_voltage(ChargerVoltage::V4_35).unwrap();

        assert_eq!(i2c.reg(DEFAULT_ADDR, REG_CHARGER_CTL0.into()), 0b1010_0110);
        assert_eq!(ip.charger_voltage(), Ok(ChargerVoltage::V4_35));
    }

    #[test]
    fn charging_is_read1_bit_three() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        i2c.set_reg(DEFAULT_ADDR, REG_READ1.into(), 0b0000_1000);
        let mut ip = Ip5306::new();
        ip.init(i2c.clone(), DEFAULT_ADDR).unwrap();

        assert_eq!(ip.charging_status(), Ok(true));
        i2c.set_reg(DEFAULT_ADDR, REG_READ1.into(), 0b1111_0111);
        assert_eq!(ip.charging_status(), Ok(false));
    }

    #[test]
    fn read_failures_propagate() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        let mut ip = Ip5306::new();
        ip.init(i2c.clone(), DEFAULT_ADDR).unwrap();
        i2c.remove_device(DEFAULT_ADDR);

        assert!(matches!(ip.charger_voltage(), Err(Error::I2c(_))));
        assert!(matches!(ip.charging_status(), Err(Error::I2c(_))));
    }

    #[test]
    fn accessors_before_init_touch_no_bus() {
        let journal = Journal::default();
        let mut ip: Ip5306<FakeI2c> = Ip5306::new();

        assert_eq!(ip.charging_status(), Err(Error::InvalidState));
        assert_eq!(ip.charger_voltage(), Err(Error::InvalidState));
        assert_eq!(
            ip.set_charger_voltage(ChargerVoltage::V4_2),
            Err(Error::InvalidState)
        );
        assert!(journal.events().is_empty());

        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        ip.init(i2c, DEFAULT_ADDR).unwrap();
        ip.deinit();
        journal.clear();
        assert_eq!(ip.charging_status(), Err(Error::InvalidState));
        assert!(journal.events().is_empty());
    }
}
