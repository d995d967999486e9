//! AXP2101 power management IC.
//!
//! Only the LDO rails, the gauge and the charge state are covered; the
//! DC-DC converters keep their OTP defaults.

use embedded_hal::i2c::I2c;

use crate::{
    Error,
    i2c::Register,
};

pub const DEFAULT_ADDR: u8 = 0x34;
pub const CHIP_ID: u8 = 0x4a;
/// Older silicon revision, register compatible.
const CHIP_ID_ALT: u8 = 0x47;

const REG_STATUS2: u8 = 0x01;
const REG_CHIP_ID: u8 = 0x03;
const REG_LDO_ONOFF: u8 = 0x90;
const REG_BATTERY_PERCENT: u8 = 0xa4;

/// Bits 6:5 of STATUS2: battery current direction, `01` = charging.
const STATUS2_CHARGE_MASK: u8 = 0b0110_0000;
const STATUS2_CHARGING: u8 = 0b0010_0000;

const LDO_VOLTAGE_MASK: u8 = 0x1f;
const LDO_MIN_MV: u16 = 500;
const LDO_MAX_MV: u16 = 3500;
const LDO_STEP_MV: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ldo {
    Aldo1,
    Aldo2,
    Aldo3,
    Aldo4,
    Bldo1,
    Bldo2,
    Dldo1,
}

impl Ldo {
    /// Bit in the LDO on/off register.
    const fn enable_bit(self) -> u8 {
        match self {
            Self::Aldo1 => 0,
            Self::Aldo2 => 1,
            Self::Aldo3 => 2,
            Self::Aldo4 => 3,
            Self::Bldo1 => 4,
            Self::Bldo2 => 5,
            Self::Dldo1 => 7,
        }
    }

    const fn voltage_reg(self) -> u8 {
        match self {
            Self::Aldo1 => 0x92,
            Self::Aldo2 => 0x93,
            Self::Aldo3 => 0x94,
            Self::Aldo4 => 0x95,
            Self::Bldo1 => 0x96,
            Self::Bldo2 => 0x97,
            Self::Dldo1 => 0x99,
        }
    }

    /// Register value for `mv`; 500..=3500 mV in 100 mV steps.
    pub const fn voltage_code(mv: u16) -> Option<u8> {
        if mv < LDO_MIN_MV || mv > LDO_MAX_MV {
            return None;
        }
        Some(((mv - LDO_MIN_MV) / LDO_STEP_MV) as u8)
    }
}

pub struct Axp2101<I> {
    dev: Option<Register<I>>,
}

impl<I: I2c> Default for Axp2101<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: I2c> Axp2101<I> {
    pub const fn new() -> Self {
        Self { dev: None }
    }

    pub fn init(&mut self, i2c: I, address: u8) -> Result<(), Error> {
        if self.dev.is_some() {
            warn!("[Axp2101] already initialized, deinitializing first");
            self.dev = None;
        }
        let mut dev = Register::new(i2c, address);
        let id = dev.read(REG_CHIP_ID)?;
        if id != CHIP_ID && id != CHIP_ID_ALT {
            error!("[Axp2101] unexpected chip id {:#x}", id);
            return Err(Error::UnexpectedDevice {
                expected: CHIP_ID,
                found: id,
            });
        }
        self.dev = Some(dev);
        info!("[Axp2101] initialized, chip id {:#x}", id);
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
            error!("[Axp2101] not initialized");
            Error::InvalidState
        })
    }

    /// Writes a static `(register, value)` init table in order.
    pub fn apply(&mut self, table: &[(u8, u8)]) -> Result<(), Error> {
        self.dev()?.write_table(table)
    }

    pub fn set_ldo_enabled(&mut self, ldo: Ldo, on: bool) -> Result<(), Error> {
        self.dev()?.write_bit(REG_LDO_ONOFF, ldo.enable_bit(), on)
    }

    pub fn is_ldo_enabled(&mut self, ldo: Ldo) -> Result<bool, Error> {
        self.dev()?.read_bit(REG_LDO_ONOFF, ldo.enable_bit())
    }

    pub fn set_ldo_voltage(&mut self, ldo: Ldo, mv: u16) -> Result<(), Error> {
        let Some(code) = Ldo::voltage_code(mv) else {
            error!("[Axp2101] {} mV out of range", mv);
            return Err(Error::InvalidArgument);
        };
        self.dev()?
            .write_bits(ldo.voltage_reg(), LDO_VOLTAGE_MASK, code)
    }

    pub fn ldo_voltage(&mut self, ldo: Ldo) -> Result<u16, Error> {
        let code = self.dev()?.read_bits(ldo.voltage_reg(), LDO_VOLTAGE_MASK)?;
        Ok(LDO_MIN_MV + u16::from(code) * LDO_STEP_MV)
    }

    /// Fuel gauge reading, 0..=100.
    pub fn battery_level(&mut self) -> Result<u8, Error> {
        Ok(self.dev()?.read(REG_BATTERY_PERCENT)?.min(100))
    }

    pub fn is_charging(&mut self) -> Result<bool, Error> {
        let status = self.dev()?.read_bits(REG_STATUS2, STATUS2_CHARGE_MASK)?;
        Ok(status == STATUS2_CHARGING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        FakeI2c,
        Journal,
    };

    fn pmic(journal: &Journal) -> (FakeI2c, Axp2101<FakeI2c>) {
        let i2c = FakeI2c::new(journal);
        i2c.add_device(DEFAULT_ADDR);
        i2c.set_reg(DEFAULT_ADDR, REG_CHIP_ID.into(), CHIP_ID);
        let mut axp = Axp2101::new();
        axp.init(i2c.clone(), DEFAULT_ADDR).unwrap();
        (i2c, axp)
    }

    #[test]
    fn voltage_codes() {
        assert_eq!(Ldo::voltage_code(500), Some(0));
        assert_eq!(Ldo::voltage_code(1800), Some(13));
        assert_eq!(Ldo::voltage_code(3300), Some(28));
        assert_eq!(Ldo::voltage_code(3500), Some(30));
        assert_eq!(Ldo::voltage_code(3600), None);
        assert_eq!(Ldo::voltage_code(400), None);
    }

    #[test]
    fn ldo_voltage_keeps_the_upper_bits() {
        let journal = Journal::default();
        let (i2c, mut axp) = pmic(&journal);
        i2c.set_reg(DEFAULT_ADDR, 0x99, 0b1110_0000);

        axp.set_ldo_voltage(Ldo::Dldo1, 3300).unwrap();

        assert_eq!(i2c.reg(DEFAULT_ADDR, 0x99), 0b1110_0000 | 28);
        assert_eq!(axp.ldo_voltage(Ldo::Dldo1), Ok(3300));
        assert_eq!(
            axp.set_ldo_voltage(Ldo::Dldo1, 3700),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn dldo1_is_bit_seven() {
        let journal = Journal::default();
        let (i2c, mut axp) = pmic(&journal);

        axp.set_ldo_enabled(Ldo::Dldo1, true).unwrap();
        axp.set_ldo_enabled(Ldo::Aldo2, true).unwrap();
        axp.set_ldo_enabled(Ldo::Dldo1, false).unwrap();

        assert_eq!(i2c.reg(DEFAULT_ADDR, REG_LDO_ONOFF.into()), 0b0000_0010);
        assert_eq!(axp.is_ldo_enabled(Ldo::Aldo2), Ok(true));
    }

    #[test]
    fn gauge_and_charge_state() {
        let journal = Journal::default();
        let (i2c, mut axp) = pmic(&journal);
        i2c.set_reg(DEFAULT_ADDR, REG_BATTERY_PERCENT.into(), 87);
        i2c.set_reg(DEFAULT_ADDR, REG_STATUS2.into(), 0b0010_0101);

        assert_eq!(axp.battery_level(), Ok(87));
        assert_eq!(axp.is_charging(), Ok(true));

        i2c.set_reg(DEFAULT_ADDR, REG_STATUS2.into(), 0b0100_0000);
        assert_eq!(axp.is_charging(), Ok(false));
    }

    #[test]
    fn unknown_chip_is_rejected() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        let mut axp = Axp2101::new();

        assert_eq!(
            axp.init(i2c, DEFAULT_ADDR),
            Err(Error::UnexpectedDevice {
                expected: CHIP_ID,
                found: 0
            })
        );
        assert_eq!(axp.battery_level(), Err(Error::InvalidState));
    }
}
