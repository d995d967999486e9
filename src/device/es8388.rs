//! ES8388 stereo audio codec, used in DAC (speaker) mode.

use embedded_hal::i2c::I2c;

use crate::{
    Error,
    i2c::Register,
};

/// 7-bit address with CE low.
pub const DEFAULT_ADDR: u8 = 0x10;

const REG_CONTROL1: u8 = 0x00;
const REG_CHIP_POWER: u8 = 0x02;
const REG_MASTER_MODE: u8 = 0x08;
const REG_DAC_POWER: u8 = 0x04;
const REG_DAC_CONTROL3: u8 = 0x19;
/// LOUT1, ROUT1, LOUT2, ROUT2 output volume.
const REG_OUT_VOLUME: [u8; 4] = [0x2e, 0x2f, 0x30, 0x31];

const DAC_MUTE_BIT: u8 = 2;
/// Output volume register range: -45 dB .. +4.5 dB in 1.5 dB steps.
const OUT_VOLUME_MAX: u8 = 0x21;

/// Slave mode, 16-bit I2S, single speed at 256 fs, DAC to both mixers at
/// 0 dB. All outputs stay off until the table finishes.
const DAC_INIT: &[(u8, u8)] = &[
    (REG_DAC_CONTROL3, 0x04),
    (0x01, 0x50),
    (REG_CHIP_POWER, 0x00),
    (REG_DAC_POWER, 0xc0),
    (REG_CONTROL1, 0x12),
    (0x17, 0x18),
    (0x18, 0x02),
    (0x26, 0x00),
    (0x27, 0x90),
    (0x2a, 0x90),
    (0x2b, 0x80),
    (0x2d, 0x00),
    (0x1a, 0x00),
    (0x1b, 0x00),
    (REG_DAC_POWER, 0x3c),
];

pub struct Es8388<I> {
    dev: Register<I>,
    volume: u8,
}

impl<I: I2c> Es8388<I> {
    /// Programs the DAC path. `master` selects I2S clock master mode.
    pub fn open(i2c: I, address: u8, master: bool) -> Result<Self, Error> {
        let mut dev = Register::new(i2c, address);
        dev.write_table(DAC_INIT)?;
        dev.write(REG_MASTER_MODE, if master { 0x80 } else { 0x00 })?;
        let mut codec = Self { dev, volume: 0 };
        codec.set_mute(false)?;
        Ok(codec)
    }

    /// Powers the DAC and the chip down.
    pub fn close(mut self) -> Result<(), Error> {
        self.dev.write(REG_DAC_POWER, 0xc0)?;
        self.dev.write(REG_CHIP_POWER, 0xff)
    }

    /// `percent` in 0..=100, mapped onto the output amplifier range.
    pub fn set_volume(&mut self, percent: u8) -> Result<(), Error> {
        let percent = percent.min(100);
        let value = (u16::from(percent) * u16::from(OUT_VOLUME_MAX) / 100) as u8;
        for reg in REG_OUT_VOLUME {
            self.dev.write(reg, value)?;
        }
        self.volume = percent;
        Ok(())
    }

    /// Last volume set. The register scale is coarser than 1 %.
    pub const fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), Error> {
        self.dev.write_bit(REG_DAC_CONTROL3, DAC_MUTE_BIT, mute)
    }

    pub fn is_muted(&mut self) -> Result<bool, Error> {
        self.dev.read_bit(REG_DAC_CONTROL3, DAC_MUTE_BIT)
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
    fn open_leaves_outputs_powered_and_unmuted() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);

        let mut codec = Es8388::open(i2c.clone(), DEFAULT_ADDR, false).unwrap();

        assert_eq!(i2c.reg(DEFAULT_ADDR, REG_DAC_POWER.into()), 0x3c);
        assert_eq!(i2c.reg(DEFAULT_ADDR, REG_MASTER_MODE.into()), 0x00);
        assert_eq!(codec.is_muted(), Ok(false));
    }

    #[test]
    fn volume_scales_into_all_four_outputs() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        let mut codec = Es8388::open(i2c.clone(), DEFAULT_ADDR, false).unwrap();

        codec.set_volume(100).unwrap();
        for reg in REG_OUT_VOLUME {
            assert_eq!(i2c.reg(DEFAULT_ADDR, reg.into()), OUT_VOLUME_MAX);
        }
        codec.set_volume(50).unwrap();
        assert_eq!(i2c.reg(DEFAULT_ADDR, 0x2e), 16);
        codec.set_volume(180).unwrap();
        assert_eq!(codec.volume(), 100);
    }

    #[test]
    fn close_powers_down() {
        let journal = Journal::default();
        let i2c = FakeI2c::new(&journal);
        i2c.add_device(DEFAULT_ADDR);
        let codec = Es8388::open(i2c.clone(), DEFAULT_ADDR, false).unwrap();

        codec.close().unwrap();

        assert_eq!(i2c.reg(DEFAULT_ADDR, REG_CHIP_POWER.into()), 0xff);
    }
}
