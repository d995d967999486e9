//! ES7210 four-channel ADC, used for the microphone array.

use embedded_hal::{
    delay::DelayNs,
    i2c::I2c,
};

use crate::{
    Error,
    i2c::Register,
};

/// 7-bit address with AD1/AD0 low.
pub const DEFAULT_ADDR: u8 = 0x40;

const REG_RESET: u8 = 0x00;
const REG_CLOCK_OFF: u8 = 0x01;
const REG_POWER_DOWN: u8 = 0x06;
const REG_MODE_CONFIG: u8 = 0x08;
const REG_ADC34_MUTE: u8 = 0x14;
const REG_ADC12_MUTE: u8 = 0x15;
/// MIC1..MIC4 PGA gain.
const REG_MIC_GAIN: [u8; 4] = [0x43, 0x44, 0x45, 0x46];
const REG_MIC_POWER: [u8; 4] = [0x47, 0x48, 0x49, 0x4a];
const REG_MIC12_POWER: u8 = 0x4b;
const REG_MIC34_POWER: u8 = 0x4c;

const MUTE_MASK: u8 = 0b11;
const GAIN_MASK: u8 = 0x0f;
const GAIN_ENABLE_BIT: u8 = 4;
pub const GAIN_STEP_DB: u8 = 3;
pub const GAIN_MAX_DB: u8 = 42;

const RESET_DELAY_MS: u32 = 10;

/// Clocking, high-pass filters, bias and 16-bit I2S output.
const ADC_INIT: &[(u8, u8)] = &[
    (REG_CLOCK_OFF, 0x3f),
    (0x09, 0x30),
    (0x0a, 0x30),
    (0x23, 0x2a),
    (0x22, 0x0a),
    (0x20, 0x0a),
    (0x21, 0x2a),
    (0x40, 0xc3),
    (0x41, 0x70),
    (0x42, 0x70),
    (0x07, 0x20),
    (0x02, 0xc1),
    (0x11, 0x60),
    (0x12, 0x00),
];

pub struct Es7210<I> {
    dev: Register<I>,
    /// Bitmask of enabled microphones, bit 0 = MIC1.
    mics: u8,
}

impl<I: I2c> Es7210<I> {
    /// Resets the chip and enables the microphones in `mics` (bit 0 = MIC1).
    pub fn open(
        i2c: I,
        address: u8,
        master: bool,
        mics: u8,
        delay: &mut impl DelayNs,
    ) -> Result<Self, Error> {
        let mics = mics & 0x0f;
        if mics == 0 {
            return Err(Error::InvalidArgument);
        }
        let mut dev = Register::new(i2c, address);
        dev.write(REG_RESET, 0xff)?;
        delay.delay_ms(RESET_DELAY_MS);
        dev.write(REG_RESET, 0x41)?;
        dev.write_table(ADC_INIT)?;
        dev.write_bit(REG_MODE_CONFIG, 0, master)?;

        for (i, (&gain, &power)) in REG_MIC_GAIN.iter().zip(&REG_MIC_POWER).enumerate() {
            let on = mics & (1 << i) != 0;
            dev.write_bit(gain, GAIN_ENABLE_BIT, on)?;
            dev.write(power, if on { 0x08 } else { 0xff })?;
        }
        dev.write(REG_MIC12_POWER, if mics & 0b0011 != 0 { 0x00 } else { 0xff })?;
        dev.write(REG_MIC34_POWER, if mics & 0b1100 != 0 { 0x00 } else { 0xff })?;

        dev.write(REG_POWER_DOWN, 0x00)?;
        dev.write(REG_CLOCK_OFF, 0x00)?;
        Ok(Self { dev, mics })
    }

    pub fn close(mut self) -> Result<(), Error> {
        self.dev.write(REG_MIC12_POWER, 0xff)?;
        self.dev.write(REG_MIC34_POWER, 0xff)?;
        self.dev.write(REG_POWER_DOWN, 0xff)?;
        self.dev.write(REG_CLOCK_OFF, 0x7f)
    }

    /// Sets the PGA gain of every enabled microphone.
    ///
    /// `db` must be a multiple of 3 in 0..=42.
    pub fn set_gain(&mut self, db: u8) -> Result<(), Error> {
        if db > GAIN_MAX_DB || db % GAIN_STEP_DB != 0 {
            return Err(Error::InvalidArgument);
        }
        let code = db / GAIN_STEP_DB;
        for (i, &reg) in REG_MIC_GAIN.iter().enumerate() {
            if self.mics & (1 << i) != 0 {
                self.dev.write_bits(reg, GAIN_MASK, code)?;
            }
        }
        Ok(())
    }

    /// Gain of the first enabled microphone.
    pub fn gain(&mut self) -> Result<u8, Error> {
        let first = self.mics.trailing_zeros() as usize;
        let code = self.dev.read_bits(REG_MIC_GAIN[first], GAIN_MASK)?;
        Ok(code * GAIN_STEP_DB)
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), Error> {
        let bits = if mute { MUTE_MASK } else { 0 };
        self.dev.write_bits(REG_ADC34_MUTE, MUTE_MASK, bits)?;
        self.dev.write_bits(REG_ADC12_MUTE, MUTE_MASK, bits)
    }

    pub fn is_muted(&mut self) -> Result<bool, Error> {
        Ok(self.dev.read_bits(REG_ADC12_MUTE, MUTE_MASK)? == MUTE_MASK)
    }
}
