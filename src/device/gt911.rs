//! GT911 capacitive touch controller register protocol.

use embedded_hal::i2c::I2c;

use crate::{
    Error,
    i2c::Register,
};

pub const ADDR_PRIMARY: u8 = 0x5d;
pub const ADDR_BACKUP: u8 = 0x14;

pub const MAX_POINTS: usize = 5;

const REG_PRODUCT_ID: u16 = 0x8140;
const REG_STATUS: u16 = 0x814e;
const REG_POINTS: u16 = 0x814f;
const POINT_LEN: usize = 8;

const STATUS_READY: u8 = 0x80;
const STATUS_COUNT_MASK: u8 = 0x0f;

/// One raw contact as the controller reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawPoint {
    pub track_id: u8,
    pub x: u16,
    pub y: u16,
    pub size: u16,
}

impl RawPoint {
    fn parse(b: &[u8]) -> Self {
        Self {
            track_id: b[0],
            x: u16::from_le_bytes([b[1], b[2]]),
            y: u16::from_le_bytes([b[3], b[4]]),
            size: u16::from_le_bytes([b[5], b[6]]),
        }
    }
}

pub struct Gt911<I> {
    dev: Register<I>,
}

impl<I: I2c> Gt911<I> {
    pub const fn new(i2c: I, address: u8) -> Self {
        Self {
            dev: Register::new(i2c, address),
        }
    }

    /// ASCII product ID, `b"911\0"` on a genuine part.
    pub fn product_id(&mut self) -> Result<[u8; 4], Error> {
        let mut id = [0; 4];
        self.dev.read16(REG_PRODUCT_ID, &mut id)?;
        Ok(id)
    }

    /// Reads the pending contacts into `out` and acknowledges the frame.
    ///
    /// Returns how many points were written; 0 when no new frame is ready.
    pub fn read_points(&mut self, out: &mut [RawPoint; MAX_POINTS]) -> Result<usize, Error> {
        let mut status = [0];
        self.dev.read16(REG_STATUS, &mut status)?;
        if status[0] & STATUS_READY == 0 {
            return Ok(0);
        }

        let count = usize::from(status[0] & STATUS_COUNT_MASK).min(MAX_POINTS);
        let mut raw = [0; POINT_LEN * MAX_POINTS];
        if count > 0 {
            self.dev.read16(REG_POINTS, &mut raw[..count * POINT_LEN])?;
        }
        for (slot, chunk) in out.iter_mut().zip(raw.chunks_exact(POINT_LEN)).take(count) {
            *slot = RawPoint::parse(chunk);
        }

        self.dev.write16(REG_STATUS, &[0])?;
        Ok(count)
    }
}
