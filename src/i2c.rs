//! Shared I2C master bus and the register transport the chip drivers use.

use core::cell::RefCell;

use embedded_hal::i2c::{
    ErrorKind,
    ErrorType,
    I2c,
    Operation,
};

use crate::{
    Error,
    fmt::Bytes,
    hal::Driver,
    resource::Resource,
};

/// Configuration of an I2C master port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cBusConfig {
    pub port: u8,
    pub sda: u8,
    pub scl: u8,
    pub frequency_hz: u32,
    pub glitch_ignore_cnt: u8,
    pub intr_priority: u8,
    pub trans_queue_depth: usize,
    pub internal_pullup: bool,
    pub allow_power_down: bool,
}

/// Addresses probed by [`I2cBus::scan`]: the non-reserved 7-bit range.
const SCAN_RANGE: core::ops::RangeInclusive<u8> = 0x08..=0x77;

pub type ScanResult = heapless::Vec<u8, 112>;

/// An I2C master bus shared by several devices.
///
/// Devices borrow the bus through [`I2cBus::device`]; every transaction
/// takes the bus for its duration only.
pub struct I2cBus<D: Driver> {
    inner: RefCell<Resource<D>>,
}

impl<D> I2cBus<D>
where
    D: Driver<Config = I2cBusConfig>,
    D::Handle: I2c,
{
    pub const fn new(driver: D) -> Self {
        Self {
            inner: RefCell::new(Resource::new("I2cBus", driver)),
        }
    }

    pub fn init(&self, config: &I2cBusConfig) -> Result<(), Error> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState)?
            .init(config)?;
        info!(
            "[I2cBus] port {} sda {} scl {} @ {} Hz",
            config.port, config.sda, config.scl, config.frequency_hz
        );
        Ok(())
    }

    pub fn deinit(&self) -> Result<(), Error> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| Error::InvalidState)?
            .deinit()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|r| r.is_initialized())
    }

    /// A transport for one device on this bus.
    ///
    /// Fails with [`Error::InvalidState`] when the bus is not open.
    pub fn device(&self) -> Result<I2cDevice<'_, D>, Error> {
        if !self.is_initialized() {
            error!("[I2cBus] device requested before the bus was opened");
            return Err(Error::InvalidState);
        }
        Ok(I2cDevice { bus: &self.inner })
    }

    /// Probes every 7-bit address with an empty write and returns those that ack.
    pub fn scan(&self) -> Result<ScanResult, Error> {
        let mut res = self.inner.try_borrow_mut().map_err(|_| Error::InvalidState)?;
        let Some(bus) = res.handle_mut() else {
            error!("[I2cBus] scan: not initialized");
            return Err(Error::InvalidState);
        };

        let mut found = ScanResult::new();
        for address in SCAN_RANGE {
            if bus.write(address, &[]).is_ok() {
                // SCAN_RANGE has exactly `found`'s capacity
                let _ = found.push(address);
            }
        }

        info!("[I2cBus] scan found {} device(s): {}", found.len(), Bytes(&found));
        Ok(found)
    }
}

/// One device's view of a shared [`I2cBus`].
pub struct I2cDevice<'a, D: Driver> {
    bus: &'a RefCell<Resource<D>>,
}

impl<D: Driver> Clone for I2cDevice<'_, D> {
    fn clone(&self) -> Self {
        Self { bus: self.bus }
    }
}

impl<D: Driver> ErrorType for I2cDevice<'_, D> {
    type Error = ErrorKind;
}

impl<D> I2c for I2cDevice<'_, D>
where
    D: Driver,
    D::Handle: I2c,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut res = self.bus.try_borrow_mut().map_err(|_| ErrorKind::Other)?;
        let bus = res.handle_mut().ok_or(ErrorKind::Other)?;
        bus.transaction(address, operations)
            .map_err(|e| embedded_hal::i2c::Error::kind(&e))
    }
}

/// Longest burst [`Register::write_many`] accepts.
const MAX_BURST: usize = 16;

/// Register-level access to one I2C chip.
pub struct Register<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Register<I> {
    pub const fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    pub fn read(&mut self, reg: u8) -> Result<u8, Error> {
        let mut buf = [0];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::i2c)?;
        Ok(buf[0])
    }

    pub fn write(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::i2c)
    }

    pub fn read_many(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(Error::i2c)
    }

    pub fn write_many(&mut self, reg: u8, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_BURST {
            return Err(Error::InvalidArgument);
        }
        let mut frame = [0; MAX_BURST + 1];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);
        self.i2c
            .write(self.address, &frame[..=data.len()])
            .map_err(Error::i2c)
    }

    /// Reads `reg` and returns only the bits under `mask`.
    pub fn read_bits(&mut self, reg: u8, mask: u8) -> Result<u8, Error> {
        Ok(self.read(reg)? & mask)
    }

    /// Read-modify-write of the bits under `mask`; other bits are preserved.
    pub fn write_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Error> {
        let old = self.read(reg)?;
        self.write(reg, (old & !mask) | (value & mask))
    }

    pub fn read_bit(&mut self, reg: u8, bit: u8) -> Result<bool, Error> {
        Ok(self.read_bits(reg, 1 << bit)? != 0)
    }

    pub fn write_bit(&mut self, reg: u8, bit: u8, set: bool) -> Result<(), Error> {
        self.write_bits(reg, 1 << bit, if set { 0xff } else { 0 })
    }

    /// Burst read from a chip with 16-bit register addresses (big endian).
    pub fn read16(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), buf)
            .map_err(Error::i2c)
    }

    pub fn write16(&mut self, reg: u16, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_BURST {
            return Err(Error::InvalidArgument);
        }
        let mut frame = [0; MAX_BURST + 2];
        frame[..2].copy_from_slice(&reg.to_be_bytes());
        frame[2..2 + data.len()].copy_from_slice(data);
        self.i2c
            .write(self.address, &frame[..2 + data.len()])
            .map_err(Error::i2c)
    }

    /// Writes a table of `(register, value)` pairs in order.
    pub fn write_table(&mut self, table: &[(u8, u8)]) -> Result<(), Error> {
        table
            .iter()
            .try_for_each(|&(reg, value)| self.write(reg, value))
    }
}
