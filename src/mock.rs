//! Recording fakes for the vendor seams, used by the unit tests.

use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::BTreeMap,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    i2c::{
        ErrorKind,
        ErrorType,
        I2c,
        NoAcknowledgeSource,
        Operation,
    },
};

use crate::{
    HalError,
    display::{
        DbiIoConfig,
        DpiPanelConfig,
    },
    gui::{
        GuiDisplayConfig,
        GuiPortConfig,
        GuiTouchConfig,
    },
    hal::{
        Driver,
        GuiBackend,
        I2sChannels,
        LdoChannel,
        PanelHost,
        PanelIo,
        PwmChannel,
        PwmTimer,
    },
    i2c::I2cBusConfig,
    i2s::I2sStdConfig,
};

/// Ordered log of everything the fakes were asked to do.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }

    /// Index of the first event starting with `prefix`.
    pub fn index(&self, prefix: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e.starts_with(prefix))
    }
}

// ── Generic acquire/release driver ──────────────────────────────────────────

pub struct FakeHandle<C> {
    pub id: u32,
    pub config: C,
    tag: &'static str,
    journal: Journal,
    fail_ops: Rc<Cell<Option<HalError>>>,
}

impl<C> FakeHandle<C> {
    fn log(&self, op: &str) -> Result<(), HalError> {
        self.journal.push(format!("{}.{}", self.tag, op));
        self.fail_ops.get().map_or(Ok(()), Err)
    }
}

pub struct FakeDriver<C = u32> {
    tag: &'static str,
    journal: Journal,
    next_id: u32,
    live: Rc<Cell<i32>>,
    fail_ops: Rc<Cell<Option<HalError>>>,
    pub fail_open: Option<HalError>,
    pub fail_close: Option<HalError>,
    _config: core::marker::PhantomData<C>,
}

impl<C> FakeDriver<C> {
    pub fn new(tag: &'static str, journal: &Journal) -> Self {
        Self {
            tag,
            journal: journal.clone(),
            next_id: 1,
            live: Rc::new(Cell::new(0)),
            fail_ops: Rc::default(),
            fail_open: None,
            fail_close: None,
            _config: core::marker::PhantomData,
        }
    }

    pub fn failing(tag: &'static str, journal: &Journal, e: HalError) -> Self {
        let mut d = Self::new(tag, journal);
        d.fail_open = Some(e);
        d
    }

    /// Handles opened and not yet closed.
    pub fn live(&self) -> i32 {
        self.live.get()
    }

    /// Makes every operation on open handles fail with `e` (still journaled).
    pub fn fail_ops(&self, e: Option<HalError>) {
        self.fail_ops.set(e);
    }
}

impl<C: Clone> Driver for FakeDriver<C> {
    type Config = C;
    type Handle = FakeHandle<C>;

    fn open(&mut self, config: &C) -> Result<Self::Handle, HalError> {
        self.journal.push(format!("{}.open", self.tag));
        if let Some(e) = self.fail_open {
            return Err(e);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live.set(self.live.get() + 1);
        Ok(FakeHandle {
            id,
            config: config.clone(),
            tag: self.tag,
            journal: self.journal.clone(),
            fail_ops: self.fail_ops.clone(),
        })
    }

    fn close(&mut self, handle: Self::Handle) -> Result<(), HalError> {
        self.journal.push(format!("{}.close {}", self.tag, handle.id));
        self.live.set(self.live.get() - 1);
        self.fail_close.map_or(Ok(()), Err)
    }
}

impl<C> PwmTimer for FakeHandle<C> {
    fn pause(&mut self) -> Result<(), HalError> {
        self.log("pause")
    }

    fn resume(&mut self) -> Result<(), HalError> {
        self.log("resume")
    }

    fn set_frequency(&mut self, freq_hz: u32) -> Result<(), HalError> {
        self.log(&format!("set_frequency {freq_hz}"))
    }
}

impl<C> PwmChannel for FakeHandle<C> {
    fn set_duty(&mut self, duty: u32) -> Result<(), HalError> {
        self.log(&format!("set_duty {duty}"))
    }

    fn update_duty(&mut self) -> Result<(), HalError> {
        self.log("update_duty")
    }

    fn stop(&mut self, idle_level: bool) -> Result<(), HalError> {
        self.log(&format!("stop {}", u8::from(idle_level)))
    }
}

impl<C> LdoChannel for FakeHandle<C> {
    fn adjust_voltage(&mut self, voltage_mv: u16) -> Result<(), HalError> {
        self.log(&format!("adjust_voltage {voltage_mv}"))
    }
}

impl<C> I2sChannels for FakeHandle<C> {
    fn configure_tx(&mut self, config: &I2sStdConfig) -> Result<(), HalError> {
        self.log(&format!("configure_tx {}", config.clock.sample_rate_hz))
    }

    fn configure_rx(&mut self, config: &I2sStdConfig) -> Result<(), HalError> {
        self.log(&format!("configure_rx {}", config.clock.sample_rate_hz))
    }

    fn enable_tx(&mut self) -> Result<(), HalError> {
        self.log("enable_tx")
    }

    fn enable_rx(&mut self) -> Result<(), HalError> {
        self.log("enable_rx")
    }

    fn disable_tx(&mut self) -> Result<(), HalError> {
        self.log("disable_tx")
    }

    fn disable_rx(&mut self) -> Result<(), HalError> {
        self.log("disable_rx")
    }
}

// ── I2C register-file bus ───────────────────────────────────────────────────

#[derive(Default)]
struct FakeChip {
    wide: bool,
    regs: BTreeMap<u16, u8>,
}

/// An I2C bus with register-file chips attached. Clones share state.
#[derive(Clone)]
pub struct FakeI2c {
    chips: Rc<RefCell<BTreeMap<u8, FakeChip>>>,
    journal: Journal,
}

impl FakeI2c {
    pub fn new(journal: &Journal) -> Self {
        Self {
            chips: Rc::default(),
            journal: journal.clone(),
        }
    }

    /// Attaches a chip with 8-bit register addresses.
    pub fn add_device(&self, address: u8) {
        self.chips.borrow_mut().insert(address, FakeChip::default());
    }

    /// Attaches a chip with 16-bit register addresses.
    pub fn add_wide_device(&self, address: u8) {
        self.chips.borrow_mut().insert(
            address,
            FakeChip {
                wide: true,
                ..FakeChip::default()
            },
        );
    }

    pub fn remove_device(&self, address: u8) {
        self.chips.borrow_mut().remove(&address);
    }

    pub fn set_reg(&self, address: u8, reg: u16, value: u8) {
        if let Some(chip) = self.chips.borrow_mut().get_mut(&address) {
            chip.regs.insert(reg, value);
        }
    }

    pub fn reg(&self, address: u8, reg: u16) -> u8 {
        self.chips
            .borrow()
            .get(&address)
            .and_then(|c| c.regs.get(&reg).copied())
            .unwrap_or(0)
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chips = self.chips.borrow_mut();
        let chip = chips
            .get_mut(&address)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;
        let probe = matches!(operations, [Operation::Write([])]);
        if probe {
            self.journal.push(format!("i2c probe {address:#04x}"));
        } else {
            self.journal.push(format!("i2c {address:#04x}"));
        }

        let width = if chip.wide { 2 } else { 1 };
        let mut pointer = 0u16;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if bytes.len() < width {
                        continue;
                    }
                    pointer = if chip.wide {
                        u16::from_be_bytes([bytes[0], bytes[1]])
                    } else {
                        u16::from(bytes[0])
                    };
                    for &b in &bytes[width..] {
                        chip.regs.insert(pointer, b);
                        pointer = pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = chip.regs.get(&pointer).copied().unwrap_or(0);
                        pointer = pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Opens [`FakeI2c`] handles sharing one register file.
pub struct FakeI2cDriver {
    i2c: FakeI2c,
    journal: Journal,
    pub fail_open: Option<HalError>,
}

impl FakeI2cDriver {
    pub fn new(journal: &Journal) -> Self {
        Self {
            i2c: FakeI2c::new(journal),
            journal: journal.clone(),
            fail_open: None,
        }
    }

    pub fn i2c(&self) -> FakeI2c {
        self.i2c.clone()
    }
}

impl Driver for FakeI2cDriver {
    type Config = I2cBusConfig;
    type Handle = FakeI2c;

    fn open(&mut self, _config: &I2cBusConfig) -> Result<FakeI2c, HalError> {
        self.journal.push("i2c.open");
        if let Some(e) = self.fail_open {
            return Err(e);
        }
        Ok(self.i2c.clone())
    }

    fn close(&mut self, _handle: FakeI2c) -> Result<(), HalError> {
        self.journal.push("i2c.close");
        Ok(())
    }
}

// ── Delay ───────────────────────────────────────────────────────────────────

pub struct FakeDelay {
    journal: Journal,
}

impl FakeDelay {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, us: u32) {
        self.journal.push(format!("delay {us}us"));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(format!("delay {ms}ms"));
    }
}

// ── DSI panel host ──────────────────────────────────────────────────────────

pub struct FakeIo {
    journal: Journal,
    fail_cmd: Option<u8>,
}

impl PanelIo for FakeIo {
    fn tx_param(&mut self, cmd: u8, params: &[u8]) -> Result<(), HalError> {
        self.journal.push(format!("dbi {cmd:#04x} {params:02x?}"));
        if self.fail_cmd == Some(cmd) {
            return Err(HalError::Timeout);
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FakeDpi(pub u16);

pub struct FakePanelHost {
    journal: Journal,
    pub fail_cmd: Option<u8>,
    pub fail_dpi: Option<HalError>,
}

impl FakePanelHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_cmd: None,
            fail_dpi: None,
        }
    }
}

impl PanelHost for FakePanelHost {
    type Bus = FakeHandle<crate::display::DsiBusConfig>;
    type Io = FakeIo;
    type Dpi = FakeDpi;

    fn new_dbi_io(&mut self, bus: &Self::Bus, config: &DbiIoConfig) -> Result<FakeIo, HalError> {
        self.journal.push(format!(
            "dsi.dbi.open bus={} vc={}",
            bus.id, config.virtual_channel
        ));
        Ok(FakeIo {
            journal: self.journal.clone(),
            fail_cmd: self.fail_cmd,
        })
    }

    fn new_dpi_panel(
        &mut self,
        _bus: &Self::Bus,
        config: &DpiPanelConfig,
    ) -> Result<FakeDpi, HalError> {
        self.journal.push(format!(
            "dsi.dpi.open {}x{}",
            config.timing.h_size, config.timing.v_size
        ));
        if let Some(e) = self.fail_dpi {
            return Err(e);
        }
        Ok(FakeDpi(config.timing.h_size))
    }

    fn del_dpi_panel(&mut self, _dpi: FakeDpi) -> Result<(), HalError> {
        self.journal.push("dsi.dpi.close");
        Ok(())
    }

    fn del_dbi_io(&mut self, _io: FakeIo) -> Result<(), HalError> {
        self.journal.push("dsi.dbi.close");
        Ok(())
    }
}

// ── GUI backend ─────────────────────────────────────────────────────────────

pub struct FakeGui {
    journal: Journal,
    pub fail_start: Option<HalError>,
}

impl FakeGui {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_start: None,
        }
    }
}

impl<D, T> GuiBackend<D, T> for FakeGui {
    fn start(&mut self, config: &GuiPortConfig) -> Result<(), HalError> {
        self.journal
            .push(format!("gui.start prio={}", config.task_priority));
        self.fail_start.map_or(Ok(()), Err)
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.journal.push("gui.stop");
        Ok(())
    }

    fn add_display(&mut self, _display: &D, config: &GuiDisplayConfig) -> Result<(), HalError> {
        self.journal.push(format!(
            "gui.add_display {}x{}",
            config.hor_res, config.ver_res
        ));
        Ok(())
    }

    fn add_touch(&mut self, _touch: &T, _config: &GuiTouchConfig) -> Result<(), HalError> {
        self.journal.push("gui.add_touch");
        Ok(())
    }
}
