//! MIPI-DSI bus and the ILI9881C panel living on it.
//!
//! A DSI display is two endpoints on one bus: a DBI command channel used
//! to program the controller, and a DPI pixel stream the GUI draws into.
//! [`DsiDisplay::init`] creates both and programs the controller.

use embedded_hal::delay::DelayNs;

use crate::{
    Error,
    device::ili9881c::Ili9881c,
    hal::{
        Driver,
        PanelHost,
    },
    resource::Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyClockSource {
    Default,
    Xtal,
    Pll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DsiBusConfig {
    pub bus_id: u8,
    pub num_data_lanes: u8,
    pub phy_clk_src: PhyClockSource,
    pub lane_bit_rate_mbps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DbiIoConfig {
    pub virtual_channel: u8,
    pub lcd_cmd_bits: u8,
    pub lcd_param_bits: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    Rgb565,
    Rgb666,
    Rgb888,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Rgb565 => 16,
            Self::Rgb666 => 18,
            Self::Rgb888 => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoTiming {
    pub h_size: u16,
    pub v_size: u16,
    pub hsync_pulse_width: u16,
    pub hsync_back_porch: u16,
    pub hsync_front_porch: u16,
    pub vsync_pulse_width: u16,
    pub vsync_back_porch: u16,
    pub vsync_front_porch: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DpiPanelConfig {
    pub virtual_channel: u8,
    pub dpi_clock_freq_mhz: u32,
    pub pixel_format: PixelFormat,
    pub num_fbs: u8,
    pub timing: VideoTiming,
    pub use_dma2d: bool,
    pub disable_lp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgbOrder {
    Rgb,
    Bgr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelDevConfig {
    /// `None` when the reset line is not wired to the SoC.
    pub reset_gpio: Option<u8>,
    pub rgb_order: RgbOrder,
    pub big_endian: bool,
    pub bits_per_pixel: u8,
    pub reset_active_high: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DsiDisplayConfig {
    pub dbi: DbiIoConfig,
    pub dpi: DpiPanelConfig,
    pub panel: PanelDevConfig,
}

/// One entry of a controller init table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitCommand {
    pub cmd: u8,
    pub data: &'static [u8],
    pub delay_ms: u16,
}

impl InitCommand {
    pub const fn new(cmd: u8, data: &'static [u8]) -> Self {
        Self {
            cmd,
            data,
            delay_ms: 0,
        }
    }
}

/// Panel-specific data handed to the controller driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVendorConfig {
    pub init_cmds: &'static [InitCommand],
    pub lane_num: u8,
}

/// The DSI host bus.
pub struct DsiBus<D: Driver> {
    res: Resource<D>,
    config: Option<DsiBusConfig>,
}

impl<D> DsiBus<D>
where
    D: Driver<Config = DsiBusConfig>,
{
    pub const fn new(driver: D) -> Self {
        Self {
            res: Resource::new("DsiBus", driver),
            config: None,
        }
    }

    pub fn init(&mut self, config: &DsiBusConfig) -> Result<(), Error> {
        self.res.init(config)?;
        self.config = Some(*config);
        info!(
            "[DsiBus] {} lanes @ {} Mbps",
            config.num_data_lanes, config.lane_bit_rate_mbps
        );
        Ok(())
    }

    pub fn deinit(&mut self) -> Result<(), Error> {
        self.config = None;
        self.res.deinit()
    }

    pub const fn is_initialized(&self) -> bool {
        self.res.is_initialized()
    }

    pub const fn handle(&self) -> Option<&D::Handle> {
        self.res.handle()
    }

    pub const fn config(&self) -> Option<&DsiBusConfig> {
        self.config.as_ref()
    }
}

/// A DSI video-mode panel driven by an ILI9881C.
pub struct DsiDisplay<H: PanelHost> {
    host: H,
    io: Option<H::Io>,
    dpi: Option<H::Dpi>,
    panel: Option<Ili9881c>,
    timing: Option<VideoTiming>,
}

impl<H: PanelHost> DsiDisplay<H> {
    pub const fn new(host: H) -> Self {
        Self {
            host,
            io: None,
            dpi: None,
            panel: None,
            timing: None,
        }
    }

    /// Brings the panel up. The first failing step aborts and is returned.
    pub fn init<B>(
        &mut self,
        bus: &DsiBus<B>,
        config: &DsiDisplayConfig,
        vendor: &PanelVendorConfig,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error>
    where
        B: Driver<Config = DsiBusConfig, Handle = H::Bus>,
    {
        if self.is_initialized() || self.io.is_some() {
            warn!("[DsiDisplay] already initialized, deinitializing first");
            self.deinit()?;
        }
        let (Some(bus_handle), Some(bus_config)) = (bus.handle(), bus.config()) else {
            error!("[DsiDisplay] DSI bus not initialized");
            return Err(Error::InvalidState);
        };

        let io = self.host.new_dbi_io(bus_handle, &config.dbi).map_err(|e| {
            error!("[DsiDisplay] DBI IO creation failed: {}", e.name());
            Error::Hal(e)
        })?;
        let io = self.io.insert(io);

        if vendor.lane_num != bus_config.num_data_lanes {
            error!(
                "[DsiDisplay] panel wants {} lanes, bus has {}",
                vendor.lane_num, bus_config.num_data_lanes
            );
            return Err(Error::InvalidArgument);
        }
        let panel = Ili9881c::new(vendor, &config.panel)?;
        if !panel.pixel_format_matches(config.dpi.pixel_format) {
            error!("[DsiDisplay] pixel format does not match panel depth");
            return Err(Error::InvalidArgument);
        }
        let dpi = self.host.new_dpi_panel(bus_handle, &config.dpi).map_err(|e| {
            error!("[DsiDisplay] DPI panel creation failed: {}", e.name());
            Error::Hal(e)
        })?;
        self.dpi = Some(dpi);

        panel.reset(io, delay).inspect_err(|_| {
            error!("[DsiDisplay] panel reset failed");
        })?;
        panel.init(io, delay).inspect_err(|_| {
            error!("[DsiDisplay] panel init failed");
        })?;

        self.panel = Some(panel);
        self.timing = Some(config.dpi.timing);
        info!(
            "[DsiDisplay] {}x{} panel ready",
            config.dpi.timing.h_size, config.dpi.timing.v_size
        );
        Ok(())
    }

    /// Releases the panel, then the command channel.
    ///
    /// Both are dropped even on failure; the first error is returned.
    pub fn deinit(&mut self) -> Result<(), Error> {
        self.panel = None;
        self.timing = None;
        let mut result = Ok(());
        if let Some(dpi) = self.dpi.take() {
            if let Err(e) = self.host.del_dpi_panel(dpi) {
                error!("[DsiDisplay] DPI panel release failed: {}", e.name());
                result = Err(Error::Hal(e));
            }
        }
        if let Some(io) = self.io.take() {
            if let Err(e) = self.host.del_dbi_io(io) {
                error!("[DsiDisplay] DBI IO release failed: {}", e.name());
                result = result.and(Err(Error::Hal(e)));
            }
        }
        result
    }

    pub const fn is_initialized(&self) -> bool {
        self.panel.is_some()
    }

    /// The pixel endpoint, for the GUI backend.
    pub const fn panel_handle(&self) -> Option<&H::Dpi> {
        self.dpi.as_ref()
    }

    pub const fn io_handle(&self) -> Option<&H::Io> {
        self.io.as_ref()
    }

    /// `(width, height)` of the active panel.
    pub fn resolution(&self) -> Option<(u16, u16)> {
        self.timing.map(|t| (t.h_size, t.v_size))
    }

    fn live(&mut self) -> Result<(&Ili9881c, &mut H::Io), Error> {
        match (self.panel.as_ref(), self.io.as_mut()) {
            (Some(panel), Some(io)) => Ok((panel, io)),
            _ => {
                error!("[DsiDisplay] not initialized");
                Err(Error::InvalidState)
            }
        }
    }

    pub fn invert_color(&mut self, invert: bool) -> Result<(), Error> {
        let (panel, io) = self.live()?;
        panel.invert_color(io, invert)?;
        debug!("[DsiDisplay] invert color {}", invert);
        Ok(())
    }

    pub fn display_on(&mut self) -> Result<(), Error> {
        let (panel, io) = self.live()?;
        panel.display_on(io, true)
    }

    pub fn display_off(&mut self) -> Result<(), Error> {
        let (panel, io) = self.live()?;
        panel.display_on(io, false)
    }
}

impl<H: PanelHost> Drop for DsiDisplay<H> {
    fn drop(&mut self) {
        let _ = self.deinit();
    }
}
