//! ILI9881C MIPI-DSI panel controller command set.

use embedded_hal::delay::DelayNs;

use crate::{
    Error,
    display::{
        InitCommand,
        PanelDevConfig,
        PanelVendorConfig,
        PixelFormat,
        RgbOrder,
    },
    hal::PanelIo,
};

const CMD_SWRESET: u8 = 0x01;
const CMD_SLPOUT: u8 = 0x11;
const CMD_INVOFF: u8 = 0x20;
const CMD_INVON: u8 = 0x21;
const CMD_DISPOFF: u8 = 0x28;
const CMD_DISPON: u8 = 0x29;
const CMD_MADCTL: u8 = 0x36;
const CMD_COLMOD: u8 = 0x3a;

/// Page select: `0xFF 0x98 0x81 <page>`.
const CMD_PAGE_SELECT: u8 = 0xff;
const PAGE_SELECT_PREFIX: [u8; 2] = [0x98, 0x81];
/// Page 1 pad control, selects the DSI lane count.
const CMD_PAD_CONTROL: u8 = 0xb7;
const PAD_2_LANE: u8 = 0x03;
const PAD_3_4_LANE: u8 = 0x02;

const MADCTL_BGR: u8 = 0x08;

const RESET_DELAY_MS: u32 = 20;
const SLEEP_OUT_DELAY_MS: u32 = 120;

/// Panel state derived from the vendor and device configuration.
#[derive(Debug, Clone, Copy)]
pub struct Ili9881c {
    init_cmds: &'static [InitCommand],
    lanes: u8,
    bits_per_pixel: u8,
    madctl: u8,
    colmod: u8,
}

impl Ili9881c {
    pub fn new(vendor: &PanelVendorConfig, panel: &PanelDevConfig) -> Result<Self, Error> {
        let colmod = match panel.bits_per_pixel {
            16 => 0x55,
            18 => 0x66,
            24 => 0x77,
            _ => return Err(Error::InvalidArgument),
        };
        if !(1..=4).contains(&vendor.lane_num) {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            init_cmds: vendor.init_cmds,
            lanes: vendor.lane_num,
            bits_per_pixel: panel.bits_per_pixel,
            madctl: match panel.rgb_order {
                RgbOrder::Rgb => 0,
                RgbOrder::Bgr => MADCTL_BGR,
            },
            colmod,
        })
    }

    pub fn pixel_format_matches(&self, format: PixelFormat) -> bool {
        format.bits_per_pixel() == self.bits_per_pixel
    }

    fn select_page(io: &mut impl PanelIo, page: u8) -> Result<(), Error> {
        let [a, b] = PAGE_SELECT_PREFIX;
        io.tx_param(CMD_PAGE_SELECT, &[a, b, page])?;
        Ok(())
    }

    /// Software reset; the panel has no reset line on this board.
    pub fn reset(&self, io: &mut impl PanelIo, delay: &mut impl DelayNs) -> Result<(), Error> {
        io.tx_param(CMD_SWRESET, &[])?;
        delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Lane setup, sleep out, pixel format, then the vendor table verbatim.
    pub fn init(&self, io: &mut impl PanelIo, delay: &mut impl DelayNs) -> Result<(), Error> {
        Self::select_page(io, 1)?;
        let pad = if self.lanes == 2 { PAD_2_LANE } else { PAD_3_4_LANE };
        io.tx_param(CMD_PAD_CONTROL, &[pad])?;
        Self::select_page(io, 0)?;

        io.tx_param(CMD_SLPOUT, &[])?;
        delay.delay_ms(SLEEP_OUT_DELAY_MS);

        io.tx_param(CMD_MADCTL, &[self.madctl])?;
        io.tx_param(CMD_COLMOD, &[self.colmod])?;

        for cmd in self.init_cmds {
            io.tx_param(cmd.cmd, cmd.data)?;
            if cmd.delay_ms > 0 {
                delay.delay_ms(u32::from(cmd.delay_ms));
            }
        }
        Ok(())
    }

    pub fn invert_color(&self, io: &mut impl PanelIo, invert: bool) -> Result<(), Error> {
        io.tx_param(if invert { CMD_INVON } else { CMD_INVOFF }, &[])?;
        Ok(())
    }

    pub fn display_on(&self, io: &mut impl PanelIo, on: bool) -> Result<(), Error> {
        io.tx_param(if on { CMD_DISPON } else { CMD_DISPOFF }, &[])?;
        Ok(())
    }
}
