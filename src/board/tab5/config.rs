//! Tab5 hardware constants.

use crate::{
    audio::{
        CodecChip,
        CodecConfig,
    },
    device::{
        es7210,
        es8388,
        gt911,
    },
    display::{
        DbiIoConfig,
        DpiPanelConfig,
        DsiBusConfig,
        DsiDisplayConfig,
        InitCommand,
        PanelDevConfig,
        PanelVendorConfig,
        PhyClockSource,
        PixelFormat,
        RgbOrder,
        VideoTiming,
    },
    gui::{
        GuiDisplayConfig,
        GuiPortConfig,
        GuiTouchConfig,
    },
    i2c::I2cBusConfig,
    i2s::{
        I2sBusConfig,
        I2sClockConfig,
        I2sGpioConfig,
        I2sSlotConfig,
        I2sStdConfig,
        Role,
        SlotMask,
        SlotMode,
    },
    ldo::LdoChannelConfig,
    ledc::{
        ClockSource,
        LedcChannelConfig,
        LedcTimerConfig,
        SpeedMode,
    },
    touch::I2cTouchConfig,
};

pub const LCD_H_RES: u16 = 720;
pub const LCD_V_RES: u16 = 1280;

pub const I2C_BUS: I2cBusConfig = I2cBusConfig {
    port: 0,
    sda: 31,
    scl: 32,
    frequency_hz: 400_000,
    glitch_ignore_cnt: 7,
    intr_priority: 0,
    trans_queue_depth: 0,
    internal_pullup: true,
    allow_power_down: false,
};

// IO expander 0 (0x43)
pub const EXP0_SPEAKER_EN: u8 = 1;
pub const EXP0_LCD_EN: u8 = 4;
pub const EXP0_TOUCH_EN: u8 = 5;
// IO expander 1 (0x44)
pub const EXP1_WIFI_EN: u8 = 0;
pub const EXP1_USB_EN: u8 = 3;

/// LCD supply settling time after LCD_EN.
pub const LCD_POWER_SETTLE_MS: u32 = 1000;
/// DSI PHY supply settling time after the LDO comes up.
pub const DSI_PHY_SETTLE_MS: u32 = 100;

pub const LEDC_TIMER: LedcTimerConfig = LedcTimerConfig {
    speed_mode: SpeedMode::Low,
    duty_resolution_bits: 10,
    timer: 0,
    freq_hz: 5000,
    clock: ClockSource::Auto,
};

/// Backlight PWM on GPIO22, off until bring-up finishes.
pub const LEDC_CHANNEL: LedcChannelConfig = LedcChannelConfig {
    gpio: 22,
    speed_mode: SpeedMode::Low,
    channel: 0,
    interrupt: false,
    timer: 0,
    duty: 0,
    hpoint: 0,
};

/// LDO3 feeds the MIPI DSI PHY.
pub const DSI_PHY_LDO: LdoChannelConfig = LdoChannelConfig {
    channel: 3,
    voltage_mv: 2500,
    adjustable: false,
    owned_by_hw: false,
};

pub const DSI_BUS: DsiBusConfig = DsiBusConfig {
    bus_id: 0,
    num_data_lanes: 2,
    phy_clk_src: PhyClockSource::Default,
    lane_bit_rate_mbps: 1000,
};

pub const DSI_DISPLAY: DsiDisplayConfig = DsiDisplayConfig {
    dbi: DbiIoConfig {
        virtual_channel: 0,
        lcd_cmd_bits: 8,
        lcd_param_bits: 8,
    },
    dpi: DpiPanelConfig {
        virtual_channel: 0,
        dpi_clock_freq_mhz: 60,
        pixel_format: PixelFormat::Rgb565,
        num_fbs: 1,
        timing: VideoTiming {
            h_size: LCD_H_RES,
            v_size: LCD_V_RES,
            hsync_pulse_width: 40,
            hsync_back_porch: 140,
            hsync_front_porch: 40,
            vsync_pulse_width: 4,
            vsync_back_porch: 20,
            vsync_front_porch: 20,
        },
        use_dma2d: false,
        disable_lp: false,
    },
    panel: PanelDevConfig {
        reset_gpio: None,
        rgb_order: RgbOrder::Rgb,
        big_endian: true,
        bits_per_pixel: 16,
        reset_active_high: false,
    },
};

/// ILI9881C vendor init sequence for the Tab5 panel, sent verbatim.
pub const PANEL_INIT_CMDS: &[InitCommand] = &[
    // page 1
    InitCommand::new(0xff, &[0x98, 0x81, 0x01]),
    InitCommand::new(0xb7, &[0x03]),
    // page 3
    InitCommand::new(0xff, &[0x98, 0x81, 0x03]),
    InitCommand::new(0x01, &[0x00]),
    InitCommand::new(0x02, &[0x00]),
    InitCommand::new(0x03, &[0x73]),
    InitCommand::new(0x04, &[0x00]),
    InitCommand::new(0x05, &[0x00]),
    InitCommand::new(0x06, &[0x08]),
    InitCommand::new(0x07, &[0x00]),
    InitCommand::new(0x08, &[0x00]),
    InitCommand::new(0x09, &[0x1b]),
    InitCommand::new(0x0a, &[0x01]),
    InitCommand::new(0x0b, &[0x01]),
    InitCommand::new(0x0c, &[0x0d]),
    InitCommand::new(0x0d, &[0x01]),
    InitCommand::new(0x0e, &[0x01]),
    InitCommand::new(0x0f, &[0x26]),
    InitCommand::new(0x10, &[0x26]),
    InitCommand::new(0x11, &[0x00]),
    InitCommand::new(0x12, &[0x00]),
    InitCommand::new(0x13, &[0x02]),
    InitCommand::new(0x14, &[0x00]),
    InitCommand::new(0x15, &[0x00]),
    InitCommand::new(0x16, &[0x00]),
    InitCommand::new(0x17, &[0x00]),
    InitCommand::new(0x18, &[0x00]),
    InitCommand::new(0x19, &[0x00]),
    InitCommand::new(0x1a, &[0x00]),
    InitCommand::new(0x1b, &[0x00]),
    InitCommand::new(0x1c, &[0x00]),
    InitCommand::new(0x1d, &[0x00]),
    InitCommand::new(0x1e, &[0x40]),
    InitCommand::new(0x1f, &[0x00]),
    InitCommand::new(0x20, &[0x06]),
    InitCommand::new(0x21, &[0x01]),
    InitCommand::new(0x22, &[0x00]),
    InitCommand::new(0x23, &[0x00]),
    InitCommand::new(0x24, &[0x00]),
    InitCommand::new(0x25, &[0x00]),
    InitCommand::new(0x26, &[0x00]),
    InitCommand::new(0x27, &[0x00]),
    InitCommand::new(0x28, &[0x33]),
    InitCommand::new(0x29, &[0x03]),
    InitCommand::new(0x2a, &[0x00]),
    InitCommand::new(0x2b, &[0x00]),
    InitCommand::new(0x2c, &[0x00]),
    InitCommand::new(0x2d, &[0x00]),
    InitCommand::new(0x2e, &[0x00]),
    InitCommand::new(0x2f, &[0x00]),
    InitCommand::new(0x30, &[0x00]),
    InitCommand::new(0x31, &[0x00]),
    InitCommand::new(0x32, &[0x00]),
    InitCommand::new(0x33, &[0x00]),
    InitCommand::new(0x34, &[0x00]),
    InitCommand::new(0x35, &[0x00]),
    InitCommand::new(0x36, &[0x00]),
    InitCommand::new(0x37, &[0x00]),
    InitCommand::new(0x38, &[0x00]),
    InitCommand::new(0x39, &[0x00]),
    InitCommand::new(0x3a, &[0x00]),
    InitCommand::new(0x3b, &[0x00]),
    InitCommand::new(0x3c, &[0x00]),
    InitCommand::new(0x3d, &[0x00]),
    InitCommand::new(0x3e, &[0x00]),
    InitCommand::new(0x3f, &[0x00]),
    InitCommand::new(0x40, &[0x00]),
    InitCommand::new(0x41, &[0x00]),
    InitCommand::new(0x42, &[0x00]),
    InitCommand::new(0x43, &[0x00]),
    InitCommand::new(0x44, &[0x00]),
    InitCommand::new(0x50, &[0x01]),
    InitCommand::new(0x51, &[0x23]),
    InitCommand::new(0x52, &[0x45]),
    InitCommand::new(0x53, &[0x67]),
    InitCommand::new(0x54, &[0x89]),
    InitCommand::new(0x55, &[0xab]),
    InitCommand::new(0x56, &[0x01]),
    InitCommand::new(0x57, &[0x23]),
    InitCommand::new(0x58, &[0x45]),
    InitCommand::new(0x59, &[0x67]),
    InitCommand::new(0x5a, &[0x89]),
    InitCommand::new(0x5b, &[0xab]),
    InitCommand::new(0x5c, &[0xcd]),
    InitCommand::new(0x5d, &[0xef]),
    InitCommand::new(0x5e, &[0x11]),
    InitCommand::new(0x5f, &[0x02]),
    InitCommand::new(0x60, &[0x00]),
    InitCommand::new(0x61, &[0x07]),
    InitCommand::new(0x62, &[0x06]),
    InitCommand::new(0x63, &[0x0e]),
    InitCommand::new(0x64, &[0x0f]),
    InitCommand::new(0x65, &[0x0c]),
    InitCommand::new(0x66, &[0x0d]),
    InitCommand::new(0x67, &[0x02]),
    InitCommand::new(0x68, &[0x02]),
    InitCommand::new(0x69, &[0x02]),
    InitCommand::new(0x6a, &[0x02]),
    InitCommand::new(0x6b, &[0x02]),
    InitCommand::new(0x6c, &[0x02]),
    InitCommand::new(0x6d, &[0x02]),
    InitCommand::new(0x6e, &[0x02]),
    InitCommand::new(0x6f, &[0x02]),
    InitCommand::new(0x70, &[0x02]),
    InitCommand::new(0x71, &[0x02]),
    InitCommand::new(0x72, &[0x02]),
    InitCommand::new(0x73, &[0x05]),
    InitCommand::new(0x74, &[0x01]),
    InitCommand::new(0x75, &[0x02]),
    InitCommand::new(0x76, &[0x00]),
    InitCommand::new(0x77, &[0x07]),
    InitCommand::new(0x78, &[0x06]),
    InitCommand::new(0x79, &[0x0e]),
    InitCommand::new(0x7a, &[0x0f]),
    InitCommand::new(0x7b, &[0x0c]),
    InitCommand::new(0x7c, &[0x0d]),
    InitCommand::new(0x7d, &[0x02]),
    InitCommand::new(0x7e, &[0x02]),
    InitCommand::new(0x7f, &[0x02]),
    InitCommand::new(0x80, &[0x02]),
    InitCommand::new(0x81, &[0x02]),
    InitCommand::new(0x82, &[0x02]),
    InitCommand::new(0x83, &[0x02]),
    InitCommand::new(0x84, &[0x02]),
    InitCommand::new(0x85, &[0x02]),
    InitCommand::new(0x86, &[0x02]),
    InitCommand::new(0x87, &[0x02]),
    InitCommand::new(0x88, &[0x02]),
    InitCommand::new(0x89, &[0x05]),
    InitCommand::new(0x8a, &[0x01]),
    // page 4
    InitCommand::new(0xff, &[0x98, 0x81, 0x04]),
    InitCommand::new(0x38, &[0x01]),
    InitCommand::new(0x39, &[0x00]),
    InitCommand::new(0x6c, &[0x15]),
    InitCommand::new(0x6e, &[0x1a]),
    InitCommand::new(0x6f, &[0x25]),
    InitCommand::new(0x3a, &[0xa4]),
    InitCommand::new(0x8d, &[0x20]),
    InitCommand::new(0x87, &[0xba]),
    InitCommand::new(0x3b, &[0x98]),
    // page 1
    InitCommand::new(0xff, &[0x98, 0x81, 0x01]),
    InitCommand::new(0x22, &[0x0a]),
    InitCommand::new(0x31, &[0x00]),
    InitCommand::new(0x50, &[0x6b]),
    InitCommand::new(0x51, &[0x66]),
    InitCommand::new(0x53, &[0x73]),
    InitCommand::new(0x55, &[0x8b]),
    InitCommand::new(0x60, &[0x1b]),
    InitCommand::new(0x61, &[0x01]),
    InitCommand::new(0x62, &[0x0c]),
    InitCommand::new(0x63, &[0x00]),
    // gamma p
    InitCommand::new(0xa0, &[0x00]),
    InitCommand::new(0xa1, &[0x15]),
    InitCommand::new(0xa2, &[0x1f]),
    InitCommand::new(0xa3, &[0x13]),
    InitCommand::new(0xa4, &[0x11]),
    InitCommand::new(0xa5, &[0x21]),
    InitCommand::new(0xa6, &[0x17]),
    InitCommand::new(0xa7, &[0x1b]),
    InitCommand::new(0xa8, &[0x6b]),
    InitCommand::new(0xa9, &[0x1e]),
    InitCommand::new(0xaa, &[0x2b]),
    InitCommand::new(0xab, &[0x5d]),
    InitCommand::new(0xac, &[0x19]),
    InitCommand::new(0xad, &[0x14]),
    InitCommand::new(0xae, &[0x4b]),
    InitCommand::new(0xaf, &[0x1d]),
    InitCommand::new(0xb0, &[0x27]),
    InitCommand::new(0xb1, &[0x49]),
    InitCommand::new(0xb2, &[0x5d]),
    InitCommand::new(0xb3, &[0x39]),
    // gamma n
    InitCommand::new(0xc0, &[0x00]),
    InitCommand::new(0xc1, &[0x01]),
    InitCommand::new(0xc2, &[0x0c]),
    InitCommand::new(0xc3, &[0x11]),
    InitCommand::new(0xc4, &[0x15]),
    InitCommand::new(0xc5, &[0x28]),
    InitCommand::new(0xc6, &[0x1b]),
    InitCommand::new(0xc7, &[0x1c]),
    InitCommand::new(0xc8, &[0x62]),
    InitCommand::new(0xc9, &[0x1c]),
    InitCommand::new(0xca, &[0x29]),
    InitCommand::new(0xcb, &[0x60]),
    InitCommand::new(0xcc, &[0x16]),
    InitCommand::new(0xcd, &[0x17]),
    InitCommand::new(0xce, &[0x4a]),
    InitCommand::new(0xcf, &[0x23]),
    InitCommand::new(0xd0, &[0x24]),
    InitCommand::new(0xd1, &[0x4f]),
    InitCommand::new(0xd2, &[0x5f]),
    InitCommand::new(0xd3, &[0x39]),
    // page 0
    InitCommand::new(0xff, &[0x98, 0x81, 0x00]),
    InitCommand::new(0x35, &[]),
    InitCommand::new(0xfe, &[]),
    InitCommand::new(0x29, &[]),
];

pub const PANEL_VENDOR: PanelVendorConfig = PanelVendorConfig {
    init_cmds: PANEL_INIT_CMDS,
    lane_num: 2,
};

pub const TOUCH: I2cTouchConfig = I2cTouchConfig {
    address: gt911::ADDR_BACKUP,
    scl_speed_hz: 400_000,
    x_max: LCD_H_RES,
    y_max: LCD_V_RES,
    reset_gpio: None,
    interrupt_gpio: None,
    reset_active_high: false,
    interrupt_active_high: false,
    swap_xy: false,
    mirror_x: false,
    mirror_y: false,
};

pub const I2S_BUS: I2sBusConfig = I2sBusConfig {
    port: 0,
    role: Role::Master,
    dma_desc_num: 6,
    dma_frame_num: 256,
    auto_clear_after_cb: true,
    auto_clear_before_cb: false,
    intr_priority: 0,
};

/// Shared by TX and RX: 48 kHz, 16-bit, mono.
pub const I2S_STD: I2sStdConfig = I2sStdConfig {
    clock: I2sClockConfig {
        sample_rate_hz: 48_000,
        mclk_multiple: 256,
        bclk_div: 8,
    },
    slot: I2sSlotConfig {
        data_bits: 16,
        slot_bits: None,
        mode: SlotMode::Mono,
        mask: SlotMask::Both,
        ws_width: 16,
        ws_pol: false,
        bit_shift: true,
        msb_right: true,
        left_align: false,
        big_endian: false,
    },
    gpio: I2sGpioConfig {
        mclk: 30,
        bclk: 27,
        ws: 29,
        dout: 26,
        din: 28,
        invert_mclk: false,
        invert_bclk: false,
        invert_ws: false,
    },
};

pub const SPEAKER_CODEC: CodecConfig = CodecConfig {
    chip: CodecChip::Es8388,
    address: es8388::DEFAULT_ADDR,
    master_mode: false,
};

pub const MICROPHONE_CODEC: CodecConfig = CodecConfig {
    chip: CodecChip::Es7210 { mics: 0b0001 },
    address: es7210::DEFAULT_ADDR,
    master_mode: false,
};

pub const GUI_PORT: GuiPortConfig = GuiPortConfig {
    task_priority: 5,
    stack_size: 8192,
    affinity: Some(1),
    max_sleep_ms: 20,
    timer_period_ms: 25,
};

pub const GUI_DISPLAY: GuiDisplayConfig = GuiDisplayConfig {
    buffer_size: LCD_H_RES as usize * 50,
    double_buffer: true,
    hor_res: LCD_H_RES,
    ver_res: LCD_V_RES,
    monochrome: false,
    swap_xy: false,
    mirror_x: false,
    mirror_y: false,
    buffer_dma: true,
    buffer_spiram: false,
    sw_rotate: true,
    swap_bytes: false,
    full_refresh: false,
    direct_mode: false,
    avoid_tearing: false,
};

pub const GUI_TOUCH: GuiTouchConfig = GuiTouchConfig {
    scale_x: 0.0,
    scale_y: 0.0,
};
