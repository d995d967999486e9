//! Port to the external GUI library that renders into the display.

use crate::{
    Error,
    hal::GuiBackend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GuiPortConfig {
    pub task_priority: u8,
    pub stack_size: usize,
    /// Core the render task is pinned to, `None` for no affinity.
    pub affinity: Option<u8>,
    pub max_sleep_ms: u32,
    pub timer_period_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GuiDisplayConfig {
    /// Draw buffer size in pixels.
    pub buffer_size: usize,
    pub double_buffer: bool,
    pub hor_res: u16,
    pub ver_res: u16,
    pub monochrome: bool,
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
    pub buffer_dma: bool,
    pub buffer_spiram: bool,
    pub sw_rotate: bool,
    pub swap_bytes: bool,
    pub full_refresh: bool,
    pub direct_mode: bool,
    /// Wait for vsync before swapping frame buffers.
    pub avoid_tearing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GuiTouchConfig {
    /// `0.0` leaves the axis unscaled.
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Lifecycle around a [`GuiBackend`].
pub struct GuiPort<B> {
    backend: B,
    started: bool,
    displays: u8,
    touches: u8,
}

impl<B> GuiPort<B> {
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            started: false,
            displays: 0,
            touches: 0,
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.started
    }

    pub const fn display_count(&self) -> u8 {
        self.displays
    }

    pub const fn touch_count(&self) -> u8 {
        self.touches
    }

    pub fn init<D, T>(&mut self, config: &GuiPortConfig) -> Result<(), Error>
    where
        B: GuiBackend<D, T>,
    {
        if self.started {
            warn!("[GuiPort] already started, stopping first");
            self.deinit::<D, T>()?;
        }
        self.backend.start(config).map_err(|e| {
            error!("[GuiPort] failed to start: {}", e.name());
            Error::Hal(e)
        })?;
        self.started = true;
        info!("[GuiPort] started, task priority {}", config.task_priority);
        Ok(())
    }

    pub fn deinit<D, T>(&mut self) -> Result<(), Error>
    where
        B: GuiBackend<D, T>,
    {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.displays = 0;
        self.touches = 0;
        self.backend.stop().map_err(|e| {
            error!("[GuiPort] failed to stop: {}", e.name());
            Error::Hal(e)
        })
    }

    pub fn add_display<D, T>(&mut self, display: &D, config: &GuiDisplayConfig) -> Result<(), Error>
    where
        B: GuiBackend<D, T>,
    {
        if !self.started {
            error!("[GuiPort] add_display before init");
            return Err(Error::InvalidState);
        }
        self.backend.add_display(display, config).map_err(|e| {
            error!("[GuiPort] add_display failed: {}", e.name());
            Error::Hal(e)
        })?;
        self.displays += 1;
        info!("[GuiPort] display {}x{} attached", config.hor_res, config.ver_res);
        Ok(())
    }

    pub fn add_touch<D, T>(&mut self, touch: &T, config: &GuiTouchConfig) -> Result<(), Error>
    where
        B: GuiBackend<D, T>,
    {
        if !self.started {
            error!("[GuiPort] add_touch before init");
            return Err(Error::InvalidState);
        }
        self.backend.add_touch(touch, config).map_err(|e| {
            error!("[GuiPort] add_touch failed: {}", e.name());
            Error::Hal(e)
        })?;
        self.touches += 1;
        info!("[GuiPort] touch input attached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HalError,
        board::tab5::config,
        mock::{
            FakeGui,
            Journal,
        },
    };

    type Port = GuiPort<FakeGui>;

    #[test]
    fn attach_requires_a_started_port() {
        let journal = Journal::default();
        let mut gui: Port = GuiPort::new(FakeGui::new(&journal));

        assert_eq!(
            gui.add_display::<u8, u8>(&0, &config::GUI_DISPLAY),
            Err(Error::InvalidState)
        );
        assert_eq!(
            gui.add_touch::<u8, u8>(&0, &config::GUI_TOUCH),
            Err(Error::InvalidState)
        );
        assert!(journal.events().is_empty());
    }

    #[test]
    fn start_attach_stop() {
        let journal = Journal::default();
        let mut gui: Port = GuiPort::new(FakeGui::new(&journal));

        gui.init::<u8, u8>(&config::GUI_PORT).unwrap();
        gui.add_display::<u8, u8>(&0, &config::GUI_DISPLAY).unwrap();
        gui.add_touch::<u8, u8>(&0, &config::GUI_TOUCH).unwrap();
        gui.deinit::<u8, u8>().unwrap();
        gui.deinit::<u8, u8>().unwrap();

        assert_eq!(
            journal.events(),
            [
                "gui.start prio=5",
                "gui.add_display 720x1280",
                "gui.add_touch",
                "gui.stop"
            ]
        );
        assert_eq!(gui.display_count(), 0);
    }

    #[test]
    fn failed_start_leaves_the_port_stopped() {
        let journal = Journal::default();
        let mut backend = FakeGui::new(&journal);
        backend.fail_start = Some(HalError::NoMemory);
        let mut gui: Port = GuiPort::new(backend);

        assert_eq!(
            gui.init::<u8, u8>(&config::GUI_PORT),
            Err(Error::Hal(HalError::NoMemory))
        );
        assert!(!gui.is_initialized());
    }
}
