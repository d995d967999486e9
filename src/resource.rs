//! Handle lifecycle shared by every bus and peripheral wrapper.

use crate::{
    Error,
    HalError,
    hal::Driver,
};

/// Owns a vendor [`Driver`] and at most one handle obtained from it.
///
/// The handle is present if and only if the last [`init`](Self::init)
/// succeeded and no [`deinit`](Self::deinit) ran since.
pub struct Resource<D: Driver> {
    name: &'static str,
    driver: D,
    handle: Option<D::Handle>,
}

impl<D: Driver> Resource<D> {
    pub const fn new(name: &'static str, driver: D) -> Self {
        Self {
            name,
            driver,
            handle: None,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Opens the resource. An already open handle is closed first.
    pub fn init(&mut self, config: &D::Config) -> Result<(), Error> {
        if self.handle.is_some() {
            warn!("[{}] already initialized, deinitializing first", self.name);
            self.deinit()?;
        }

        match self.driver.open(config) {
            Ok(handle) => {
                self.handle = Some(handle);
                info!("[{}] initialized", self.name);
                Ok(())
            }
            Err(e) => {
                error!("[{}] failed to initialize: {}", self.name, e.name());
                Err(e.into())
            }
        }
    }

    /// Closes the resource. Does nothing when it is not open.
    ///
    /// The handle is given up even if the driver reports a close failure.
    pub fn deinit(&mut self) -> Result<(), Error> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match self.driver.close(handle) {
            Ok(()) => {
                info!("[{}] deinitialized", self.name);
                Ok(())
            }
            Err(e) => {
                error!("[{}] failed to deinitialize: {}", self.name, e.name());
                Err(e.into())
            }
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    pub const fn handle(&self) -> Option<&D::Handle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut D::Handle> {
        self.handle.as_mut()
    }

    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Runs one operation on the live handle.
    ///
    /// Fails with [`Error::InvalidState`] before touching the driver when the
    /// resource is not initialized.
    pub fn with<R>(
        &mut self,
        what: &'static str,
        op: impl FnOnce(&mut D::Handle) -> Result<R, HalError>,
    ) -> Result<R, Error> {
        let Some(handle) = self.handle.as_mut() else {
            error!("[{}] {}: not initialized", self.name, what);
            return Err(Error::InvalidState);
        };

        op(handle).map_err(|e| {
            error!("[{}] {} failed: {}", self.name, what, e.name());
            Error::Hal(e)
        })
    }
}

impl<D: Driver> Drop for Resource<D> {
    fn drop(&mut self) {
        let _ = self.deinit();
    }
}
