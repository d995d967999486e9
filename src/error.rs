//! Error types shared by every wrapper.

use embedded_hal::i2c::ErrorKind;

/// Failure reported by a vendor driver behind one of the [`hal`](crate::hal) seams.
///
/// Mirrors the handful of ESP-IDF error codes the board code ever sees, so
/// logs read the same as the vendor SDK's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    #[error("ESP_FAIL")]
    Fail,
    #[error("ESP_ERR_NO_MEM")]
    NoMemory,
    #[error("ESP_ERR_INVALID_ARG")]
    InvalidArgument,
    #[error("ESP_ERR_INVALID_STATE")]
    InvalidState,
    #[error("ESP_ERR_NOT_FOUND")]
    NotFound,
    #[error("ESP_ERR_NOT_SUPPORTED")]
    NotSupported,
    #[error("ESP_ERR_TIMEOUT")]
    Timeout,
}

impl HalError {
    /// Symbolic name, as `esp_err_to_name` would print it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fail => "ESP_FAIL",
            Self::NoMemory => "ESP_ERR_NO_MEM",
            Self::InvalidArgument => "ESP_ERR_INVALID_ARG",
            Self::InvalidState => "ESP_ERR_INVALID_STATE",
            Self::NotFound => "ESP_ERR_NOT_FOUND",
            Self::NotSupported => "ESP_ERR_NOT_SUPPORTED",
            Self::Timeout => "ESP_ERR_TIMEOUT",
        }
    }
}

/// Board support error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The vendor driver refused to open, close or drive a resource.
    #[error("vendor driver failed: {0}")]
    Hal(HalError),
    /// A register transaction on the I2C bus failed.
    #[error("i2c transaction failed: {0:?}")]
    I2c(ErrorKind),
    /// The operation needs a wrapper (or its upstream bus) that is not initialized.
    #[error("not initialized")]
    InvalidState,
    /// A factory returned no usable handle.
    #[error("could not create {0}")]
    HandleCreation(&'static str),
    /// A probe read back an identifier belonging to some other chip.
    #[error("unexpected device id {found:#04x}, expected {expected:#04x}")]
    UnexpectedDevice { expected: u8, found: u8 },
    #[error("invalid argument")]
    InvalidArgument,
    #[error("not supported by this chip")]
    Unsupported,
}

impl From<HalError> for Error {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

impl Error {
    /// Converts any `embedded-hal` I2C error into [`Error::I2c`].
    pub fn i2c<E: embedded_hal::i2c::Error>(e: E) -> Self {
        Self::I2c(e.kind())
    }

    /// Short symbolic name for log lines.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hal(e) => e.name(),
            Self::I2c(_) => "I2C_TRANSACTION",
            Self::InvalidState => "ESP_ERR_INVALID_STATE",
            Self::HandleCreation(_) => "HANDLE_CREATION",
            Self::UnexpectedDevice { .. } => "UNEXPECTED_DEVICE",
            Self::InvalidArgument => "ESP_ERR_INVALID_ARG",
            Self::Unsupported => "ESP_ERR_NOT_SUPPORTED",
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
