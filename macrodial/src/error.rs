use macrodial_gpio::GpioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialError {
    #[error("slot {0} is out of range (0..12)")]
    InvalidSlot(usize),
    #[error("slot {slot} is bound twice on page {page:?}")]
    DuplicateSlot { page: String, slot: usize },
    #[error("page {0} is not registered")]
    UnknownPage(usize),
    #[error("no pages are registered")]
    NoPages,
    #[error("selection and sleep pages cannot join the page stack")]
    NotOrdinary,
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type DialResult<T> = Result<T, DialError>;
