//! Errors raised while starting the application.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("failed to start window: {0}")]
    Gui(#[from] eframe::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
