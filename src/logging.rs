//! Transports report their transitions through `tracing` events: creation,
//! binding, refused packets, status changes and freeing. Installing a
//! subscriber is left to the simulation; [`init_events`] is the stock one.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error as ThisError;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, ThisError)]
pub enum LoggingError {
    #[error("Could not open the log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("A global subscriber is already installed")]
    AlreadyInstalled,
}

/// Sends all events to a JSON log file named after today's date inside
/// `directory`, creating the directory if needed. Should only be called once
/// when the simulation starts. Returns the path of the log file.
pub fn init_events(directory: impl AsRef<Path>) -> Result<PathBuf, LoggingError> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;
    let file_path = directory.join(format!(
        "debug-{}.log",
        chrono::offset::Local::now().format("%y-%m-%d")
    ));
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&file_path)?;
    let subscriber = FmtSubscriber::builder()
        .with_writer(Arc::new(file))
        .json()
        .finish();
    // One subscriber for the whole process so every host logs to the same file
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInstalled)?;
    Ok(file_path)
}
