//! Error types for tock-notify.

use thiserror::Error;

/// tock-notify error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to open log file: {0}")]
    LogInit(#[from] tracing_appender::rolling::InitError),

    #[error("Missing required setting: {0} (pass it on the command line or in --config)")]
    MissingSetting(&'static str),

    #[error("Failed to open data store {}: {source}", path.display())]
    DataStore {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to launch geckodriver at {}: {source}", path.display())]
    DriverLaunch {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("WebDriver session error: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command error: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
