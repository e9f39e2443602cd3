//! Error types for the NFS monitor.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur outside of the probes themselves.
///
/// Probe failures are not errors: they are the expected outcome the monitor
/// reacts to. These variants cover configuration and alert delivery.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::MonitorConfig`]
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configured mail address does not parse
    #[error("Invalid mail address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// The alert message could not be assembled
    #[error("Failed to build alert message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP transport or delivery failed
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Other I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
