//! Error types for configuration and port plumbing.
//!
//! The command engine itself never fails with an error: its operations report
//! success as booleans or lengths and explain failures through diagnostics.
//! Errors here are for everything around it: loading a platform profile,
//! opening the serial port, formatting a request from bad arguments.

use std::path::PathBuf;

use thiserror::Error;

/// A platform profile could not be loaded or is unusable.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not read profile `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("profile `{0}` has no candidate baud rates")]
    NoBaudRates(String),

    #[error("profile `{profile}` has an empty `{field}`")]
    EmptyLiteral {
        profile: String,
        field: &'static str,
    },

    #[error("profile `{profile}`: `{field}` must contain a `{{}}` placeholder")]
    MissingPlaceholder {
        profile: String,
        field: &'static str,
    },
}

/// Arguments that cannot be turned into a request for the device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("baud rate {0} is not supported by the device")]
    UnsupportedBaud(u32),

    #[error("device name cannot be empty")]
    EmptyName,

    #[error("device name is {len} bytes long, the device accepts at most {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("device name cannot contain control characters or `,`")]
    InvalidNameCharacter,
}

/// Top level error of the `atcommander` library plumbing.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("no serial port selected")]
    NoPort,
}

// =============================================================================
// Unit Tests
// =============================================================================
