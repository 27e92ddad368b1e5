//! The byte level capabilities the command engine needs from a serial link.
//!
//! The engine never touches a UART directly. Everything it does goes through
//! the [`Transport`] trait, which is a small set of capabilities:
//!
//! * **write** one byte,
//! * **read** one byte without blocking (`None` when nothing is buffered),
//! * **delay** for a number of milliseconds,
//! * **reinitialize** the local side of the link at a new baud rate,
//! * **log** a line of diagnostic text.
//!
//! Any of them may be missing, in which case the implementation returns
//! [`Unsupported`]. The optional ones default to that. A missing delay,
//! reinitializer or log sink only disables the behavior depending on it. A
//! missing writer or reader turns every exchange into a failure.
//!
//! Two implementations are provided: [`SerialTransport`] over a real
//! [`serialport`] port, and [`MockTransport`] for simulating a device.

mod mock;
mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

use std::fmt;

// =============================================================================
// Public Interface
// =============================================================================

/// Returned by a [`Transport`] for a capability it does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsupported;
impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("capability not supported by the transport")
    }
}
impl std::error::Error for Unsupported {}

/// Byte level primitives consumed by the command engine.
pub trait Transport {
    /// Send one byte to the device.
    fn write_byte(&mut self, byte: u8) -> Result<(), Unsupported>;

    /// Poll for one received byte. Must return immediately with `Ok(None)`
    /// when no data is available.
    fn read_byte(&mut self) -> Result<Option<u8>, Unsupported>;

    /// Block the calling thread for `ms` milliseconds.
    fn delay_ms(&mut self, _ms: u32) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    /// Reconfigure the local end of the link at `baud` symbols per second.
    /// This says nothing to the device itself.
    fn reinitialize_baud(&mut self, _baud: u32) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    /// Receive one line of diagnostic text.
    fn log_line(&mut self, _line: &str) -> Result<(), Unsupported> {
        Err(Unsupported)
    }
}
