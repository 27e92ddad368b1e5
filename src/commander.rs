//! The AT command engine.
//!
//! An [`AtCommander`] drives one device connection. It borrows the
//! [`Transport`] and the [`PlatformProfile`] for the duration of the session
//! and owns the [`SessionState`].
//!
//! Every command the device accepts needs it to be in **command mode**. The
//! engine has only two states:
//!
//! ```text
//!                    enter: probe candidate bauds,
//!                    first `CMD` answer wins
//!          .--------------.  ------------------>  .-------------.
//! START -->| Disconnected |                       |  Connected  |<--.
//!          '--------------'  <------------------  '-------------'   |
//!                              exit: `END`              |  commands |
//!                              confirmed                '-----------'
//! ```
//!
//! Command mode is sticky: the operations enter it when needed and never
//! leave it, so several commands can be issued in a row without
//! renegotiating. Leaving is always an explicit
//! [`exit_command_mode`](AtCommander::exit_command_mode).
//!
//! All operations are synchronous. Waiting is done with the transport's
//! delay, in fixed steps, and is always bounded:
//!
//! * after each request, a [`SETTLE_DELAY_MS`] pause,
//! * then up to [`MAX_RETRIES`] empty polls of
//!   [`RETRY_DELAY_MS`](reader::RETRY_DELAY_MS) each while reading the
//!   response.
//!
//! No operation returns an error. Success is reported as a `bool` (or a
//! length for queries) and failures are explained through diagnostics sent
//! to the `log` facade and the transport's log sink.
//!
//! ```
//! use atcommander::{AtCommander, MockTransport, PlatformProfile};
//!
//! let profile = PlatformProfile::rn42();
//! let mut device = MockTransport::new()
//!     .reply(b"$$$", b"CMD")
//!     .reply(b"SU,115K\r", b"AOK")
//!     .reply(b"GN\r", b"RN42-1A2B\r\n");
//!
//! let mut commander = AtCommander::new(&mut device, &profile);
//! assert!(commander.set_baud(115_200));
//!
//! let mut name = [0_u8; 20];
//! let len = commander.get_name(&mut name);
//! assert_eq!(&name[..len], b"RN42-1A2B");
//! ```

mod command_mode;
mod commands;
pub mod reader;
pub mod response;
mod session;

pub use session::SessionState;

use crate::{profile::PlatformProfile, transport::Transport};

/// Pause after a request, letting the device react before reading.
pub const SETTLE_DELAY_MS: u32 = 100;

/// Empty polls tolerated while reading a response.
pub const MAX_RETRIES: u32 = 3;

/// A command session with one device.
pub struct AtCommander<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    profile: &'a PlatformProfile,
    state: SessionState,
}

impl<'a, T: Transport + ?Sized> AtCommander<'a, T> {
    /// Start a session with nothing known about the link.
    pub fn new(transport: &'a mut T, profile: &'a PlatformProfile) -> Self {
        Self::with_state(transport, profile, SessionState::new())
    }

    /// Resume a session, e.g. one whose host baud rate is already known.
    pub fn with_state(
        transport: &'a mut T,
        profile: &'a PlatformProfile,
        state: SessionState,
    ) -> Self {
        AtCommander {
            transport,
            profile,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn profile(&self) -> &PlatformProfile {
        self.profile
    }

    pub fn transport(&self) -> &T {
        &*self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut *self.transport
    }

    /// End the session, keeping what was learned about the link.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    // -------------------------------------------------------------------------
    // Exchange primitives
    // -------------------------------------------------------------------------

    /// Send `bytes` one at a time. `false` when the transport cannot write.
    fn write(&mut self, bytes: &[u8]) -> bool {
        for &byte in bytes {
            if self.transport.write_byte(byte).is_err() {
                diag!(self.transport, "No write function set, can't send a request");
                return false;
            }
        }
        true
    }

    fn delay(&mut self, ms: u32) {
        let _ = self.transport.delay_ms(ms);
    }

    /// Drop stale input, write `request`, let the device settle, then read a response of the
    /// expected length and compare it.
    fn exchange(&mut self, request: &[u8], expected: &[u8]) -> bool {
        reader::drain(&mut *self.transport);
        if !self.write(request) {
            return false;
        }
        self.delay(SETTLE_DELAY_MS);

        let mut response = vec![0_u8; expected.len()];
        let bytes_read = reader::read(&mut *self.transport, &mut response, MAX_RETRIES);
        response::check(&mut *self.transport, &response[..bytes_read], expected)
    }
}
