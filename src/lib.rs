//! Atcommander configures serial modules driven by AT-style commands, such
//! as the Roving Networks RN-42 Bluetooth module, from the host side of a
//! serial link.
//!
//! Those modules are transparent most of the time: whatever goes in one end
//! comes out the other (**data mode**). To configure them, the host sends a
//! special escape sequence to switch them to **command mode**, where they
//! accept short textual commands and answer each one with a short textual
//! response. The baud rate the module currently listens at is not always
//! known, so getting there may require trying several ones.
//!
//! The crate is organized around a few pieces:
//!
//! * A [`Transport`] is the set of byte level capabilities the engine needs
//!   (write a byte, poll for a byte, sleep, change the local baud rate, log a
//!   line). [`SerialTransport`] implements it over a real serial port and
//!   [`MockTransport`] simulates a device in memory.
//! * A [`PlatformProfile`] describes the AT dialect of a device family: which
//!   baud rates to probe, the exact request and response literals, the
//!   request templates. The RN-42 dialect is built in, others can be loaded
//!   from TOML files.
//! * An [`AtCommander`] runs a session with one device: it enters and leaves
//!   command mode and issues the configuration commands (reboot, change baud
//!   rate, set name, read name and device id), tracking what it learned in a
//!   [`SessionState`].
//!
//! Everything is synchronous. Every wait is an explicit, bounded delay, and
//! no operation fails with an error: each one reports success and explains
//! failures through diagnostics (see [`commander`](crate::commander)).
//!
//! **Example** - Configuring a device over a serial port:
//! ```no_run
//! use atcommander::{AtCommander, PlatformProfile, SerialTransport};
//!
//! let port = serialport::new("/dev/ttyUSB0", 115_200).open().unwrap();
//! let mut transport = SerialTransport::new(port);
//! let profile = PlatformProfile::rn42();
//!
//! let mut commander = AtCommander::new(&mut transport, &profile);
//! if commander.set_baud(115_200) {
//!     commander.set_name("AT-Commander", true);
//!     commander.reboot();
//! }
//! ```

#[macro_use]
mod macros;

pub mod commander;
mod error;
mod profile;
mod settings;
pub mod transport;
mod utils;

pub use commander::{AtCommander, SessionState};
pub use error::{Error, ProfileError, RequestError};
pub use profile::{BaudCode, Exchange, PlatformProfile};
pub use settings::{Settings, SettingsBuilder};
pub use transport::{MockTransport, SerialTransport, Transport, Unsupported};
pub use utils::{open_and_setup_port, select_port};
