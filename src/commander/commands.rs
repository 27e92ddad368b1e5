//! Configuration commands, all issued from command mode.
//!
//! Each command first makes sure the device is in command mode, entering it
//! if needed, and gives up without touching the session when that fails.
//! Arguments are checked against the profile before anything is sent.

use super::{reader, AtCommander, MAX_RETRIES, SETTLE_DELAY_MS};
use crate::transport::Transport;

impl<'a, T: Transport + ?Sized> AtCommander<'a, T> {
    /// Restart the device. Fire and forget: the device does not answer
    /// before it goes away.
    pub fn reboot(&mut self) {
        if !self.enter_command_mode() {
            diag!(self.transport, "Unable to enter command mode, can't reboot");
            return;
        }
        let profile = self.profile;
        if self.write(profile.reboot.as_bytes()) {
            diag!(self.transport, "Rebooting the device");
        }
    }

    /// Change the baud rate the device communicates at. On success the new
    /// rate is recorded as the device baud rate; the local side is not
    /// changed.
    pub fn set_baud(&mut self, baud: u32) -> bool {
        let profile = self.profile;
        let request = match profile.set_baud_request(baud) {
            Ok(request) => request,
            Err(e) => {
                diag!(self.transport, "Can't set baud rate: {}", e);
                return false;
            }
        };
        if !self.enter_command_mode() {
            diag!(
                self.transport,
                "Unable to enter command mode, can't set baud rate"
            );
            return false;
        }

        if self.exchange(request.as_bytes(), profile.set_baud.response.as_bytes()) {
            diag!(self.transport, "Changed device baud rate to {}", baud);
            self.state.confirm_device_baud(baud);
            true
        } else {
            diag!(self.transport, "Unable to change device baud rate");
            false
        }
    }

    /// Rename the device. `persist` selects the profile's persistent naming
    /// request instead of the plain one.
    pub fn set_name(&mut self, name: &str, persist: bool) -> bool {
        let profile = self.profile;
        let request = match profile.set_name_request(name, persist) {
            Ok(request) => request,
            Err(e) => {
                diag!(self.transport, "Can't set name: {}", e);
                return false;
            }
        };
        if !self.enter_command_mode() {
            diag!(self.transport, "Unable to enter command mode, can't set name");
            return false;
        }

        let expected = profile.name_exchange(persist).response.as_bytes();
        if self.exchange(request.as_bytes(), expected) {
            diag!(self.transport, "Changed device name to {}", name);
            true
        } else {
            diag!(self.transport, "Unable to change device name");
            false
        }
    }

    /// Read the device name into `name`. Returns its length, 0 on failure.
    pub fn get_name(&mut self, name: &mut [u8]) -> usize {
        let profile = self.profile;
        self.query("name", profile.get_name.as_bytes(), name)
    }

    /// Read the device identity (its address) into `id`. Returns its
    /// length, 0 on failure.
    pub fn get_device_id(&mut self, id: &mut [u8]) -> usize {
        let profile = self.profile;
        self.query("device ID", profile.get_device_id.as_bytes(), id)
    }

    /// Send a query and extract its variable length answer.
    ///
    /// The answer is the payload followed by the profile's terminator. At
    /// most `out.len()` payload bytes plus the terminator are read. An answer
    /// without terminator, because it was cut short or did not fit, and an
    /// empty answer are both failures.
    fn query(&mut self, what: &str, request: &[u8], out: &mut [u8]) -> usize {
        if out.is_empty() {
            diag!(self.transport, "No room to store the {}", what);
            return 0;
        }
        if !self.enter_command_mode() {
            diag!(
                self.transport,
                "Unable to enter command mode, can't get {}",
                what
            );
            return 0;
        }
        reader::drain(&mut *self.transport);
        if !self.write(request) {
            return 0;
        }
        self.delay(SETTLE_DELAY_MS);

        let profile = self.profile;
        let terminator = profile.query_terminator.as_bytes();
        let mut response = vec![0_u8; out.len() + terminator.len()];
        let bytes_read = reader::read_line(
            &mut *self.transport,
            &mut response,
            terminator,
            MAX_RETRIES,
        );
        let response = &response[..bytes_read];

        if !response.ends_with(terminator) {
            diag!(
                self.transport,
                "Incomplete {} response: {:?}",
                what,
                String::from_utf8_lossy(response)
            );
            return 0;
        }
        let payload = &response[..response.len() - terminator.len()];
        if payload.is_empty() {
            diag!(self.transport, "Device returned an empty {}", what);
            return 0;
        }

        out[..payload.len()].copy_from_slice(payload);
        diag!(
            self.transport,
            "Device {} is {}",
            what,
            String::from_utf8_lossy(payload)
        );
        payload.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
