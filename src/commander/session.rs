//! Per connection state of a command session.

/// What the host knows about one device connection.
///
/// Only the command mode state machine and the command operations change it.
/// The device baud rate is recorded only once the device confirmed a change;
/// it is never guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    connected: bool,
    host_baud: Option<u32>,
    device_baud: Option<u32>,
}

impl SessionState {
    /// A disconnected session with nothing known about either side.
    pub fn new() -> Self {
        SessionState::default()
    }

    /// A disconnected session whose local port is already configured at
    /// `baud`.
    pub fn with_host_baud(baud: u32) -> Self {
        SessionState {
            host_baud: Some(baud),
            ..SessionState::default()
        }
    }

    /// `true` while the device is known to be in command mode.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Baud rate the local transport is currently configured at, if known.
    pub fn host_baud(&self) -> Option<u32> {
        self.host_baud
    }

    /// Last baud rate the device confirmed, if any.
    pub fn device_baud(&self) -> Option<u32> {
        self.device_baud
    }

    pub(super) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(super) fn set_host_baud(&mut self, baud: u32) {
        self.host_baud = Some(baud);
    }

    pub(super) fn confirm_device_baud(&mut self, baud: u32) {
        self.device_baud = Some(baud);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_and_unknown() {
        let state = SessionState::new();
        assert!(!state.is_connected());
        assert_eq!(state.host_baud(), None);
        assert_eq!(state.device_baud(), None);
    }

    #[test]
    fn host_baud_preset() {
        let state = SessionState::with_host_baud(115_200);
        assert!(!state.is_connected());
        assert_eq!(state.host_baud(), Some(115_200));
        assert_eq!(state.device_baud(), None);
    }
}
