//! Entering and leaving command mode.

use log::info;

use super::AtCommander;
use crate::transport::Transport;

impl<'a, T: Transport + ?Sized> AtCommander<'a, T> {
    /// Put the device in command mode.
    ///
    /// Does nothing when already there. Otherwise, each candidate baud rate
    /// of the profile is tried in order: the local side is reinitialized at
    /// that rate, the enter request is sent, and the first rate getting the
    /// expected answer wins. The device itself is never reconfigured here.
    ///
    /// Returns whether the device is in command mode.
    pub fn enter_command_mode(&mut self) -> bool {
        if self.state.is_connected() {
            diag!(self.transport, "Already in command mode");
            return true;
        }

        let profile = self.profile;
        let request = profile.enter_command_mode.request.as_bytes();
        let expected = profile.enter_command_mode.response.as_bytes();
        for &baud in &profile.baud_rates {
            self.initialize_baud(baud);
            diag!(self.transport, "Attempting to enter command mode");
            if self.exchange(request, expected) {
                self.state.set_connected(true);
                break;
            }
        }

        if self.state.is_connected() {
            match self.state.host_baud() {
                Some(baud) => diag!(
                    self.transport,
                    "Initialized UART and entered command mode at baud {}",
                    baud
                ),
                None => diag!(self.transport, "Entered command mode"),
            }
            info!("=> Command mode ({})", profile.name);
        } else {
            diag!(self.transport, "Unable to enter command mode at any baud rate");
        }
        self.state.is_connected()
    }

    /// Bring the device back to data mode.
    ///
    /// Does nothing, successfully, when not in command mode. The session
    /// only counts as disconnected once the device confirmed; on any other
    /// answer it may well still be in command mode and stays connected.
    pub fn exit_command_mode(&mut self) -> bool {
        if !self.state.is_connected() {
            diag!(self.transport, "Not in command mode");
            return true;
        }

        let profile = self.profile;
        if self.exchange(
            profile.exit_command_mode.request.as_bytes(),
            profile.exit_command_mode.response.as_bytes(),
        ) {
            self.state.set_connected(false);
            diag!(self.transport, "Switched back to data mode");
            info!("=> Data mode ({})", profile.name);
            true
        } else {
            diag!(self.transport, "Unable to exit command mode");
            false
        }
    }

    /// Switch the local side of the link to `baud`. Only the host transport
    /// changes; the device is left alone.
    fn initialize_baud(&mut self, baud: u32) -> bool {
        match self.transport.reinitialize_baud(baud) {
            Ok(()) => {
                diag!(self.transport, "Initializing at baud {}", baud);
                self.state.set_host_baud(baud);
                true
            }
            Err(_) => {
                diag!(
                    self.transport,
                    "No baud rate initializer set, can't change baud - trying anyway"
                );
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{AtCommander, MockTransport, PlatformProfile};

    fn profile(bauds: &[u32]) -> PlatformProfile {
        let mut profile = PlatformProfile::rn42();
        profile.baud_rates = bauds.to_vec();
        profile
    }

    #[test]
    fn enter_at_first_candidate() {
        let profile = profile(&[9600, 115_200]);
        let mut mock = MockTransport::new().reply(b"$$$", b"CMD");
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(commander.enter_command_mode());
        assert!(commander.is_connected());
        assert_eq!(commander.state().host_baud(), Some(9600));
        assert_eq!(commander.transport().reinitialized_bauds(), &[9600]);
        assert_eq!(commander.transport().written(), b"$$$");
    }

    #[test]
    fn enter_without_reinitializer_keeps_trying() {
        let profile = profile(&[9600, 115_200]);
        let mut mock = MockTransport::new()
            .without_reinitializer()
            .reply(b"$$$", b"CMD");
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(commander.enter_command_mode());
        assert_eq!(commander.state().host_baud(), None);
        assert!(commander
            .transport()
            .log_lines()
            .iter()
            .any(|l| l.starts_with("No baud rate initializer set")));
    }

    #[test]
    fn enter_without_writer_fails_everywhere() {
        let profile = profile(&[9600, 115_200]);
        let mut mock = MockTransport::new().without_writer();
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(!commander.enter_command_mode());
        assert!(!commander.is_connected());
        // No request went out, so nothing was waited for either.
        assert!(commander.transport().delays().is_empty());
        assert_eq!(commander.transport().reinitialized_bauds(), &[9600, 115_200]);
    }

    #[test]
    fn exit_confirmed() {
        let profile = profile(&[9600]);
        let mut mock = MockTransport::new()
            .reply(b"$$$", b"CMD")
            .reply(b"---\r", b"END");
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(commander.enter_command_mode());
        assert!(commander.exit_command_mode());
        assert!(!commander.is_connected());
        assert_eq!(commander.transport().written(), b"$$$---\r");
    }

    #[test]
    fn exit_unconfirmed_stays_connected() {
        let profile = profile(&[9600]);
        let mut mock = MockTransport::new()
            .reply(b"$$$", b"CMD")
            .reply(b"---\r", b"ERR");
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(commander.enter_command_mode());
        assert!(!commander.exit_command_mode());
        assert!(commander.is_connected());
    }

    #[test]
    fn reenter_after_exit_probes_again() {
        let profile = profile(&[9600]);
        let mut mock = MockTransport::new()
            .reply(b"$$$", b"CMD")
            .reply(b"---\r", b"END");
        let mut commander = AtCommander::new(&mut mock, &profile);

        assert!(commander.enter_command_mode());
        assert!(commander.exit_command_mode());
        assert!(commander.enter_command_mode());
        assert_eq!(commander.transport().written(), b"$$$---\r$$$");
    }
}
