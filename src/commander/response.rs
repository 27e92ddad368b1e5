//! Validation of fixed responses.

use hexplay::HexViewBuilder;
use log::{debug, log_enabled, Level::Debug};

use crate::transport::Transport;

/// Compare a received response with the expected literal. Returns `true` only
/// when both length and content match.
///
/// A mismatch is reported through the diagnostics: the length difference if
/// any, then the received bytes if there were some.
pub fn check<T: Transport + ?Sized>(transport: &mut T, response: &[u8], expected: &[u8]) -> bool {
    if response == expected {
        return true;
    }

    if response.len() != expected.len() {
        diag!(
            transport,
            "Expected {} bytes in response but received {}",
            expected.len(),
            response.len()
        );
    }

    if !response.is_empty() {
        diag!(
            transport,
            "Invalid response: {:?}",
            String::from_utf8_lossy(response)
        );
        if log_enabled!(Debug) {
            let view = HexViewBuilder::new(response)
                .address_offset(0)
                .row_width(16)
                .finish();
            debug!("\n{}", view);
        }
    }
    false
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn exact_match() {
        let mut mock = MockTransport::new();
        assert!(check(&mut mock, b"AOK", b"AOK"));
        assert!(mock.log_lines().is_empty());
    }

    #[test]
    fn empty_matches_empty() {
        let mut mock = MockTransport::new();
        assert!(check(&mut mock, b"", b""));
    }

    #[test]
    fn length_mismatch_reports_both_lines() {
        let mut mock = MockTransport::new();
        assert!(!check(&mut mock, b"AO", b"AOK"));
        assert_eq!(
            mock.log_lines(),
            &[
                "Expected 3 bytes in response but received 2".to_string(),
                "Invalid response: \"AO\"".to_string(),
            ]
        );
    }

    #[test]
    fn nothing_received_reports_length_only() {
        let mut mock = MockTransport::new();
        assert!(!check(&mut mock, b"", b"CMD"));
        assert_eq!(mock.log_lines().len(), 1);
    }

    #[test]
    fn content_mismatch_reports_received_bytes() {
        let mut mock = MockTransport::new();
        assert!(!check(&mut mock, b"ERR", b"AOK"));
        assert_eq!(mock.log_lines(), &["Invalid response: \"ERR\"".to_string()]);
    }
}
