//! Bounded, retrying reads of device responses.
//!
//! Responses trickle in byte by byte and the transport can only be polled.
//! The reader keeps polling until it has what it was asked for, sleeping a
//! fixed [`RETRY_DELAY_MS`] every time nothing is available. After
//! `max_retries` empty polls it gives up and reports what it got; a short
//! count means the response is incomplete, which the caller treats as a
//! failed exchange. The retry counter is not reset by a received byte, so
//! the worst case wait is always `max_retries * RETRY_DELAY_MS`.

use log::debug;

use crate::transport::Transport;

/// Time slept after each empty poll.
pub const RETRY_DELAY_MS: u32 = 100;

/// Fill `buffer` from the transport. Returns the number of bytes actually
/// read, in `0..=buffer.len()`.
pub fn read<T: Transport + ?Sized>(transport: &mut T, buffer: &mut [u8], max_retries: u32) -> usize {
    read_until(transport, buffer, None, max_retries)
}

/// Like [`read`] but also stops as soon as the bytes read so far end with
/// `terminator`.
pub fn read_line<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
    terminator: &[u8],
    max_retries: u32,
) -> usize {
    read_until(transport, buffer, Some(terminator), max_retries)
}

/// Throw away whatever the transport already has buffered, such as the line
/// ending of an earlier response. Never sleeps. Returns the number of bytes
/// discarded.
pub fn drain<T: Transport + ?Sized>(transport: &mut T) -> usize {
    let mut discarded = 0;
    while let Ok(Some(_)) = transport.read_byte() {
        discarded += 1;
    }
    if discarded > 0 {
        debug!("Discarded {} stale bytes", discarded);
    }
    discarded
}

fn read_until<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
    terminator: Option<&[u8]>,
    max_retries: u32,
) -> usize {
    let mut bytes_read = 0;
    let mut retries = 0;
    while bytes_read < buffer.len() && retries < max_retries {
        match transport.read_byte() {
            Ok(Some(byte)) => {
                buffer[bytes_read] = byte;
                bytes_read += 1;
                if let Some(terminator) = terminator {
                    if !terminator.is_empty() && buffer[..bytes_read].ends_with(terminator) {
                        break;
                    }
                }
            }
            Ok(None) => {
                let _ = transport.delay_ms(RETRY_DELAY_MS);
                retries += 1;
            }
            Err(_) => {
                diag!(transport, "No read function set, can't read a response");
                break;
            }
        }
    }
    bytes_read
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn reads_exactly_the_requested_size() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"CMDextra");
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 3);
        assert_eq!(&buffer, b"CMD");
        assert_eq!(mock.unread(), 5);
        assert!(mock.delays().is_empty());
    }

    #[test]
    fn short_read_after_retries_are_exhausted() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"AO");
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 2);
        assert_eq!(&buffer[..2], b"AO");
        assert_eq!(mock.delays(), &[100, 100, 100]);
    }

    #[test]
    fn zero_retries_never_polls() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"CMD");
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 0), 0);
        assert_eq!(mock.polls(), 0);
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"CMD");
        assert_eq!(read(&mut mock, &mut [], 3), 0);
        assert_eq!(mock.unread(), 3);
    }

    #[test]
    fn missing_reader_returns_zero() {
        let mut mock = MockTransport::new().without_reader();
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 0);
        assert!(mock.delays().is_empty());
        assert_eq!(mock.log_lines().len(), 1);
    }

    #[test]
    fn missing_delay_still_bounded() {
        let mut mock = MockTransport::new().without_delay();
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 0);
        assert_eq!(mock.polls(), 3);
    }

    #[test]
    fn read_line_stops_at_terminator() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"RN42-1234\r\nCMD");
        let mut buffer = [0_u8; 32];
        let n = read_line(&mut mock, &mut buffer, b"\r\n", 3);
        assert_eq!(&buffer[..n], b"RN42-1234\r\n");
        assert_eq!(mock.unread(), 3);
        assert!(mock.delays().is_empty());
    }

    #[test]
    fn read_line_bounded_by_buffer() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"a-very-long-name\r\n");
        let mut buffer = [0_u8; 6];
        assert_eq!(read_line(&mut mock, &mut buffer, b"\r\n", 3), 6);
        assert_eq!(&buffer, b"a-very");
    }

    #[test]
    fn drain_discards_buffered_bytes_without_sleeping() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"\r\n");
        assert_eq!(drain(&mut mock), 2);
        assert_eq!(mock.unread(), 0);
        assert!(mock.delays().is_empty());
        assert!(mock.log_lines().is_empty());
    }

    #[test]
    fn drain_stops_at_the_first_empty_poll() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"x");
        mock.enqueue_gap(1);
        mock.enqueue_read(b"late");
        assert_eq!(drain(&mut mock), 1);
        assert_eq!(mock.unread(), 4);
    }

    #[test]
    fn drain_without_reader_is_quiet() {
        let mut mock = MockTransport::new().without_reader();
        assert_eq!(drain(&mut mock), 0);
        assert!(mock.log_lines().is_empty());
    }

    #[test]
    fn retry_budget_is_shared_across_gaps() {
        let mut mock = MockTransport::new();
        mock.enqueue_gap(2);
        mock.enqueue_read(b"A");
        mock.enqueue_gap(1);
        mock.enqueue_read(b"OK");
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 1);
        assert_eq!(&buffer[..1], b"A");
        assert_eq!(mock.delays(), &[100, 100, 100]);
        assert_eq!(mock.unread(), 2);
    }

    #[test]
    fn gaps_under_the_budget_still_fill_the_buffer() {
        let mut mock = MockTransport::new();
        mock.enqueue_read(b"A");
        mock.enqueue_gap(1);
        mock.enqueue_read(b"O");
        mock.enqueue_gap(1);
        mock.enqueue_read(b"K");
        let mut buffer = [0_u8; 3];
        assert_eq!(read(&mut mock, &mut buffer, 3), 3);
        assert_eq!(&buffer, b"AOK");
        assert_eq!(mock.delays(), &[100, 100]);
    }
}
