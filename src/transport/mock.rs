//! An in-memory [`Transport`] that plays the part of a device.
//!
//! The mock keeps a receive queue the engine reads from, and a list of
//! scripted replies: whenever the bytes written since the last reply end with
//! a reply's request, the reply's response is queued for reading. A reply can
//! be restricted to a host baud rate, which is how a device configured at one
//! specific speed is simulated.
//!
//! Delays are recorded and never actually slept, so timing can be asserted on
//! without slowing the tests down.
//!
//! ```
//! use atcommander::{AtCommander, MockTransport, PlatformProfile};
//!
//! let profile = PlatformProfile::rn42();
//! let mut device = MockTransport::new().reply_at(115_200, b"$$$", b"CMD");
//!
//! let mut commander = AtCommander::new(&mut device, &profile);
//! assert!(commander.enter_command_mode());
//! assert_eq!(commander.state().host_baud(), Some(115_200));
//! ```

use std::collections::VecDeque;

use super::{Transport, Unsupported};

#[derive(Debug, Clone)]
struct Reply {
    request: Vec<u8>,
    response: Vec<u8>,
    baud: Option<u32>,
}

/// Scriptable transport recording everything the engine does with it.
#[derive(Debug, Clone)]
pub struct MockTransport {
    rx: VecDeque<Option<u8>>,
    written: Vec<u8>,
    pending: Vec<u8>,
    replies: Vec<Reply>,
    baud: Option<u32>,
    reinitialized: Vec<u32>,
    delays: Vec<u32>,
    log: Vec<String>,
    polls: usize,

    can_write: bool,
    can_read: bool,
    can_delay: bool,
    can_reinitialize: bool,
    can_log: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// A mock with every capability available and nothing scripted.
    pub fn new() -> Self {
        MockTransport {
            rx: VecDeque::new(),
            written: Vec::new(),
            pending: Vec::new(),
            replies: Vec::new(),
            baud: None,
            reinitialized: Vec::new(),
            delays: Vec::new(),
            log: Vec::new(),
            polls: 0,
            can_write: true,
            can_read: true,
            can_delay: true,
            can_reinitialize: true,
            can_log: true,
        }
    }

    /// Answer `request` with `response` at any baud rate.
    pub fn reply(mut self, request: &[u8], response: &[u8]) -> Self {
        self.replies.push(Reply {
            request: request.to_vec(),
            response: response.to_vec(),
            baud: None,
        });
        self
    }

    /// Answer `request` with `response` only while the host side is
    /// configured at `baud`.
    pub fn reply_at(mut self, baud: u32, request: &[u8], response: &[u8]) -> Self {
        self.replies.push(Reply {
            request: request.to_vec(),
            response: response.to_vec(),
            baud: Some(baud),
        });
        self
    }

    /// Pretend the local side is already configured at `baud`.
    pub fn at_baud(mut self, baud: u32) -> Self {
        self.baud = Some(baud);
        self
    }

    pub fn without_writer(mut self) -> Self {
        self.can_write = false;
        self
    }

    pub fn without_reader(mut self) -> Self {
        self.can_read = false;
        self
    }

    pub fn without_delay(mut self) -> Self {
        self.can_delay = false;
        self
    }

    pub fn without_reinitializer(mut self) -> Self {
        self.can_reinitialize = false;
        self
    }

    pub fn without_log(mut self) -> Self {
        self.can_log = false;
        self
    }

    /// Queue unsolicited bytes for the engine to read.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().copied().map(Some));
    }

    /// Queue `polls` empty polls, delaying whatever is queued after them.
    pub fn enqueue_gap(&mut self, polls: usize) {
        self.rx.extend(std::iter::repeat(None).take(polls));
    }

    /// Everything written so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Every baud rate passed to `reinitialize_baud`, in order.
    pub fn reinitialized_bauds(&self) -> &[u32] {
        &self.reinitialized
    }

    /// Every delay requested, in order.
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Sum of all delays requested, in milliseconds.
    pub fn total_delay_ms(&self) -> u64 {
        self.delays.iter().map(|&ms| u64::from(ms)).sum()
    }

    /// Lines received through `log_line`.
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Number of `read_byte` calls, successful or not.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Bytes still waiting to be read.
    pub fn unread(&self) -> usize {
        self.rx.iter().filter(|slot| slot.is_some()).count()
    }

    /// Forget the recorded traffic, keeping the script and the queue.
    pub fn clear_history(&mut self) {
        self.written.clear();
        self.pending.clear();
        self.reinitialized.clear();
        self.delays.clear();
        self.log.clear();
        self.polls = 0;
    }

    fn answer_pending(&mut self) {
        let baud = self.baud;
        let pending = &self.pending;
        let matched = self.replies.iter().find(|reply| {
            !reply.request.is_empty()
                && pending.ends_with(&reply.request)
                && reply.baud.map_or(true, |b| Some(b) == baud)
        });
        if let Some(reply) = matched {
            let response = reply.response.clone();
            self.rx.extend(response.into_iter().map(Some));
            self.pending.clear();
            return;
        }

        // Only the tail can still complete a request.
        let longest = self.replies.iter().map(|r| r.request.len()).max().unwrap_or(0);
        if self.pending.len() > longest {
            let excess = self.pending.len() - longest;
            self.pending.drain(..excess);
        }
    }
}

impl Transport for MockTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), Unsupported> {
        if !self.can_write {
            return Err(Unsupported);
        }
        self.written.push(byte);
        self.pending.push(byte);
        self.answer_pending();
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Unsupported> {
        if !self.can_read {
            return Err(Unsupported);
        }
        self.polls += 1;
        Ok(self.rx.pop_front().flatten())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Unsupported> {
        if !self.can_delay {
            return Err(Unsupported);
        }
        self.delays.push(ms);
        Ok(())
    }

    fn reinitialize_baud(&mut self, baud: u32) -> Result<(), Unsupported> {
        if !self.can_reinitialize {
            return Err(Unsupported);
        }
        self.reinitialized.push(baud);
        self.baud = Some(baud);
        Ok(())
    }

    fn log_line(&mut self, line: &str) -> Result<(), Unsupported> {
        if !self.can_log {
            return Err(Unsupported);
        }
        self.log.push(line.to_owned());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_to_a_completed_request() {
        let mut mock = MockTransport::new().reply(b"GN\r", b"RN42\r\n");
        for &b in b"GN" {
            mock.write_byte(b).unwrap();
        }
        assert_eq!(mock.unread(), 0);
        mock.write_byte(b'\r').unwrap();
        assert_eq!(mock.unread(), 6);
        assert_eq!(mock.read_byte(), Ok(Some(b'R')));
    }

    #[test]
    fn baud_restricted_reply_only_at_that_baud() {
        let mut mock = MockTransport::new().reply_at(9600, b"$$$", b"CMD");
        for &b in b"$$$" {
            mock.write_byte(b).unwrap();
        }
        assert_eq!(mock.unread(), 0);

        mock.reinitialize_baud(9600).unwrap();
        for &b in b"$$$" {
            mock.write_byte(b).unwrap();
        }
        assert_eq!(mock.unread(), 3);
    }

    #[test]
    fn disabled_capabilities_report_unsupported() {
        let mut mock = MockTransport::new()
            .without_writer()
            .without_reader()
            .without_delay()
            .without_reinitializer()
            .without_log();
        assert_eq!(mock.write_byte(0), Err(Unsupported));
        assert_eq!(mock.read_byte(), Err(Unsupported));
        assert_eq!(mock.delay_ms(1), Err(Unsupported));
        assert_eq!(mock.reinitialize_baud(9600), Err(Unsupported));
        assert_eq!(mock.log_line("x"), Err(Unsupported));
        assert!(mock.written().is_empty());
        assert_eq!(mock.polls(), 0);
    }

    #[test]
    fn delays_are_recorded_not_slept() {
        let mut mock = MockTransport::new();
        mock.delay_ms(100).unwrap();
        mock.delay_ms(250).unwrap();
        assert_eq!(mock.delays(), &[100, 250]);
        assert_eq!(mock.total_delay_ms(), 350);
    }

    #[test]
    fn gaps_are_empty_polls() {
        let mut mock = MockTransport::new();
        mock.enqueue_gap(2);
        mock.enqueue_read(b"A");
        assert_eq!(mock.unread(), 1);
        assert_eq!(mock.read_byte(), Ok(None));
        assert_eq!(mock.read_byte(), Ok(None));
        assert_eq!(mock.read_byte(), Ok(Some(b'A')));
        assert_eq!(mock.read_byte(), Ok(None));
        assert_eq!(mock.polls(), 4);
    }

    #[test]
    fn unanswered_writes_keep_only_a_request_sized_tail() {
        let mut mock = MockTransport::new().reply(b"GN\r", b"RN42\r\n");
        for &b in b"streaming data nobody answers" {
            mock.write_byte(b).unwrap();
        }
        assert_eq!(mock.pending.len(), 3);
        assert_eq!(mock.written().len(), 29);

        for &b in b"GN\r" {
            mock.write_byte(b).unwrap();
        }
        assert!(mock.pending.is_empty());
        assert_eq!(mock.unread(), 6);
    }

    #[test]
    fn unscripted_mock_keeps_no_pending_bytes() {
        let mut mock = MockTransport::new();
        for &b in b"$$$" {
            mock.write_byte(b).unwrap();
        }
        assert!(mock.pending.is_empty());
    }
}
