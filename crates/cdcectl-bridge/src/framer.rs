//! Prompt-delimited framing for the bridge console
//!
//! The console has no length headers. A response is everything the bridge
//! prints between the command and the next `"\r\n% "` prompt, so the framer
//! reads byte by byte until the accumulated data ends with the prompt.

use crate::error::{BridgeError, Result};
use crate::transport::Transport;

/// Prompt printed by the bridge when it is ready for the next command
pub const PROMPT: &[u8] = b"\r\n% ";

/// Terminator appended to every command line
pub const LINE_END: u8 = b'\r';

/// Separator between response lines
pub const LINE_SEP: &str = "\r\n";

/// Largest response accepted before giving up on the prompt
pub const MAX_RESPONSE_LEN: usize = 4096;

/// Line framer over a byte transport
pub struct Framer<T: Transport> {
    transport: T,
}

impl<T: Transport> Framer<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Send command lines in order, each followed by [`LINE_END`]
    pub fn send<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        for line in lines {
            let line = line.as_ref();
            let mut encoded = Vec::with_capacity(line.len() + 1);
            encoded.extend_from_slice(line.as_bytes());
            encoded.push(LINE_END);
            self.transport.write(&encoded)?;
        }
        self.transport.flush()
    }

    /// Read until the prompt and return the lines before it
    ///
    /// The prompt itself is not part of the result. A response with nothing
    /// before the prompt yields no lines at all. A timeout discards whatever
    /// was accumulated.
    pub fn receive(&mut self) -> Result<Vec<String>> {
        let mut buf: heapless::Vec<u8, MAX_RESPONSE_LEN> = heapless::Vec::new();

        loop {
            let c = self.transport.read_byte()?;
            buf.push(c)
                .map_err(|_| BridgeError::ResponseTooLong(MAX_RESPONSE_LEN))?;
            if buf.ends_with(PROMPT) {
                break;
            }
        }

        split_response(&buf[..buf.len() - PROMPT.len()])
    }

    /// Borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}

fn split_response(body: &[u8]) -> Result<Vec<String>> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    if !body.is_ascii() {
        return Err(BridgeError::InvalidEncoding);
    }
    let text = std::str::from_utf8(body).map_err(|_| BridgeError::InvalidEncoding)?;
    Ok(text.split(LINE_SEP).map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_send_appends_carriage_return() {
        let mut framer = Framer::new(MockTransport::new());
        framer.send(&["port c outclr 0x04", "twic dis"]).unwrap();
        assert_eq!(
            framer.into_inner().sent_lines(),
            ["port c outclr 0x04", "twic dis"]
        );
    }

    #[test]
    fn test_receive_splits_lines() {
        let mut mock = MockTransport::new();
        mock.push_raw(b"twic tx 0xca T 0x80 R 1\r\nOK\r\n0x01\r\n% ");
        let mut framer = Framer::new(mock);
        assert_eq!(
            framer.receive().unwrap(),
            ["twic tx 0xca T 0x80 R 1", "OK", "0x01"]
        );
    }

    #[test]
    fn test_receive_stops_at_first_prompt() {
        let mut mock = MockTransport::new();
        mock.push_response(&["first"]);
        mock.push_response(&["second", "x"]);
        let mut framer = Framer::new(mock);
        assert_eq!(framer.receive().unwrap(), ["first"]);
        assert_eq!(framer.receive().unwrap(), ["second", "x"]);
        assert_eq!(framer.transport_mut().pending(), 0);
    }

    #[test]
    fn test_percent_inside_line_is_not_a_prompt() {
        let mut mock = MockTransport::new();
        mock.push_raw(b"cmd\r\n50% done\r\n% ");
        let mut framer = Framer::new(mock);
        assert_eq!(framer.receive().unwrap(), ["cmd", "50% done"]);
    }

    #[test]
    fn test_empty_response() {
        let mut mock = MockTransport::new();
        mock.push_raw(PROMPT);
        let mut framer = Framer::new(mock);
        assert!(framer.receive().unwrap().is_empty());
    }

    #[test]
    fn test_timeout_before_prompt() {
        let mut mock = MockTransport::new();
        mock.push_raw(b"cmd\r\n0x2a\r\n");
        let mut framer = Framer::new(mock);
        assert!(matches!(framer.receive(), Err(BridgeError::Timeout)));
    }

    #[test]
    fn test_response_too_long() {
        let mut mock = MockTransport::new();
        mock.push_raw(&[b'x'; MAX_RESPONSE_LEN + 1]);
        mock.push_raw(PROMPT);
        let mut framer = Framer::new(mock);
        assert!(matches!(
            framer.receive(),
            Err(BridgeError::ResponseTooLong(MAX_RESPONSE_LEN))
        ));
    }

    #[test]
    fn test_non_ascii_response() {
        let mut mock = MockTransport::new();
        mock.push_raw(b"cmd\r\n\xff\r\n% ");
        let mut framer = Framer::new(mock);
        assert!(matches!(framer.receive(), Err(BridgeError::InvalidEncoding)));
    }
}
