//! Scripted transport for unit tests

use crate::error::{BridgeError, Result};
use crate::framer::PROMPT;
use crate::transport::Transport;
use std::collections::VecDeque;

/// Plays back pre-loaded console output and records everything written.
/// Running out of output reads as a timeout.
#[derive(Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    written: Vec<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes
    pub fn push_raw(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Queue one prompt-terminated response made of `lines`
    pub fn push_response(&mut self, lines: &[&str]) {
        self.push_raw(lines.join("\r\n").as_bytes());
        self.push_raw(PROMPT);
    }

    /// Command lines written so far, without their terminators
    pub fn sent_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .split_terminator('\r')
            .map(str::to_string)
            .collect()
    }

    /// Bytes queued but not yet read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.rx.pop_front().ok_or(BridgeError::Timeout)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
