//! Fake collaborators for testing and development
//!
//! In-memory stand-ins for the serial link and the display, so the core can
//! run without hardware.

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::attitude::Attitude;
use crate::error::TransportError;
use crate::transport::{ByteSource, Screen, SerialWrite};

/// Byte source that replays a fixed script
///
/// - `read_byte()` returns queued bytes in order
/// - once drained it returns `Err(ConnectionLost)`, or `Ok(None)` forever if
///   built with [`ScriptedSource::idle_when_drained`]
pub struct ScriptedSource {
    bytes: VecDeque<u8>,
    fail_when_drained: bool,
}

impl ScriptedSource {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
            fail_when_drained: true,
        }
    }

    /// Report timeouts instead of a lost connection once the script is drained
    pub fn idle_when_drained(mut self) -> Self {
        self.fail_when_drained = false;
        self
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        match self.bytes.pop_front() {
            Some(b) => Ok(Some(b)),
            None if self.fail_when_drained => Err(TransportError::ConnectionLost),
            None => Ok(None),
        }
    }
}

/// Serial sink that records everything written
///
/// `flush()` moves the pending bytes into `flushed`, so tests can tell what
/// actually left the device.
#[derive(Default)]
pub struct FakeSerial {
    pending: Vec<u8>,
    pub flushed: Vec<u8>,
    /// When set, every write fails with this error
    pub fail_with: Option<TransportError>,
}

impl FakeSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flushed output as text
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.flushed).to_string()
    }

    /// Take and clear flushed output
    pub fn take_output(&mut self) -> String {
        let out = self.output();
        self.flushed.clear();
        out
    }
}

impl SerialWrite for FakeSerial {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.flushed.append(&mut self.pending);
        Ok(())
    }
}

/// Screen that records messages and the last drawn frame
#[derive(Default)]
pub struct FakeScreen {
    pub messages: Vec<String>,
    pub last_frame: Option<(Attitude, String)>,
    pub frames_presented: usize,
}

impl Screen for FakeScreen {
    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn draw(&mut self, attitude: &Attitude, last_command: &str) {
        self.last_frame = Some((*attitude, last_command.to_string()));
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}
