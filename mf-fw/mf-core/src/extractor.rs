//! Non-blocking reads from the consumer end of the ring buffer
//!
//! Two consumption modes: one byte at a time, or one LF-terminated line at a
//! time with CR stripping.

extern crate alloc;

use alloc::string::String;

use crate::encoder::ResponseEncoder;
use crate::error::TransportError;
use crate::ring_buffer::{Consumer, LINE_FEED};

const CARRIAGE_RETURN: u8 = b'\r';

pub struct Extractor {
    consumer: Consumer,
    echo: bool,
}

impl Extractor {
    /// Wrap the consumer end; `echo` writes each byte taken by
    /// [`next_byte`](Self::next_byte) back out
    pub fn new(consumer: Consumer, echo: bool) -> Self {
        Self { consumer, echo }
    }

    /// Take one byte if available
    ///
    /// # Returns
    ///
    /// * `Ok(Some(byte))` if a byte was buffered
    /// * `Ok(None)` if the buffer is empty
    /// * `Err(TransportError)` if echoing the byte failed
    pub fn next_byte(
        &mut self,
        out: &mut ResponseEncoder<'_>,
    ) -> Result<Option<u8>, TransportError> {
        let Some(byte) = self.consumer.try_pop() else {
            return Ok(None);
        };
        if self.echo {
            out.write_raw(&[byte])?;
        }
        Ok(Some(byte))
    }

    /// Take one complete line if available
    ///
    /// Nothing is consumed unless a line feed is already buffered, so a
    /// partial line stays put. Every CR inside the line is dropped and the LF
    /// is not included. `Some("")` means an empty line, not "no line".
    ///
    /// A full buffer with no line feed in it can never complete a line, so
    /// its whole contents are returned as one line instead.
    pub fn next_line(&mut self) -> Option<String> {
        let (end, terminated) = match self.consumer.peek_line_end() {
            Some(end) => (end, true),
            None if self.consumer.len() >= self.consumer.capacity() => {
                log::warn!("Input buffer full without a line feed, taking it as one line");
                (self.consumer.len(), false)
            }
            None => return None,
        };

        let mut line = String::with_capacity(end);
        for _ in 0..end {
            match self.consumer.try_pop() {
                Some(CARRIAGE_RETURN) => {}
                Some(byte) => line.push(char::from(byte)),
                None => break,
            }
        }
        if terminated {
            let terminator = self.consumer.try_pop();
            debug_assert_eq!(terminator, Some(LINE_FEED));
        }
        Some(line)
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Exposes buffer fill and overflow counters
    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }
}
