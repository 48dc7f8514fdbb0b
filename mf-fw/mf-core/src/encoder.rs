//! Outbound message encoding

extern crate alloc;

use alloc::string::String;

use crate::command::{CommandCode, SEPARATOR, TERMINATOR};
use crate::error::TransportError;
use crate::transport::SerialWrite;

/// Line ending written after each outbound message. Receivers treat CR/LF as
/// framing noise.
pub const LINE_ENDING: &str = "\r\n";

/// Encode `code` and `args` as `"<code>,<arg1>,...;"`
pub fn encode<S: AsRef<str>>(code: i32, args: &[S]) -> String {
    use core::fmt::Write;

    let mut out = String::new();
    let _ = write!(out, "{code}");
    for arg in args {
        out.push(SEPARATOR);
        out.push_str(arg.as_ref());
    }
    out.push(TERMINATOR);
    out
}

/// Writes encoded messages and raw echo bytes to the outbound transport
///
/// Only the consumer context writes outbound. Each [`send`](Self::send) writes the
/// whole message and flushes before returning, so two messages never interleave.
pub struct ResponseEncoder<'a> {
    out: &'a mut dyn SerialWrite,
}

impl<'a> ResponseEncoder<'a> {
    pub fn new(out: &'a mut dyn SerialWrite) -> Self {
        Self { out }
    }

    /// Encode and send one message, then flush
    pub fn send<S: AsRef<str>>(
        &mut self,
        code: CommandCode,
        args: &[S],
    ) -> Result<(), TransportError> {
        let mut message = encode(code.code(), args);
        log::debug!("-> {message}");
        message.push_str(LINE_ENDING);
        self.out.write_all(message.as_bytes())?;
        self.out.flush()
    }

    /// Raw write path used for echo; flushed by the next [`flush`](Self::flush)
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.out.write_all(bytes)
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.out.flush()
    }
}
