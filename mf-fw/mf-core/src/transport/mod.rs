//! Collaborator traits at the edges of the core
//!
//! The core treats the serial link as an opaque byte source (producer side)
//! and byte sink (consumer side), and talks to the display through [`Screen`].

pub mod fake;

pub use fake::{FakeScreen, FakeSerial, ScriptedSource};

use crate::attitude::Attitude;
use crate::error::TransportError;

/// Producer-side byte source bound to the transport's blocking read
pub trait ByteSource {
    /// Block until one byte is available.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(byte))` when a byte was read
    /// * `Ok(None)` when the read timed out without data
    /// * `Err(TransportError)` when the link failed
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError>;
}

/// Consumer-side byte sink
pub trait SerialWrite {
    /// Write every byte of `bytes`
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Push any buffered bytes out to the link
    fn flush(&mut self) -> Result<(), TransportError>;
}

/// Display collaborator
pub trait Screen {
    /// Replace the screen contents with a diagnostic or status message
    fn show_message(&mut self, text: &str);

    /// Draw one frame of the instrument and the last received command
    fn draw(&mut self, attitude: &Attitude, last_command: &str);

    /// Flush the frame to the panel
    fn present(&mut self);
}

impl<T: SerialWrite + ?Sized> SerialWrite for &mut T {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}
