//! Device integration tests
//!
//! In-process stand-ins for a serial link: the host side writes bytes into a
//! channel that the device's reader thread drains, and device output lands in
//! a buffer the host side can watch while the loop is running.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use mf_core::{ByteSource, SerialWrite, TransportError};

/// How long a reader waits for a byte before re-checking the termination flag
pub const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Host end of an in-process serial link
pub struct HostLink {
    tx: Sender<u8>,
    output: SharedSerial,
}

impl HostLink {
    /// Send `text` to the device
    pub fn send(&self, text: &str) {
        for byte in text.bytes() {
            if self.tx.send(byte).is_err() {
                log::warn!("Device reader gone, dropped {text:?}");
                return;
            }
        }
    }

    /// Everything the device has written so far
    pub fn output(&self) -> String {
        self.output.contents()
    }

    /// Wait until the device output contains `needle`
    pub fn wait_for(&self, needle: &str, timeout: Duration) -> bool {
        wait_until(timeout, || self.output().contains(needle))
    }

    /// Unplug the cable
    pub fn disconnect(self) {
        drop(self.tx);
    }
}

/// Build a connected link: the host end, the device's byte source and the
/// device's serial writer
pub fn serial_link() -> (HostLink, ChannelSource, SharedSerial) {
    let (tx, rx) = mpsc::channel();
    let output = SharedSerial::default();
    (
        HostLink {
            tx,
            output: output.clone(),
        },
        ChannelSource { rx },
        output,
    )
}

/// Device-side byte source fed by a [`HostLink`]
pub struct ChannelSource {
    rx: Receiver<u8>,
}

impl ByteSource for ChannelSource {
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        match self.rx.recv_timeout(READ_TIMEOUT) {
            Ok(byte) => Ok(Some(byte)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::ConnectionLost),
        }
    }
}

/// Device-side serial writer whose output can be read from another thread
#[derive(Clone, Default)]
pub struct SharedSerial {
    written: Arc<Mutex<Vec<u8>>>,
}

impl SharedSerial {
    pub fn contents(&self) -> String {
        match self.written.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl SerialWrite for SharedSerial {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.written
            .lock()
            .map_err(|_| TransportError::WriteFailed("output buffer poisoned".to_string()))?
            .extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
