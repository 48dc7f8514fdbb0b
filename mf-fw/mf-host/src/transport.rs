//! std I/O bindings for the core's transport traits

use std::io::{ErrorKind, Read, Write};

use mf_core::{ByteSource, SerialWrite, TransportError};

/// Producer-side source over any blocking reader (stdin, a serial port)
///
/// A timed-out or interrupted read yields `Ok(None)`; end of stream is
/// reported as a lost connection.
pub struct ReadSource<R: Read> {
    reader: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        let mut byte = [0u8; 1];
        match self.reader.read(&mut byte) {
            Ok(0) => Err(TransportError::ConnectionLost),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }
}

/// Consumer-side sink over any writer (stdout, a serial port)
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SerialWrite for WriteSink<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.writer
            .write_all(bytes)
            .map_err(|e| TransportError::WriteFailed(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer
            .flush()
            .map_err(|e| TransportError::WriteFailed(e.to_string()))
    }
}

/// Open a serial port and split it into a reader for the producer thread and
/// a writer for the device loop
#[cfg(feature = "serial")]
pub fn open_serial(
    port_name: &str,
    baud_rate: u32,
) -> anyhow::Result<(
    ReadSource<Box<dyn serialport::SerialPort>>,
    WriteSink<Box<dyn serialport::SerialPort>>,
)> {
    use anyhow::Context;
    use std::time::Duration;

    let port = serialport::new(port_name, baud_rate)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("Failed to open serial port {port_name}"))?;
    let writer = port
        .try_clone()
        .with_context(|| format!("Failed to clone serial port {port_name}"))?;
    log::info!("Opened {port_name} @ {baud_rate} baud");
    Ok((ReadSource::new(port), WriteSink::new(writer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct TimingOut;

    impl Read for TimingOut {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::TimedOut, "timeout"))
        }
    }

    #[test]
    fn test_read_source_until_eof() {
        let mut source = ReadSource::new(Cursor::new(b"9;".to_vec()));
        assert_eq!(source.read_byte(), Ok(Some(b'9')));
        assert_eq!(source.read_byte(), Ok(Some(b';')));
        assert_eq!(source.read_byte(), Err(TransportError::ConnectionLost));
    }

    #[test]
    fn test_timeout_is_not_an_error() {
        let mut source = ReadSource::new(TimingOut);
        assert_eq!(source.read_byte(), Ok(None));
    }

    #[test]
    fn test_write_sink() {
        let mut sink = WriteSink::new(Vec::new());
        sink.write_all(b"10,x;").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"10,x;");
    }
}
