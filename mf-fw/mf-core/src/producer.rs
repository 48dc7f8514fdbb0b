//! Producer context loop
//!
//! Binds the transport's blocking read to the ring buffer. Runs on its own
//! thread/core until the termination flag is set or the read fails.

use crate::error::TransportError;
use crate::ring_buffer::Producer;
use crate::termination::Termination;
use crate::transport::ByteSource;

/// Read bytes from `source` into `producer` until told to stop.
///
/// The termination flag is checked between reads, so a read already blocked
/// delays shutdown by at most one read latency. Bytes that do not fit are
/// dropped and counted by the ring buffer; buffered data is never touched.
///
/// # Returns
///
/// * `Ok(())` when the termination flag was observed
/// * `Err(TransportError)` when the read failed; the fault is also recorded in
///   `termination` for the consumer to pick up
pub fn run_producer<S: ByteSource + ?Sized>(
    source: &mut S,
    producer: &mut Producer,
    termination: &Termination,
) -> Result<(), TransportError> {
    log::info!(
        "Serial reader started ({} byte buffer)",
        producer.capacity()
    );
    let mut overflowing = false;

    while !termination.is_terminated() {
        match source.read_byte() {
            Ok(Some(byte)) => match producer.push(byte) {
                Ok(()) => overflowing = false,
                Err(_) if !overflowing => {
                    log::warn!("Input buffer full, dropping bytes");
                    overflowing = true;
                }
                Err(_) => log::trace!("Dropped {byte:#04x}"),
            },
            Ok(None) => {}
            Err(err) => {
                log::error!("Serial read failed: {err}");
                termination.report_read_fault();
                return Err(err);
            }
        }
    }

    log::info!("Serial reader stopped");
    Ok(())
}
