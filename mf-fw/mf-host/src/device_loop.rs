//! Device loop for the host
//!
//! Spawns the serial reader (producer context) on its own thread and runs the
//! device main loop (consumer context) on the calling thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mf_core::handlers::register_defaults;
use mf_core::{
    ButtonMonitor, ByteSource, CommandRegistry, Device, DeviceConfig, ProtocolError,
    ProtocolStats, RingBuffer, Screen, SerialWrite, Termination, VariableStore, run_producer,
};

/// How long to wait for the reader thread after the loop exits. A reader still
/// blocked in a read after this is left behind.
const READER_GRACE: Duration = Duration::from_millis(250);

/// Everything left after the loop exits
pub struct LoopReport<W, S> {
    pub result: Result<(), ProtocolError>,
    pub stats: ProtocolStats,
    pub overflows: usize,
    pub vars: VariableStore,
    pub serial: W,
    pub screen: S,
}

/// Run the device until shutdown or transport failure
///
/// # Arguments
///
/// * `source` - Blocking byte source, moved to the reader thread
/// * `sink` - Outbound serial writer
/// * `buttons` - Buttons polled every tick
/// * `tick_interval` - Sleep between ticks
pub fn run_device_loop<R, W, S>(
    config: &DeviceConfig,
    mut source: R,
    sink: W,
    screen: S,
    buttons: Vec<ButtonMonitor>,
    termination: Arc<Termination>,
    tick_interval: Duration,
) -> LoopReport<W, S>
where
    R: ByteSource + Send + 'static,
    W: SerialWrite,
    S: Screen,
{
    let (mut producer, consumer) = RingBuffer::with_capacity(config.buffer_capacity);

    let reader_termination = termination.clone();
    let reader = thread::Builder::new()
        .name("serial-reader".into())
        .spawn(move || run_producer(&mut source, &mut producer, &reader_termination));

    let mut registry = CommandRegistry::new();
    register_defaults(&mut registry, config);
    let mut device = Device::new(
        config,
        consumer,
        registry,
        sink,
        screen,
        termination.clone(),
    );
    for button in buttons {
        device = device.with_button(button);
    }

    let result = match &reader {
        Ok(_) => device.run(|| {
            if !tick_interval.is_zero() {
                thread::sleep(tick_interval);
            }
        }),
        Err(e) => {
            log::error!("Failed to spawn serial reader: {e}");
            termination.terminate();
            Err(ProtocolError::TransportFailure(
                mf_core::TransportError::ReadFailed(e.to_string()),
            ))
        }
    };

    if let Ok(handle) = reader {
        let deadline = Instant::now() + READER_GRACE;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if handle.is_finished() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::debug!("Serial reader exited: {e}"),
                Err(_) => log::error!("Serial reader panicked"),
            }
        } else {
            log::debug!("Serial reader still blocked in read, leaving it");
        }
    }

    let stats = device.stats();
    let overflows = device.overflow_count();
    let vars = device.vars().clone();
    let (serial, screen) = device.into_io();
    LoopReport {
        result,
        stats,
        overflows,
        vars,
        serial,
        screen,
    }
}
