//! Shutdown and fault signalling between the two contexts
//!
//! Each flag has exactly one writer:
//! - `terminate` is set by the consumer and read by the producer
//! - `read_fault` is set by the producer and read by the consumer
//! - `shutdown_requested` may be set by anyone and is read by the consumer

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct Termination {
    terminate: AtomicBool,
    read_fault: AtomicBool,
    shutdown_requested: AtomicBool,
}

impl Termination {
    pub const fn new() -> Self {
        Self {
            terminate: AtomicBool::new(false),
            read_fault: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Ask the consumer loop to stop at the top of its next tick
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Set the termination flag (consumer context only)
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);
    }

    /// Checked by the producer between reads
    pub fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Record that the producer's read failed (producer context only)
    pub fn report_read_fault(&self) {
        self.read_fault.store(true, Ordering::Release);
    }

    pub fn has_read_fault(&self) -> bool {
        self.read_fault.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_clear_and_latch() {
        let termination = Termination::new();
        assert!(!termination.is_terminated());
        assert!(!termination.has_read_fault());
        assert!(!termination.shutdown_requested());

        termination.request_shutdown();
        termination.report_read_fault();
        termination.terminate();
        assert!(termination.shutdown_requested());
        assert!(termination.has_read_fault());
        assert!(termination.is_terminated());
    }
}
