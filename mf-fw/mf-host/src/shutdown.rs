//! Ctrl-C handling
//!
//! An interrupt only requests a shutdown. The device loop notices it at the
//! top of its next tick and the serial reader between reads.

use anyhow::{Context, Result};
use std::sync::Arc;

use mf_core::Termination;

/// Route Ctrl-C to `termination`
pub fn install_interrupt_handler(termination: Arc<Termination>) -> Result<()> {
    ctrlc::set_handler(move || on_interrupt(&termination))
        .context("Failed to install Ctrl-C handler")
}

fn on_interrupt(termination: &Termination) {
    if termination.shutdown_requested() {
        log::warn!("Interrupted again, still waiting for the device loop");
    } else {
        log::info!("Interrupted, shutting down");
    }
    termination.request_shutdown();
}
