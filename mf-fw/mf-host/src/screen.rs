//! Host stand-in for the instrument panel
//!
//! There is no panel on a desktop, so frames go to the log. A frame is only
//! logged when it differs from the previous one.

use mf_core::{Attitude, Screen};

#[derive(Default)]
pub struct LogScreen {
    last_drawn: Option<(Attitude, String)>,
    frames: u64,
}

impl LogScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Screen for LogScreen {
    fn show_message(&mut self, text: &str) {
        log::info!("[screen] {text}");
    }

    fn draw(&mut self, attitude: &Attitude, last_command: &str) {
        let changed = match &self.last_drawn {
            Some((previous, command)) => previous != attitude || command != last_command,
            None => true,
        };
        if changed {
            log::debug!(
                "[screen] pitch {:.1} bank {:.1} | {last_command}",
                attitude.pitch,
                attitude.bank
            );
            self.last_drawn = Some((*attitude, last_command.to_string()));
        }
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}
