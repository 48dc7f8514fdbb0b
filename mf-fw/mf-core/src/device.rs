//! Consumer context: the device main loop
//!
//! [`Device`] is the context object threaded through the extractor, framer,
//! dispatcher and variable store. Each [`tick`](Device::tick) runs, in order:
//!
//! 1. drain buffered input through the framer and dispatcher
//! 2. poll buttons and report changes
//! 3. read the variable store and draw the instrument
//! 4. flush serial output and present the frame
//!
//! Nothing in a tick blocks.

extern crate alloc;

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::attitude::Attitude;
use crate::buttons::ButtonMonitor;
use crate::command::CommandCode;
use crate::config::{DeviceConfig, InputMode};
use crate::encoder::ResponseEncoder;
use crate::error::{ProtocolError, TransportError};
use crate::extractor::Extractor;
use crate::framer::{FramerState, MessageFramer};
use crate::registry::{CommandRegistry, HandlerContext};
use crate::ring_buffer::Consumer;
use crate::termination::Termination;
use crate::transport::{Screen, SerialWrite};
use crate::variables::VariableStore;

/// Shown once at boot
pub const BOOT_MESSAGE: &str = "Starting MobiFlight";
/// Shown when the loop exits on a shutdown request
pub const SHUTDOWN_MESSAGE: &str = "MobiFlight stopped";

/// Whether the caller should keep ticking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Counts of processed and dropped messages
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolStats {
    pub dispatched: u32,
    pub malformed: u32,
    pub unknown: u32,
    pub handler_failures: u32,
}

pub struct Device<W: SerialWrite, S: Screen> {
    input_mode: InputMode,
    pitch_index: usize,
    bank_index: usize,
    extractor: Extractor,
    framer: MessageFramer,
    registry: CommandRegistry,
    vars: VariableStore,
    buttons: Vec<ButtonMonitor>,
    attitude: Attitude,
    serial: W,
    screen: S,
    termination: Arc<Termination>,
    stats: ProtocolStats,
}

impl<W: SerialWrite, S: Screen> Device<W, S> {
    /// Assemble a device around the consumer end of the ring buffer.
    ///
    /// `registry` is moved in and can no longer be extended. Every display
    /// module's variable starts at `"0"`.
    pub fn new(
        config: &DeviceConfig,
        consumer: Consumer,
        registry: CommandRegistry,
        serial: W,
        screen: S,
        termination: Arc<Termination>,
    ) -> Self {
        let mut vars = VariableStore::new();
        for index in 0..config.displays.len() {
            vars.set(index, "0");
        }

        Self {
            input_mode: config.input_mode,
            pitch_index: config.pitch_index,
            bank_index: config.bank_index,
            extractor: Extractor::new(consumer, config.echo),
            framer: MessageFramer::new(config.max_message_len),
            registry,
            vars,
            buttons: Vec::new(),
            attitude: Attitude::default(),
            serial,
            screen,
            termination,
            stats: ProtocolStats::default(),
        }
    }

    /// Attach a button to poll every tick
    pub fn with_button(mut self, button: ButtonMonitor) -> Self {
        self.buttons.push(button);
        self
    }

    /// Show the boot banner
    pub fn boot(&mut self) {
        log::info!(
            "{BOOT_MESSAGE} ({:?} input, echo {})",
            self.input_mode,
            if self.extractor.echo() { "on" } else { "off" }
        );
        self.show(BOOT_MESSAGE);
    }

    /// Boot, then tick until stopped, calling `idle` between ticks
    ///
    /// # Returns
    ///
    /// * `Ok(())` after an orderly shutdown
    /// * `Err(ProtocolError::TransportFailure)` if the transport failed
    pub fn run(&mut self, mut idle: impl FnMut()) -> Result<(), ProtocolError> {
        self.boot();
        loop {
            match self.tick()? {
                LoopControl::Continue => idle(),
                LoopControl::Stop => return Ok(()),
            }
        }
    }

    /// Run one pass of the main loop
    ///
    /// Protocol errors are logged and counted here. A transport failure sets
    /// the termination flag, puts the error on screen and is returned.
    pub fn tick(&mut self) -> Result<LoopControl, ProtocolError> {
        if self.termination.is_terminated() {
            return Ok(LoopControl::Stop);
        }
        if self.termination.has_read_fault() {
            // Whatever arrived before the link dropped is still handled
            let err = match self.step() {
                Ok(()) => ProtocolError::TransportFailure(TransportError::ConnectionLost),
                Err(err) => err,
            };
            return Err(self.fail(err));
        }
        if self.termination.shutdown_requested() {
            log::info!("Shutdown requested");
            self.termination.terminate();
            self.drop_partial();
            self.show(SHUTDOWN_MESSAGE);
            return Ok(LoopControl::Stop);
        }

        match self.step() {
            Ok(()) => Ok(LoopControl::Continue),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn step(&mut self) -> Result<(), ProtocolError> {
        self.drain_input()?;

        for button in &mut self.buttons {
            button.poll(&mut ResponseEncoder::new(&mut self.serial))?;
        }

        self.attitude
            .refresh(&self.vars, self.pitch_index, self.bank_index);
        self.screen.draw(&self.attitude, self.framer.last_command());

        ResponseEncoder::new(&mut self.serial).flush()?;
        self.screen.present();
        Ok(())
    }

    fn drain_input(&mut self) -> Result<(), ProtocolError> {
        match self.input_mode {
            InputMode::Byte => loop {
                let byte = {
                    let mut out = ResponseEncoder::new(&mut self.serial);
                    self.extractor.next_byte(&mut out)?
                };
                match byte {
                    Some(byte) => self.feed(char::from(byte))?,
                    None => return Ok(()),
                }
            },
            InputMode::Line => {
                while let Some(line) = self.extractor.next_line() {
                    log::trace!("<- line {line:?}");
                    for ch in line.chars() {
                        self.feed(ch)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Push one character through the framer and dispatch a completed message.
    /// Only fatal errors are returned.
    fn feed(&mut self, ch: char) -> Result<(), ProtocolError> {
        let Some(framed) = self.framer.push(ch) else {
            return Ok(());
        };

        let outcome = match framed {
            Ok(message) => {
                log::debug!("<- {}", self.framer.last_command());
                let mut ctx = HandlerContext {
                    vars: &mut self.vars,
                    out: ResponseEncoder::new(&mut self.serial),
                };
                self.registry
                    .dispatch(message.code, &message.args, &mut ctx)
            }
            Err(err) => Err(err),
        };

        self.record(outcome)
    }

    fn record(&mut self, outcome: Result<CommandCode, ProtocolError>) -> Result<(), ProtocolError> {
        match outcome {
            Ok(_) => self.stats.dispatched += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                log::warn!("Dropped message: {err}");
                match err {
                    ProtocolError::MalformedMessage(_) => self.stats.malformed += 1,
                    ProtocolError::UnknownCommand(_) => self.stats.unknown += 1,
                    ProtocolError::HandlerFailure { .. } => self.stats.handler_failures += 1,
                    ProtocolError::BufferOverflow | ProtocolError::TransportFailure(_) => {}
                }
            }
        }
        Ok(())
    }

    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        log::error!("{err}");
        self.termination.terminate();
        self.drop_partial();
        self.show(&err.to_string());
        err
    }

    /// Forget an unterminated message when the loop stops
    fn drop_partial(&mut self) {
        if self.framer.state() == FramerState::Accumulating {
            log::warn!("Dropping unterminated message {:?}", self.framer.pending());
        }
        self.framer.reset();
    }

    fn show(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.screen.show_message(text);
        }
    }

    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    pub fn attitude(&self) -> &Attitude {
        &self.attitude
    }

    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    /// Bytes the producer has dropped because the buffer was full
    pub fn overflow_count(&self) -> usize {
        self.extractor.consumer().overflow_count()
    }

    pub fn framer_state(&self) -> FramerState {
        self.framer.state()
    }

    pub fn last_command(&self) -> &str {
        self.framer.last_command()
    }

    pub fn serial(&self) -> &W {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut W {
        &mut self.serial
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Hand back the serial writer and screen
    pub fn into_io(self) -> (W, S) {
        (self.serial, self.screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::SharedButton;
    use crate::handlers::register_defaults;
    use crate::ring_buffer::{Producer, RingBuffer};
    use crate::transport::{FakeScreen, FakeSerial};
    use alloc::string::String;

    fn setup(config: DeviceConfig) -> (Producer, Arc<Termination>, Device<FakeSerial, FakeScreen>) {
        let (producer, consumer) = RingBuffer::with_capacity(config.buffer_capacity);
        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry, &config);
        let termination = Arc::new(Termination::new());
        let device = Device::new(
            &config,
            consumer,
            registry,
            FakeSerial::new(),
            FakeScreen::default(),
            termination.clone(),
        );
        (producer, termination, device)
    }

    fn quiet() -> DeviceConfig {
        DeviceConfig {
            echo: false,
            ..DeviceConfig::default()
        }
    }

    fn push_str(producer: &mut Producer, text: &str) {
        for b in text.bytes() {
            producer.push(b).unwrap();
        }
    }

    #[test]
    fn test_set_variable_drives_attitude() {
        let (mut producer, _, mut device) = setup(quiet());
        push_str(&mut producer, "25,0,12.5;25,1,-3;");

        assert_eq!(device.tick(), Ok(LoopControl::Continue));

        assert_eq!(device.vars().get(0), Some("12.5"));
        assert_eq!(*device.attitude(), Attitude { pitch: 12.5, bank: -3.0 });
        assert_eq!(device.last_command(), "25,1,-3");
        let (drawn, last) = device.screen().last_frame.clone().unwrap();
        assert_eq!(drawn.pitch, 12.5);
        assert_eq!(last, "25,1,-3");
        assert_eq!(device.stats().dispatched, 2);
    }

    #[test]
    fn test_query_is_answered() {
        let (mut producer, _, mut device) = setup(quiet());
        push_str(&mut producer, "9;");
        device.tick().unwrap();
        assert_eq!(
            device.serial_mut().take_output(),
            "10,MobiFlight Tufty2040,MobiFlight Tufty2040,SN-752-f99,0.0.1;\r\n"
        );
    }

    #[test]
    fn test_echo_writes_input_back() {
        let (mut producer, _, mut device) = setup(DeviceConfig::default());
        push_str(&mut producer, "25,0,1;");
        device.tick().unwrap();
        assert_eq!(device.serial().output(), "25,0,1;");
    }

    #[test]
    fn test_protocol_errors_do_not_stop_processing() {
        let (mut producer, _, mut device) = setup(quiet());
        push_str(&mut producer, "9999,x;abc;25,7;25,0,5;");

        assert_eq!(device.tick(), Ok(LoopControl::Continue));

        let stats = device.stats();
        assert_eq!(stats.unknown, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.handler_failures, 1);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(device.vars().get(0), Some("5"));
        assert_eq!(device.vars().get(7), None);
    }

    #[test]
    fn test_partial_message_waits_for_next_tick() {
        let (mut producer, _, mut device) = setup(quiet());
        push_str(&mut producer, "25,1,4");
        device.tick().unwrap();
        assert_eq!(device.vars().get(1), Some("0"));

        push_str(&mut producer, "2;");
        device.tick().unwrap();
        assert_eq!(device.vars().get(1), Some("42"));
    }

    #[test]
    fn test_line_mode() {
        let config = DeviceConfig {
            input_mode: InputMode::Line,
            ..quiet()
        };
        let (mut producer, _, mut device) = setup(config);
        push_str(&mut producer, "25,0,7;\r\n25,1,");
        device.tick().unwrap();
        assert_eq!(device.vars().get(0), Some("7"));

        push_str(&mut producer, "8;\n");
        device.tick().unwrap();
        assert_eq!(device.vars().get(1), Some("8"));
    }

    #[test]
    fn test_line_mode_recovers_from_full_buffer_without_line_feed() {
        let config = DeviceConfig {
            input_mode: InputMode::Line,
            buffer_capacity: 8,
            ..quiet()
        };
        let (mut producer, _, mut device) = setup(config);
        push_str(&mut producer, "9;9;9;9;");
        device.tick().unwrap();
        assert_eq!(device.stats().dispatched, 4);

        push_str(&mut producer, "25,0,5;\n");
        device.tick().unwrap();

        assert_eq!(device.vars().get(0), Some("5"));
        assert_eq!(device.stats().dispatched, 5);
        assert_eq!(device.overflow_count(), 0);
    }

    #[test]
    fn test_button_change_is_reported() {
        let (_, _, device) = setup(quiet());
        let button = SharedButton::new();
        let mut device = device.with_button(ButtonMonitor::new("ButtonA", button.clone()));

        device.tick().unwrap();
        assert!(device.serial().output().is_empty());

        button.set_pressed(true);
        device.tick().unwrap();
        assert_eq!(device.serial_mut().take_output(), "7,ButtonA,0;\r\n");
    }

    #[test]
    fn test_shutdown_request_stops_loop() {
        let (_, termination, mut device) = setup(quiet());
        termination.request_shutdown();

        assert_eq!(device.run(|| {}), Ok(()));
        assert!(termination.is_terminated());
        assert_eq!(
            device.screen().messages,
            [String::from(BOOT_MESSAGE), String::from(SHUTDOWN_MESSAGE)]
        );
    }

    #[test]
    fn test_shutdown_drops_unterminated_message() {
        let (mut producer, termination, mut device) = setup(quiet());
        push_str(&mut producer, "25,0,");
        device.tick().unwrap();
        assert_eq!(device.framer_state(), FramerState::Accumulating);

        termination.request_shutdown();
        assert_eq!(device.tick(), Ok(LoopControl::Stop));
        assert_eq!(device.framer_state(), FramerState::Idle);
        assert_eq!(device.vars().get(0), Some("0"));
    }

    #[test]
    fn test_read_fault_is_fatal() {
        let (_, termination, mut device) = setup(quiet());
        termination.report_read_fault();

        let result = device.tick();

        assert_eq!(
            result,
            Err(ProtocolError::TransportFailure(TransportError::ConnectionLost))
        );
        assert!(termination.is_terminated());
        assert_eq!(device.screen().messages.len(), 1);
        assert_eq!(device.tick(), Ok(LoopControl::Stop));
    }

    #[test]
    fn test_input_before_read_fault_is_processed() {
        let (mut producer, termination, mut device) = setup(quiet());
        push_str(&mut producer, "25,0,3;");
        termination.report_read_fault();

        assert!(device.tick().is_err());
        assert_eq!(device.vars().get(0), Some("3"));
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let (mut producer, termination, mut device) = setup(quiet());
        device.serial_mut().fail_with = Some(TransportError::WriteFailed("unplugged".to_string()));
        push_str(&mut producer, "12;");

        assert!(matches!(
            device.tick(),
            Err(ProtocolError::TransportFailure(TransportError::WriteFailed(_)))
        ));
        assert!(termination.is_terminated());
    }

    #[test]
    fn test_overflow_count_is_visible_to_consumer() {
        let config = DeviceConfig {
            buffer_capacity: 2,
            ..quiet()
        };
        let (mut producer, _, device) = setup(config);
        producer.push(b'1').unwrap();
        producer.push(b'2').unwrap();
        assert!(producer.push(b'3').is_err());
        assert_eq!(device.overflow_count(), 1);
    }
}
