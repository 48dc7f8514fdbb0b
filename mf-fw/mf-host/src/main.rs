//! mf-host binary entry point.
//!
//! Talks the MobiFlight protocol over stdin/stdout (default) or a serial port.
//! Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use mf_core::{ButtonMonitor, DeviceConfig, SerialWrite, Termination};
use mf_host::args::HostArgs;
use mf_host::buttons::configured_buttons;
use mf_host::config::resolve_config;
use mf_host::device_loop::{LoopReport, run_device_loop};
use mf_host::screen::LogScreen;
use mf_host::shutdown::install_interrupt_handler;
use mf_host::transport::{ReadSource, WriteSink};

fn main() -> Result<()> {
    let args = HostArgs::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &args.log_level {
        logger.parse_filters(filter);
    }
    logger.init();

    let config = resolve_config(&args)?;
    let tick_interval = Duration::from_millis(args.tick_ms);
    let termination = Arc::new(Termination::new());
    install_interrupt_handler(termination.clone())?;
    let (buttons, _handles) = configured_buttons(&config);

    log::info!(
        "mf-host starting ({:?} mode, {} byte buffer, echo {})",
        config.input_mode,
        config.buffer_capacity,
        if config.echo { "on" } else { "off" }
    );

    match &args.port {
        Some(port) => run_serial(&config, port, args.baud, buttons, termination, tick_interval),
        None => {
            let source = ReadSource::new(std::io::stdin());
            let sink = WriteSink::new(std::io::stdout());
            finish(run_device_loop(
                &config,
                source,
                sink,
                LogScreen::new(),
                buttons,
                termination,
                tick_interval,
            ))
        }
    }
}

#[cfg(feature = "serial")]
fn run_serial(
    config: &DeviceConfig,
    port: &str,
    baud: u32,
    buttons: Vec<ButtonMonitor>,
    termination: Arc<Termination>,
    tick_interval: Duration,
) -> Result<()> {
    let (source, sink) = mf_host::transport::open_serial(port, baud)?;
    finish(run_device_loop(
        config,
        source,
        sink,
        LogScreen::new(),
        buttons,
        termination,
        tick_interval,
    ))
}

#[cfg(not(feature = "serial"))]
fn run_serial(
    _config: &DeviceConfig,
    port: &str,
    _baud: u32,
    _buttons: Vec<ButtonMonitor>,
    _termination: Arc<Termination>,
    _tick_interval: Duration,
) -> Result<()> {
    anyhow::bail!("Cannot open {port}: built without the `serial` feature");
}

fn finish<W: SerialWrite>(report: LoopReport<W, LogScreen>) -> Result<()> {
    let stats = report.stats;
    log::info!(
        "Processed {} message(s); dropped {} malformed, {} unknown, {} failed; {} byte(s) overflowed; {} frame(s)",
        stats.dispatched,
        stats.malformed,
        stats.unknown,
        stats.handler_failures,
        report.overflows,
        report.screen.frames()
    );
    report.result?;
    Ok(())
}
