use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use mf_core::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Byte,
    Line,
}

impl From<ModeArg> for InputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Byte => InputMode::Byte,
            ModeArg::Line => InputMode::Line,
        }
    }
}

/// Run the MobiFlight device core against stdin/stdout or a serial port
#[derive(Debug, Parser)]
#[command(name = "mf-host", version)]
pub struct HostArgs {
    /// Serial port to open (e.g. /dev/ttyACM0); stdin/stdout when omitted
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate for --port
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,

    /// JSON device configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the ring buffer capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Do not echo received bytes
    #[arg(long)]
    pub no_echo: bool,

    /// Override the input mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Sleep between ticks, in milliseconds
    #[arg(long, default_value_t = 1)]
    pub tick_ms: u64,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}
