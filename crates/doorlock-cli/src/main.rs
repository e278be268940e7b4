//! `doorlock` binary.
//!
//! Runs one node of the door lock over TCP, standing in for the serial
//! cable between the two boards.
//!
//! # Usage
//!
//! ```bash
//! # Control node, credential persisted in ./eeprom.bin
//! doorlock control --listen 127.0.0.1:7878 --eeprom eeprom.bin
//!
//! # Interface node, keys from stdin, display on stdout
//! doorlock hmi --connect 127.0.0.1:7878
//!
//! # Both with 100 ms ticks for a quick demo
//! doorlock control --tick-ms 100 --eeprom eeprom.bin
//! doorlock hmi --tick-ms 100
//! ```

mod config;
mod control;
mod hmi;
mod peripherals;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Door lock node runner
#[derive(Parser, Debug)]
#[command(name = "doorlock", about = "Door lock node runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Control node: motor, buzzer, and credential storage
    Control(ControlArgs),

    /// Run the Interface node: keypad on stdin, display on stdout
    Hmi(HmiArgs),
}

/// Settings shared by both nodes.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// JSON file with node settings; flags override it
    #[arg(long, env = "DOORLOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tick period in milliseconds
    #[arg(long, env = "DOORLOCK_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Give up on a link receive after this many milliseconds
    #[arg(long, env = "DOORLOCK_LINK_TIMEOUT_MS")]
    pub link_timeout_ms: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ControlArgs {
    /// Address to listen on
    #[arg(long, env = "DOORLOCK_LISTEN", default_value = "127.0.0.1:7878")]
    pub listen: String,

    /// File holding the EEPROM image
    #[arg(long, env = "DOORLOCK_EEPROM", default_value = "doorlock-eeprom.bin")]
    pub eeprom: PathBuf,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct HmiArgs {
    /// Address of the Control node
    #[arg(long, env = "DOORLOCK_CONNECT", default_value = "127.0.0.1:7878")]
    pub connect: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the display.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Control(args) => control::run(args).await,
        Commands::Hmi(args) => hmi::run(args).await,
    }
}
