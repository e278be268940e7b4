//! `doorlock hmi`: drive a Control node from the terminal.

use anyhow::Context;
use doorlock_emulator::{HmiConfig, InterfaceNode, NodeError};
use doorlock_hardware::HardwareError;
use doorlock_link::tcp;
use tracing::info;

use crate::HmiArgs;
use crate::config;
use crate::peripherals::{StdinKeypad, TerminalDisplay};

pub async fn run(args: HmiArgs) -> anyhow::Result<()> {
    let config: HmiConfig = config::load(&args.node)?;
    let link_config = config::link_config(&args.node);

    let link = tcp::connect(&args.connect, &link_config)
        .await
        .with_context(|| format!("Failed to connect to {}", args.connect))?;

    let display = TerminalDisplay::new(config.display_rows, config.display_columns);
    let keypad = StdinKeypad::spawn();
    let mut node = InterfaceNode::new(link, keypad, display, config);

    info!("Keys: digits, '=' to confirm, '+' open door, '-' change password");

    let result = tokio::select! {
        result = node.run() => result,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_link_closed() => {
            info!("Control node hung up");
            Ok(())
        }
        Err(NodeError::Hardware(HardwareError::Disconnected { .. })) => {
            info!("Keypad input ended");
            Ok(())
        }
        Err(e) => Err(e).context("Interface node stopped"),
    }
}
