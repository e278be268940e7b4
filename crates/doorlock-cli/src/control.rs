//! `doorlock control`: serve Interface nodes over TCP.

use anyhow::Context;
use doorlock_emulator::{ControlConfig, ControlNode, NodeError};
use doorlock_hardware::FileEeprom;
use doorlock_link::LinkListener;
use tracing::{info, warn};

use crate::ControlArgs;
use crate::config;
use crate::peripherals::{LoggingBuzzer, LoggingMotor};

pub async fn run(args: ControlArgs) -> anyhow::Result<()> {
    let config: ControlConfig = config::load(&args.node)?;
    let link_config = config::link_config(&args.node);

    let listener = LinkListener::bind(&args.listen, link_config)
        .await
        .with_context(|| format!("Failed to listen on {}", args.listen))?;

    tokio::select! {
        result = serve(&listener, &args, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Serve one Interface node at a time, rebooting the node for each.
async fn serve(
    listener: &LinkListener,
    args: &ControlArgs,
    config: &ControlConfig,
) -> anyhow::Result<()> {
    loop {
        let (link, peer) = listener.accept().await.context("Failed to accept link")?;

        let eeprom = FileEeprom::open(&args.eeprom)
            .await
            .with_context(|| format!("Failed to open EEPROM image {}", args.eeprom.display()))?;
        let mut node = ControlNode::boot(
            link,
            LoggingMotor::default(),
            LoggingBuzzer::default(),
            eeprom,
            config.clone(),
        )
        .await
        .context("Control node failed to boot")?;

        match node.run().await {
            Ok(()) => {}
            Err(e) if e.is_link_closed() => info!("Interface node {} disconnected", peer),
            Err(NodeError::Link(e)) => warn!("Link to {} failed: {}", peer, e),
            Err(e) => return Err(e).context("Control node stopped"),
        }
    }
}
