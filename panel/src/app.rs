use crate::config::PanelConfig;
use crate::controller::StreamingSessionController;
use crate::sources::SourceDescriptor;
use eyre::Context;
use livecast_bridge::HostConnection;

/// Connect to the host described by `config` and drive the session until the host lets go.
///
/// Exactly one controller exists for the lifetime of the connection. Every inbound event is fed
/// to it from this task, one at a time, so transitions never interleave.
pub async fn run(config: PanelConfig) -> eyre::Result<()> {
    let presets = config.presets()?;

    let (connection, info) = HostConnection::pair(config.host_addr.as_str(), &config.panel_id)
        .await
        .with_context(|| format!("pair with host at {}", config.host_addr))?;

    let mut controller =
        StreamingSessionController::new(connection.handle(), presets, config.service_provider);
    let sources: Vec<_> = info
        .sources
        .into_iter()
        .map(SourceDescriptor::from)
        .collect();
    controller.attach(&sources);

    connection
        .run(|event| controller.handle_event(event))
        .await
        .context("serve host connection")?;

    tracing::info!(state = ?controller.state(), "panel shut down");
    Ok(())
}
