//! Plumbing between the livecast control panel and the native broadcasting host.
//!
//! The host listens on a TCP port. The panel connects, identifies itself with a
//! [`PairCommand`](protocol::PairCommand), and receives an [`InfoMessage`](protocol::InfoMessage)
//! in return. From then on the host pushes [`HostEvent`](protocol::HostEvent)s whenever something
//! happens (a button press, a stream starting, a browser popup closing) and the panel sends
//! [`PanelCommand`](protocol::PanelCommand)s whenever it wants something done. Neither side ever
//! waits for the other: there is no request/response pairing beyond the initial handshake.

use eyre::Context;
use protocol::{HostEvent, InfoMessage, PairCommand, PanelCommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;

pub mod protocol;

#[cfg(feature = "mock")]
pub mod mock;

/// A cheap, cloneable way to send commands to the host.
///
/// Sending never blocks and never fails from the caller's point of view. If the connection has
/// already gone away the command is dropped, which matches how the host treats a panel that has
/// disconnected: whatever it asked for no longer matters.
#[derive(Clone, Debug)]
pub struct HostHandle(mpsc::UnboundedSender<PanelCommand>);

impl HostHandle {
    /// Construct a handle that is not backed by a connection, along with the receiving end of its
    /// queue. Handy for driving a panel without a host.
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<PanelCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub fn send(&self, cmd: PanelCommand) {
        if self.0.send(cmd).is_err() {
            tracing::debug!("dropping command for disconnected host");
        }
    }
}

/// An established, paired connection to the host.
#[derive(Debug)]
pub struct HostConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    handle: HostHandle,
    outgoing: mpsc::UnboundedReceiver<PanelCommand>,
}

impl HostConnection {
    /// Connect to the host at `addr` and complete the pair handshake.
    pub async fn pair(
        addr: impl ToSocketAddrs,
        panel_id: &str,
    ) -> eyre::Result<(Self, InfoMessage)> {
        tracing::info!("connect to host");
        let connection = TcpStream::connect(addr)
            .await
            .context("connect to broadcasting host")?;
        let (read, write) = connection.into_split();
        let mut writer = BufWriter::new(write);
        let mut reader = BufReader::new(read);

        tracing::debug!("connected to host");
        let mut out_buf = Vec::new();
        write_command(
            &mut writer,
            &mut out_buf,
            &PanelCommand::Pair(PairCommand {
                id: panel_id.to_string(),
            }),
        )
        .await
        .context("send pair command")?;

        tracing::debug!("await info response");
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .await
            .context("retrieve info from host")?;
        if n == 0 {
            eyre::bail!("host closed connection on pair");
        }
        let json: serde_json::Value =
            serde_json::from_str(&line).context("parse info from host")?;
        tracing::trace!(?json, "recv");
        let event: HostEvent = serde_json::from_value(json).context("parse as HostEvent")?;
        let HostEvent::Info(info) = event else {
            eyre::bail!("did not receive info in response to pair, got {event:?}");
        };
        tracing::info!(host_version = %info.host_version, "paired with host");

        let (handle, outgoing) = HostHandle::detached();
        Ok((
            Self {
                reader,
                writer,
                handle,
                outgoing,
            },
            info,
        ))
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Pump messages in both directions until the host asks the panel to close or hangs up.
    ///
    /// `on_event` is called for each inbound event, one at a time, and each call runs to
    /// completion before the next line is even read. An error from `on_event` ends the
    /// connection.
    pub async fn run<F>(self, mut on_event: F) -> eyre::Result<()>
    where
        F: FnMut(HostEvent) -> eyre::Result<()>,
    {
        let Self {
            reader,
            mut writer,
            handle,
            mut outgoing,
        } = self;
        // only handles given out by `handle()` should keep the outgoing queue open
        drop(handle);

        // `next_line` keeps partial input across calls, so losing the race to an outgoing
        // command never drops half a line
        let mut lines = reader.lines();
        let mut out_buf = Vec::new();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("read incoming message from host")? else {
                        tracing::warn!("incoming channel from host terminated");
                        break;
                    };
                    let json: serde_json::Value = serde_json::from_str(&line)
                        .context("parse JSON from host")?;
                    let kind = json["type"].to_string();
                    tracing::trace!(?json, "recv");
                    let event: HostEvent = serde_json::from_value(json)
                        .context("parse as HostEvent")?;
                    if let HostEvent::ClosePanel = event {
                        tracing::info!("host asked panel to close, exiting gracefully");
                        break;
                    }
                    on_event(event).with_context(|| format!("respond to {kind}"))?;
                }
                cmd = outgoing.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::warn!("outgoing channel to host terminated");
                        break;
                    };
                    write_command(&mut writer, &mut out_buf, &cmd).await?;
                }
            }
        }

        // flush whatever the last events produced so the host sees the final panel state
        while let Ok(cmd) = outgoing.try_recv() {
            write_command(&mut writer, &mut out_buf, &cmd).await?;
        }

        Ok(())
    }
}

async fn write_command(
    writer: &mut BufWriter<OwnedWriteHalf>,
    out_buf: &mut Vec<u8>,
    cmd: &PanelCommand,
) -> eyre::Result<()> {
    out_buf.clear();
    serde_json::to_writer(&mut *out_buf, cmd).context("serialize outgoing command")?;
    tracing::trace!(json = %String::from_utf8_lossy(out_buf), "send");
    out_buf.push(b'\n');
    writer
        .write_all(out_buf)
        .await
        .context("send outgoing command to host")?;
    writer.flush().await.context("flush outgoing command")?;
    Ok(())
}
