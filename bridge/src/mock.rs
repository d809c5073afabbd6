//! Mock broadcasting host for testing panels.
//!
//! This module provides a host stand-in that speaks the newline-delimited JSON protocol, so a
//! panel can be exercised end-to-end without a real broadcasting application.
//!
//! ## Message Flow
//! - **Commands** (panel → host) are captured and can be awaited with
//!   [`MockSession::wait_for`], or inspected afterwards with [`MockSession::captured`].
//! - **Events** (host → panel) are pushed by the test with [`MockSession::send`].

use crate::protocol::{HostEvent, InfoMessage, PanelCommand};
use eyre::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// How long [`MockSession::wait_for`] waits by default before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A mock host waiting for a panel to connect.
#[derive(Debug)]
pub struct MockHost {
    listener: TcpListener,
    info: InfoMessage,
}

impl MockHost {
    /// Bind to an available port on localhost.
    ///
    /// `info` is what the mock answers the pair command with.
    pub async fn bind(info: InfoMessage) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock host")?;
        Ok(Self { listener, info })
    }

    /// The address panels should connect to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("get mock host address")
    }

    /// Accept a single panel and complete the pair handshake with it.
    pub async fn accept(self) -> Result<MockSession> {
        tracing::info!("mock host listening on {}", self.local_addr()?);
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .context("accept panel connection")?;
        tracing::info!("panel connected from {}", addr);

        let (read, write) = stream.into_split();
        let mut session = MockSession {
            reader: BufReader::new(read),
            writer: BufWriter::new(write),
            captured: Vec::new(),
            panel_id: String::new(),
        };

        let first = session
            .next_command(DEFAULT_TIMEOUT)
            .await
            .context("await pair command")?;
        let PanelCommand::Pair(pair) = first else {
            eyre::bail!("expected pair command first, got {first:?}");
        };
        session.panel_id = pair.id;
        session
            .send(HostEvent::Info(self.info))
            .await
            .context("answer pair")?;

        Ok(session)
    }
}

/// The host side of one connected panel.
#[derive(Debug)]
pub struct MockSession {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    captured: Vec<PanelCommand>,
    panel_id: String,
}

impl MockSession {
    /// The id the panel paired with.
    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    /// Every command received so far, in arrival order, including the pair command.
    pub fn captured(&self) -> &[PanelCommand] {
        &self.captured
    }

    /// Push an event to the panel.
    pub async fn send(&mut self, event: HostEvent) -> Result<()> {
        let json = serde_json::to_string(&event).context("serialize event to panel")?;
        tracing::trace!(?json, "mock host -> panel");
        self.writer
            .write_all(json.as_bytes())
            .await
            .context("write event to panel")?;
        self.writer
            .write_all(b"\n")
            .await
            .context("write newline to panel")?;
        self.writer.flush().await.context("flush to panel")?;
        Ok(())
    }

    /// Read the next command the panel sends.
    ///
    /// Fails if the panel disconnects or nothing arrives within `timeout`.
    pub async fn next_command(&mut self, timeout: Duration) -> Result<PanelCommand> {
        match self.read_command(timeout).await? {
            Some(cmd) => Ok(cmd),
            None => eyre::bail!("panel disconnected"),
        }
    }

    /// Like [`next_command`](Self::next_command), but yields `None` once the panel hangs up.
    async fn read_command(&mut self, timeout: Duration) -> Result<Option<PanelCommand>> {
        let mut line = String::new();
        let n = tokio::time::timeout(timeout, self.reader.read_line(&mut line))
            .await
            .context("wait for panel command")?
            .context("read from panel")?;
        if n == 0 {
            return Ok(None);
        }
        tracing::trace!(json = %line.trim(), "panel -> mock host");
        let cmd: PanelCommand =
            serde_json::from_str(line.trim()).context("parse command from panel")?;
        self.captured.push(cmd.clone());
        Ok(Some(cmd))
    }

    /// Skip commands until one matches `pred`, and return it.
    pub async fn wait_for<P>(&mut self, mut pred: P) -> Result<PanelCommand>
    where
        P: FnMut(&PanelCommand) -> bool,
    {
        loop {
            let cmd = self.next_command(DEFAULT_TIMEOUT).await?;
            if pred(&cmd) {
                tracing::info!(?cmd, "✅ observed expected command");
                return Ok(cmd);
            }
            tracing::debug!(?cmd, "skipping command");
        }
    }

    /// Ask the panel to shut down and collect whatever it sends before hanging up.
    pub async fn close(mut self) -> Result<Vec<PanelCommand>> {
        self.send(HostEvent::ClosePanel).await?;
        while self.read_command(DEFAULT_TIMEOUT).await?.is_some() {}
        Ok(self.captured)
    }
}
