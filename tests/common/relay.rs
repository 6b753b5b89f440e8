//! A minimal in-process MIDI-relay server over real WebSockets.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

enum ConnCommand {
    Text(String),
    Close,
    /// Drop the socket with no close handshake (simulated network drop).
    Abort,
}

/// One accepted client connection, driven from the test body.
pub struct RelayConn {
    incoming: mpsc::UnboundedReceiver<String>,
    commands: mpsc::UnboundedSender<ConnCommand>,
}

impl RelayConn {
    /// Send one text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.commands.send(ConnCommand::Text(text.into()));
    }

    /// Close gracefully.
    pub fn close(&self) {
        let _ = self.commands.send(ConnCommand::Close);
    }

    /// Kill the connection uncleanly.
    pub fn abort(&self) {
        let _ = self.commands.send(ConnCommand::Abort);
    }

    /// Next text frame received from the client.
    pub async fn recv_text(&mut self) -> String {
        tokio::time::timeout(super::WAIT, self.incoming.recv())
            .await
            .expect("timed out waiting for client frame")
            .expect("relay connection task ended")
    }
}

/// Accept-loop wrapper bound to an ephemeral port.
pub struct RelayServer {
    addr: String,
    conns: mpsc::UnboundedReceiver<RelayConn>,
}

impl RelayServer {
    pub async fn spawn() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        let (conn_tx, conns) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _peer)) = listener.accept().await {
                let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
                let (command_tx, command_rx) = mpsc::unbounded_channel();
                if conn_tx
                    .send(RelayConn {
                        incoming: incoming_rx,
                        commands: command_tx,
                    })
                    .is_err()
                {
                    break;
                }
                tokio::spawn(serve_conn(stream, incoming_tx, command_rx));
            }
        });

        Ok(Self { addr, conns })
    }

    /// Host string for `SocketConfig`.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Wait for the next client to connect.
    pub async fn next_conn(&mut self) -> RelayConn {
        tokio::time::timeout(super::WAIT, self.conns.recv())
            .await
            .expect("timed out waiting for a client connection")
            .expect("relay listener ended")
    }
}

async fn serve_conn(
    stream: TcpStream,
    incoming: mpsc::UnboundedSender<String>,
    mut commands: mpsc::UnboundedReceiver<ConnCommand>,
) {
    let mut ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(_) => return,
    };

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ConnCommand::Text(text)) => {
                    if ws.send(WsMessage::Text(text)).await.is_err() {
                        return;
                    }
                }
                Some(ConnCommand::Close) => {
                    let _ = ws.close(None).await;
                    // Keep reading so the handshake reply gets flushed.
                }
                Some(ConnCommand::Abort) | None => return,
            },
            frame = ws.next() => match frame {
                // tungstenite queues the close reply itself; keep polling
                // so it gets written, then the stream ends.
                Some(Ok(WsMessage::Close(_))) => continue,
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = incoming.send(text);
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return,
            },
        }
    }
}
