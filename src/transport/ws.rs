//! Production transport over tokio-tungstenite.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use super::{Connector, TransportCommand, TransportEvent, TransportLink};

/// Dials `ws://{host}` for each [`connect`](Connector::connect) call.
///
/// Each dial spawns one task owning the WebSocket; the task translates
/// between [`TransportCommand`]s and [`TransportEvent`]s and exits after
/// emitting its terminal [`TransportEvent::Closed`].
#[derive(Debug, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, host: &str) -> TransportLink {
        let (link, command_rx, event_tx) = TransportLink::pair();
        let url = format!("ws://{host}");
        tokio::spawn(run_connection(url, command_rx, event_tx));
        link
    }
}

async fn run_connection(
    url: String,
    mut commands: mpsc::UnboundedReceiver<TransportCommand>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            debug!(url = %url, error = %e, "WebSocket dial failed");
            let _ = events.send(TransportEvent::Error(e.to_string()));
            let _ = events.send(TransportEvent::Closed {
                clean: false,
                code: None,
            });
            return;
        }
    };

    debug!(url = %url, "WebSocket established");
    let _ = events.send(TransportEvent::Open);

    // Set once we initiate the close handshake; an EOF after that is a
    // completed handshake, not a drop.
    let mut close_requested = false;
    let mut requested_code: Option<u16> = None;
    let mut commands_open = true;

    loop {
        tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(TransportCommand::Send(frame)) => {
                    if let Err(e) = ws.send(WsMessage::Text(frame)).await {
                        warn!(error = %e, "WebSocket write failed");
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                        let _ = events.send(TransportEvent::Closed {
                            clean: false,
                            code: None,
                        });
                        return;
                    }
                }
                Some(TransportCommand::Close(code)) => {
                    close_requested = true;
                    requested_code = code;
                    let frame = code.map(|c| CloseFrame {
                        code: CloseCode::from(c),
                        reason: "".into(),
                    });
                    let _ = ws.close(frame).await;
                    // Keep reading until the peer completes the handshake.
                }
                None => {
                    // Every handle dropped; nobody is left to hear events,
                    // so just shut the socket down.
                    commands_open = false;
                    close_requested = true;
                    let _ = ws.close(None).await;
                }
            },
            frame = ws.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = events.send(TransportEvent::Message(text));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    let _ = events.send(TransportEvent::Closed { clean: true, code });
                    return;
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {
                    // tungstenite answers pings during read; nothing to do.
                }
                Some(Ok(other)) => {
                    warn!(kind = ?other, "ignoring non-text WebSocket frame");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket read failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    let _ = events.send(TransportEvent::Closed {
                        clean: false,
                        code: None,
                    });
                    return;
                }
                None => {
                    let _ = events.send(TransportEvent::Closed {
                        clean: close_requested,
                        code: requested_code,
                    });
                    return;
                }
            },
        }
    }
}
