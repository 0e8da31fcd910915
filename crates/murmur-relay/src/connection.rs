//! Per-connection handler: identify, register, then feed commands to the engine.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use murmur_common::{EngineError, Tier, UserId};
use murmur_config::TiersConfig;
use murmur_engine::{Command, Engine};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::{ClientFrame, ClientHello, ServerFrame};
use crate::registry::ConnectionRegistry;

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Everything a connection needs from the server.
#[derive(Clone)]
pub struct RelayContext {
    pub engine: Engine,
    pub registry: ConnectionRegistry,
    pub tiers: TiersConfig,
    pub hello_timeout: Duration,
    pub channel_capacity: usize,
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(ws: WsStream, addr: SocketAddr, ctx: RelayContext) {
    let (mut sink, mut stream) = ws.split();

    // 1. Read the hello message to identify this client.
    let Some(user) = read_hello(&mut stream, addr, ctx.hello_timeout).await else {
        return;
    };

    // 2. Create our receive channel and register.
    let (tx, mut rx) = mpsc::channel::<String>(ctx.channel_capacity);
    let conn_id = match ctx.registry.register(&user, tx).await {
        Ok(id) => id,
        Err(e) => {
            let _ = send_frame(&mut sink, &ServerFrame::error("already_connected", e)).await;
            return;
        }
    };

    tracing::info!(peer = %addr, user = %user, "Client registered");

    if send_frame(&mut sink, &ServerFrame::Ready).await.is_err() {
        cleanup(&ctx, &user, conn_id).await;
        return;
    }

    // 3. Command loop.
    loop {
        tokio::select! {
            // Notices queued for this user → this client's WebSocket
            Some(msg) = rx.recv() => {
                if sink.send(Message::Text(msg.into())).await.is_err() {
                    break;
                }
            }

            // Frames from this client → engine
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let reply = dispatch(&ctx, &user, &text).await;
                        if let Some(reply) = reply {
                            if send_frame(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    tracing::info!(peer = %addr, user = %user, "Client disconnected");
    cleanup(&ctx, &user, conn_id).await;
}

/// Parse one client frame, run it, and build the reply for the sender.
async fn dispatch(ctx: &RelayContext, user: &UserId, text: &str) -> Option<ServerFrame> {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(user = %user, error = %e, "Unparseable frame");
            return Some(ServerFrame::error("bad_frame", e.to_string()));
        }
    };

    let command = match frame {
        ClientFrame::Chat => Command::RequestPairing {
            user: user.clone(),
            tier: tier_for(&ctx.tiers, user),
        },
        ClientFrame::Cancel => Command::Cancel { user: user.clone() },
        ClientFrame::Stop => Command::Stop { user: user.clone() },
        ClientFrame::Message { text } => Command::SendMessage {
            user: user.clone(),
            payload: text,
        },
    };

    match ctx.engine.handle(command).await {
        Ok(reply) => ServerFrame::from_reply(reply),
        Err(e) => Some(ServerFrame::from_error(&e)),
    }
}

fn tier_for(tiers: &TiersConfig, user: &UserId) -> Tier {
    if tiers.is_priority(user.as_str()) {
        Tier::Priority
    } else {
        Tier::Standard
    }
}

/// A dropped connection leaves the queue or the chat, like an explicit stop.
async fn cleanup(ctx: &RelayContext, user: &UserId, conn_id: u64) {
    ctx.registry.unregister(user, conn_id).await;
    match ctx.engine.stop(user).await {
        Ok(outcome) => tracing::debug!(user = %user, ?outcome, "Stopped on disconnect"),
        Err(EngineError::NotActive) => {}
        Err(e) => tracing::warn!(user = %user, error = %e, "Stop on disconnect failed"),
    }
}

/// Read and parse the first message as a `ClientHello`.
async fn read_hello(
    stream: &mut futures_util::stream::SplitStream<WsStream>,
    addr: SocketAddr,
    limit: Duration,
) -> Option<UserId> {
    let frame = tokio::time::timeout(limit, stream.next()).await;

    match frame {
        Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<ClientHello>(&text) {
            Ok(ClientHello::Hello { user_id }) if !user_id.trim().is_empty() => {
                Some(UserId::new(user_id))
            }
            Ok(_) => {
                tracing::warn!(peer = %addr, "Hello with empty user id");
                None
            }
            Err(e) => {
                tracing::warn!(peer = %addr, error = %e, "Invalid hello message");
                None
            }
        },
        Ok(Some(Ok(_))) => {
            tracing::warn!(peer = %addr, "Expected text hello, got binary");
            None
        }
        Ok(Some(Err(e))) => {
            tracing::warn!(peer = %addr, error = %e, "WS error during hello");
            None
        }
        Ok(None) => {
            tracing::debug!(peer = %addr, "Connection closed before hello");
            None
        }
        Err(_) => {
            tracing::warn!(peer = %addr, "Hello timeout ({limit:?})");
            None
        }
    }
}

/// Send a `ServerFrame` as a JSON text frame.
async fn send_frame(
    sink: &mut futures_util::stream::SplitSink<WsStream, Message>,
    frame: &ServerFrame,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = frame
        .to_json()
        .map_err(|e| tokio_tungstenite::tungstenite::Error::Io(std::io::Error::other(e)))?;
    sink.send(Message::Text(json.into())).await
}
