//! Local echo server for exercising the demo client
//!
//! Echoes every text and binary frame back to the sender; a `hello`
//! additionally receives an `ack`. Binds ws://127.0.0.1:9001 to match the
//! demo client's default target.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use wirelink::{parse_message, serialize_message, MessageType, Message as WireMessage};

const BIND_ADDR: &str = "127.0.0.1:9001";

#[tokio::main]
async fn main() -> Result<()> {
    wirelink_client::init_tracing();

    let listener = TcpListener::bind(BIND_ADDR)
        .await
        .with_context(|| format!("failed to bind {BIND_ADDR}"))?;
    info!("Echo server listening on ws://{}", BIND_ADDR);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Client connected: {}", peer);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                warn!("Connection ended with error: {}", e);
            }
            info!("Client disconnected: {}", peer);
        });
    }
}

async fn handle_connection(stream: TcpStream) -> Result<()> {
    let ws_stream = accept_async(stream).await.context("handshake failed")?;
    let (mut write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                error!("Read error: {}", e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let msg = parse_message(&text);
                info!(
                    "Received {} (id={:?}), echoing",
                    msg.message_type.label(),
                    msg.msg_id
                );
                write.send(Message::Text(text)).await?;

                if msg.message_type == MessageType::Hello {
                    let ack = WireMessage::with_content(
                        MessageType::Acknowledge,
                        format!("ack_{}", msg.msg_id),
                        "hello received",
                    );
                    write.send(Message::Text(serialize_message(&ack))).await?;
                }
            }
            Message::Binary(data) => {
                info!("Echoing {} binary bytes", data.len());
                write.send(Message::Binary(data)).await?;
            }
            Message::Ping(payload) => {
                write.send(Message::Pong(payload)).await?;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}
