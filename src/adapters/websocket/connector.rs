//! WebSocket connector backed by tokio-tungstenite.

use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use crate::ports::{Connector, Socket, TransportError};

/// Opens real WebSocket connections (`ws://` or `wss://`).
///
/// Only text frames carry envelopes. Ping/pong is answered by tungstenite
/// itself; binary frames are logged and skipped; a close frame ends the
/// stream.
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &Url) -> Result<Socket, TransportError> {
        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(map_ws_error)
            .with(|frame: String| future::ok::<_, TransportError>(Message::Text(frame.into())));

        let stream = read
            .take_while(|item| future::ready(!matches!(item, Ok(Message::Close(_)))))
            .filter_map(|item| {
                future::ready(match item {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                    Ok(Message::Binary(bytes)) => {
                        tracing::warn!(len = bytes.len(), "Ignoring binary frame");
                        None
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(map_ws_error(e))),
                })
            });

        Ok(Socket::new(Box::pin(sink), stream.boxed()))
    }
}

fn map_ws_error(error: tungstenite::Error) -> TransportError {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        other => TransportError::Protocol(other.to_string()),
    }
}
