//! WebSocket connector for the Binance aggregate mini-ticker stream.

use crate::error::{Error, Result};
use crate::realtime::{MessageStream, StreamConnector};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

pub struct BinanceStreamConnector {
    url: String,
}

impl BinanceStreamConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamConnector for BinanceStreamConnector {
    async fn connect(&self) -> Result<MessageStream> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::StreamDisconnected(format!("invalid stream url {}: {}", self.url, e)))?;
        let (socket, _response) = connect_async(url.as_str()).await?;
        debug!(url = %url, "Ticker stream socket opened");

        let messages = socket.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Close(reason)) => Some(Err(Error::StreamDisconnected(format!(
                    "server closed the stream: {:?}",
                    reason
                )))),
                Ok(_) => None,
                Err(e) => Some(Err(Error::from(e))),
            }
        });

        Ok(messages.boxed())
    }
}
