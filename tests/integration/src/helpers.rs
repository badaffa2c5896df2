//! Test helpers for gateway integration tests
//!
//! Spawns the real axum server on an ephemeral port and provides a thin
//! WebSocket client speaking the gateway's frame and event formats.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use parley_common::SessionTokens;
use parley_core::Snowflake;
use parley_gateway::protocol::{ClientFrame, ServerEvent};
use parley_gateway::{create_app, GatewayState};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fakes::FakeStore;

/// How long to wait for an expected event before failing the test
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait when asserting that nothing arrives
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// A running gateway over an in-memory store
///
/// `state` is the same state the server runs on, so tests can emit domain
/// events through `state.handle()` the way REST services would.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub tokens: Arc<SessionTokens>,
    pub store: Arc<FakeStore>,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway server backed by the given store
    pub async fn start(store: Arc<FakeStore>) -> Result<Self> {
        let tokens = Arc::new(SessionTokens::new("integration-test-secret", 3600));
        let state = GatewayState::new(
            store.clone(),
            store.clone(),
            store.clone(),
            tokens.clone(),
        );
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            tokens,
            store,
            state,
            _handle: handle,
        })
    }

    /// Connect as a seeded user, consuming the `hello` event
    pub async fn connect(&self, user_id: i64) -> Result<WsClient> {
        let token = self
            .tokens
            .issue(Snowflake::new(user_id))
            .context("issuing test token")?;
        let mut client = self.connect_raw(&token).await?;

        let hello = client.recv_event().await?;
        if hello.t != "hello" {
            bail!("expected hello, got {}", hello.t);
        }

        Ok(client)
    }

    /// Attempt a handshake with an arbitrary token string
    pub async fn connect_raw(&self, token: &str) -> Result<WsClient> {
        let url = format!("ws://{}/gateway?token={}", self.addr, token);
        let (ws, _) = connect_async(url).await.context("WebSocket handshake")?;
        Ok(WsClient { ws })
    }

    /// Attempt a handshake with no token at all
    pub async fn connect_unauthenticated(&self) -> Result<WsClient> {
        let url = format!("ws://{}/gateway", self.addr);
        let (ws, _) = connect_async(url).await.context("WebSocket handshake")?;
        Ok(WsClient { ws })
    }
}

/// WebSocket client speaking the gateway protocol
pub struct WsClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send a frame
    pub async fn send(&mut self, frame: &ClientFrame) -> Result<()> {
        let json = frame.to_json()?;
        self.ws.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Send raw text, for malformed-frame tests
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Receive the next event, failing after a timeout
    pub async fn recv_event(&mut self) -> Result<ServerEvent> {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for event")?
                .context("connection closed")??;

            match msg {
                Message::Text(text) => {
                    return serde_json::from_str(&text).context("decoding event");
                }
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(_) => bail!("connection closed by server"),
                other => bail!("unexpected message: {other:?}"),
            }
        }
    }

    /// Receive events until one with the given name arrives
    pub async fn expect_event(&mut self, name: &str) -> Result<ServerEvent> {
        loop {
            let event = self.recv_event().await?;
            if event.t == name {
                return Ok(event);
            }
        }
    }

    /// Receive events until one matches both name and payload
    ///
    /// Presence toggles from earlier connects interleave with whatever a test
    /// is waiting for; matching on the payload skips the stale ones.
    pub async fn expect_event_matching(
        &mut self,
        name: &str,
        data: &serde_json::Value,
    ) -> Result<ServerEvent> {
        loop {
            let event = self.recv_event().await?;
            if event.t == name && event.d == *data {
                return Ok(event);
            }
        }
    }

    /// Assert that no event arrives within a short window
    pub async fn expect_silence(&mut self) -> Result<()> {
        match timeout(SILENCE_WINDOW, self.ws.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("expected silence, got: {text}"),
            Ok(Some(Ok(_))) => Ok(()),
            Ok(Some(Err(e))) => bail!("connection error: {e}"),
            Ok(None) => bail!("connection closed"),
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
