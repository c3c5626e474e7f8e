//! Integration tests for the reconnecting stream merger.

use super::test_utils::*;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use marketlens::error::{Error, Result};
use marketlens::models::market::Ticker;
use marketlens::realtime::{
    ConnectionState, LiveSnapshot, MessageStream, RealtimeMerger, ReconnectTimer, StreamConnector,
};
use marketlens::services::websocket::WebSocketService;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

type Session = Result<Vec<Result<String>>>;

/// Replays scripted sessions; once exhausted, connects to a silent stream.
struct ScriptedConnector {
    sessions: Mutex<VecDeque<Session>>,
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    async fn connect(&self) -> Result<MessageStream> {
        let next = self.sessions.lock().unwrap().pop_front();
        match next {
            Some(Ok(frames)) => Ok(stream::iter(frames).boxed()),
            Some(Err(e)) => Err(e),
            None => Ok(stream::pending::<Result<String>>().boxed()),
        }
    }
}

#[derive(Default)]
struct RecordingTimer {
    waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl ReconnectTimer for RecordingTimer {
    async fn wait(&self, delay: Duration) {
        self.waits.lock().unwrap().push(delay);
    }
}

fn ticker(symbol: &str, price: f64) -> Ticker {
    Ticker {
        id: symbol.to_string(),
        symbol: symbol.to_string(),
        name: symbol.to_uppercase(),
        current_price_usd: price,
        current_price_local: price * 1350.0,
        price_change_percentage_24h: 0.0,
        volume_24h: 1.0,
        quote_volume: price,
    }
}

fn frame(symbol: &str, close: &str, open: &str) -> String {
    json!([{"e": "24hrMiniTicker", "E": 1, "s": symbol, "c": close, "o": open, "h": close, "l": open, "v": "10", "q": "1000"}])
        .to_string()
}

async fn merger_with(sessions: Vec<Session>) -> (Arc<RealtimeMerger>, Arc<LiveSnapshot>, Arc<RecordingTimer>) {
    let rates = MockServer::start().await;
    mock_exchange_rate(&rates, 1000.0).await;
    let rate_service = rate_service(&rates);
    rate_service.get_rate().await;

    let live = Arc::new(LiveSnapshot::new("USDT"));
    live.replace(vec![ticker("btc", 50_000.0), ticker("eth", 3_000.0)]).await;

    let timer = Arc::new(RecordingTimer::default());
    let merger = RealtimeMerger::new(
        Arc::new(ScriptedConnector {
            sessions: Mutex::new(sessions.into()),
        }),
        live.clone(),
        rate_service,
        Duration::from_secs(3),
    )
    .with_timer(timer.clone());
    (Arc::new(merger), live, timer)
}

async fn wait_for_waits(timer: &RecordingTimer, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while timer.waits.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("reconnect loop did not progress");
}

#[tokio::test]
async fn stream_batches_patch_snapshot_and_reconnect() {
    let (merger, live, timer) = merger_with(vec![
        Ok(vec![
            Ok(frame("BTCUSDT", "51000", "50000")),
            Ok(frame("DOGEUSDT", "0.2", "0.1")),
            Err(Error::StreamDisconnected("reset by peer".into())),
        ]),
        Err(Error::StreamDisconnected("connection refused".into())),
    ])
    .await;

    let mut status = merger.subscribe_status();
    let runner = merger.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    wait_for_waits(&timer, 2).await;
    tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .expect("status never reached connected")
        .unwrap();
    handle.abort();

    assert_eq!(*timer.waits.lock().unwrap(), vec![Duration::from_secs(3); 2]);

    let tickers = live.tickers().await;
    assert_eq!(tickers.len(), 2);
    assert_eq!(tickers[0].current_price_usd, 51_000.0);
    assert_eq!(tickers[0].current_price_local, 51_000_000.0);
    assert_eq!(tickers[0].quote_volume, 1000.0);
    assert_eq!(tickers[0].price_change_percentage_24h, 0.0);
    assert_eq!(tickers[1], ticker("eth", 3_000.0));
}

#[tokio::test]
async fn garbage_frames_are_ignored() {
    let (merger, live, _timer) = merger_with(vec![]).await;
    let before = live.tickers().await;

    assert_eq!(merger.handle_message("not json").await, 0);
    assert_eq!(merger.handle_message(r#"{"result":null}"#).await, 0);
    assert_eq!(live.tickers().await, before);

    assert_eq!(merger.handle_message(&frame("ETHUSDT", "3300", "3000")).await, 1);
    assert_eq!(live.tickers().await[1].current_price_usd, 3300.0);
}

#[tokio::test]
async fn websocket_service_start_is_idempotent() {
    let rates = MockServer::start().await;
    mock_exchange_rate(&rates, 1000.0).await;
    let merger = RealtimeMerger::new(
        Arc::new(ScriptedConnector {
            sessions: Mutex::new(VecDeque::new()),
        }),
        Arc::new(LiveSnapshot::new("USDT")),
        rate_service(&rates),
        Duration::from_secs(3),
    );
    let service = WebSocketService::new(merger);

    assert!(!service.is_running().await);
    service.start().await;
    service.start().await;
    assert!(service.is_running().await);

    let mut status = service.merger().subscribe_status();
    tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| *s == ConnectionState::Connected))
        .await
        .expect("status never reached connected")
        .unwrap();
    assert_eq!(service.status(), ConnectionState::Connected);

    service.stop().await;
    assert!(!service.is_running().await);
}

#[tokio::test]
async fn status_reporter_runs_until_aborted() {
    let (merger, live, _timer) = merger_with(vec![]).await;
    let service = WebSocketService::new(Arc::try_unwrap(merger).ok().unwrap());

    let reporter = service.spawn_status_reporter(Duration::from_millis(5), 1);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!reporter.is_finished());
    assert_eq!(live.tickers().await.len(), 2);

    reporter.abort();
    assert!(reporter.await.unwrap_err().is_cancelled());
}
