//! Subscription polling.
//!
//! Each subscribed symbol runs an independent polling task that fetches the
//! latest bars from the gateway, deduplicates them by timestamp, and sends
//! every newly observed bar close down an mpsc channel exactly once. Tasks
//! suspend during the wait interval and during gateway calls, so symbols
//! never block each other.
//!
//! Cancellation is cooperative: removing a symbol from the subscribed set
//! makes its task exit at the next wake-up, bounded by the poll interval.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use traderd_core::traits::MarketGateway;
use traderd_core::types::{BarEvent, TickEvent, Timeframe};

/// Polling cadence settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Bar poll interval; None polls at half the timeframe duration
    pub poll_interval: Option<Duration>,
    /// Wait after a failed bar fetch before retrying
    pub error_backoff: Duration,
    /// Tick poll interval
    pub tick_interval: Duration,
    /// Wait after a failed tick fetch before retrying
    pub tick_error_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: None,
            error_backoff: Duration::from_secs(5),
            tick_interval: Duration::from_millis(100),
            tick_error_backoff: Duration::from_secs(1),
        }
    }
}

/// Subscribed-symbol set plus the polling tasks it controls.
#[derive(Clone)]
pub struct Subscriptions {
    gateway: Arc<dyn MarketGateway>,
    subscribed: Arc<RwLock<HashSet<String>>>,
    bar_tx: mpsc::Sender<BarEvent>,
    config: PollerConfig,
}

impl Subscriptions {
    /// Create a subscription manager emitting bar events into `bar_tx`.
    pub fn new(gateway: Arc<dyn MarketGateway>, bar_tx: mpsc::Sender<BarEvent>) -> Self {
        Self::with_config(gateway, bar_tx, PollerConfig::default())
    }

    /// Create with explicit polling cadence (used by tests).
    pub fn with_config(
        gateway: Arc<dyn MarketGateway>,
        bar_tx: mpsc::Sender<BarEvent>,
        config: PollerConfig,
    ) -> Self {
        Self {
            gateway,
            subscribed: Arc::new(RwLock::new(HashSet::new())),
            bar_tx,
            config,
        }
    }

    /// Start polling bars for a symbol.
    ///
    /// Returns false without starting a second task when the symbol is
    /// already subscribed. The first poll emits the latest already-closed
    /// bar; afterwards only strictly newer bars are emitted.
    pub async fn subscribe(&self, symbol: &str, timeframe: Timeframe) -> bool {
        if !self.subscribed.write().await.insert(symbol.to_string()) {
            return false;
        }

        let poll_interval = self
            .config
            .poll_interval
            .unwrap_or_else(|| timeframe.as_duration() / 2);

        tokio::spawn(poll_bars(
            self.gateway.clone(),
            self.subscribed.clone(),
            self.bar_tx.clone(),
            symbol.to_string(),
            timeframe,
            poll_interval,
            self.config.error_backoff,
        ));

        info!(symbol, %timeframe, "subscribed to bars");
        true
    }

    /// Start polling ticks for a symbol, emitting into `tick_tx`.
    ///
    /// Tick polling shares the subscribed set with bar polling, so an
    /// unsubscribe stops both.
    pub async fn subscribe_ticks(&self, symbol: &str, tick_tx: mpsc::Sender<TickEvent>) {
        self.subscribed.write().await.insert(symbol.to_string());

        tokio::spawn(poll_ticks(
            self.gateway.clone(),
            self.subscribed.clone(),
            tick_tx,
            symbol.to_string(),
            self.config.tick_interval,
            self.config.tick_error_backoff,
        ));

        info!(symbol, "subscribed to ticks");
    }

    /// Stop polling a symbol. Returns true if it was subscribed.
    ///
    /// The polling task observes the removal at its next wake-up.
    pub async fn unsubscribe(&self, symbol: &str) -> bool {
        let removed = self.subscribed.write().await.remove(symbol);
        if removed {
            info!(symbol, "unsubscribed");
        }
        removed
    }

    /// Whether a symbol is currently subscribed.
    pub async fn is_subscribed(&self, symbol: &str) -> bool {
        self.subscribed.read().await.contains(symbol)
    }

    /// Currently subscribed symbols.
    pub async fn symbols(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    /// Number of subscribed symbols.
    pub async fn count(&self) -> usize {
        self.subscribed.read().await.len()
    }
}

async fn poll_bars(
    gateway: Arc<dyn MarketGateway>,
    subscribed: Arc<RwLock<HashSet<String>>>,
    tx: mpsc::Sender<BarEvent>,
    symbol: String,
    timeframe: Timeframe,
    poll_interval: Duration,
    error_backoff: Duration,
) {
    let mut last_seen: Option<i64> = None;

    loop {
        if !subscribed.read().await.contains(&symbol) {
            break;
        }

        match gateway.historical_bars(&symbol, timeframe, 2).await {
            Ok(bars) => {
                if let Some(latest) = bars.last() {
                    if last_seen.map_or(true, |seen| latest.timestamp > seen) {
                        last_seen = Some(latest.timestamp);
                        let event = BarEvent {
                            symbol: symbol.clone(),
                            timeframe,
                            bar: *latest,
                        };
                        if tx.send(event).await.is_err() {
                            // Consumer gone; nothing left to feed
                            break;
                        }
                    }
                }
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) => {
                warn!(symbol, error = %e, "bar fetch failed, backing off");
                tokio::time::sleep(error_backoff).await;
            }
        }
    }

    debug!(symbol, "bar polling task stopped");
}

async fn poll_ticks(
    gateway: Arc<dyn MarketGateway>,
    subscribed: Arc<RwLock<HashSet<String>>>,
    tx: mpsc::Sender<TickEvent>,
    symbol: String,
    tick_interval: Duration,
    error_backoff: Duration,
) {
    let mut last_seen: Option<chrono::DateTime<chrono::Utc>> = None;
    let symbols = vec![symbol.clone()];

    loop {
        if !subscribed.read().await.contains(&symbol) {
            break;
        }

        match gateway.current_ticks(&symbols).await {
            Ok(ticks) => {
                if let Some(tick) = ticks.get(&symbol) {
                    if last_seen.map_or(true, |seen| tick.time > seen) {
                        last_seen = Some(tick.time);
                        let event = TickEvent {
                            symbol: symbol.clone(),
                            tick: tick.clone(),
                        };
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
                tokio::time::sleep(tick_interval).await;
            }
            Err(e) => {
                warn!(symbol, error = %e, "tick fetch failed, backing off");
                tokio::time::sleep(error_backoff).await;
            }
        }
    }

    debug!(symbol, "tick polling task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::timeout;
    use traderd_core::error::GatewayError;
    use traderd_core::types::{
        AccountSnapshot, Bar, OpenPosition, OrderAck, PriceTick, Side,
    };

    struct FakeGateway {
        bars: Mutex<Vec<Bar>>,
        fail_first: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl FakeGateway {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                bars: Mutex::new(Vec::new()),
                fail_first: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
            })
        }

        fn failing_first(n: usize) -> Arc<Self> {
            let gateway = Self::new();
            gateway.fail_first.store(n, Ordering::SeqCst);
            gateway
        }

        fn push_bar(&self, timestamp: i64, close: f64) {
            self.bars
                .lock()
                .unwrap()
                .push(Bar::new(timestamp, close, close, close, close, 1.0));
        }
    }

    #[async_trait]
    impl MarketGateway for FakeGateway {
        async fn connect(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn historical_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            count: usize,
        ) -> Result<Vec<Bar>, GatewayError> {
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
            if fetch < self.fail_first.load(Ordering::SeqCst) {
                return Err(GatewayError::Network("transient".to_string()));
            }

            let bars = self.bars.lock().unwrap();
            let start = bars.len().saturating_sub(count);
            Ok(bars[start..].to_vec())
        }

        async fn current_ticks(
            &self,
            symbols: &[String],
        ) -> Result<HashMap<String, PriceTick>, GatewayError> {
            let bars = self.bars.lock().unwrap();
            let mut ticks = HashMap::new();
            if let Some(last) = bars.last() {
                for symbol in symbols {
                    ticks.insert(
                        symbol.clone(),
                        PriceTick {
                            bid: last.close,
                            ask: last.close + 0.0002,
                            last: last.close,
                            volume: 1.0,
                            time: last.datetime(),
                        },
                    );
                }
            }
            Ok(ticks)
        }

        async fn account_info(&self) -> Result<AccountSnapshot, GatewayError> {
            Ok(AccountSnapshot {
                login: 1,
                server: "fake".to_string(),
                balance: dec!(1000),
                equity: dec!(1000),
                margin: dec!(0),
                free_margin: dec!(1000),
                margin_level: 0.0,
                profit: dec!(0),
                leverage: 100,
                currency: "USD".to_string(),
            })
        }

        async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError> {
            Ok(vec![])
        }

        async fn submit_market_order(
            &self,
            symbol: &str,
            side: Side,
            volume: Decimal,
        ) -> Result<OrderAck, GatewayError> {
            Ok(OrderAck {
                order_id: "1".to_string(),
                symbol: symbol.to_string(),
                side,
                volume,
                price: 1.0,
                time: Utc::now(),
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn fast_config() -> PollerConfig {
        PollerConfig {
            poll_interval: Some(Duration::from_millis(5)),
            error_backoff: Duration::from_millis(5),
            tick_interval: Duration::from_millis(5),
            tick_error_backoff: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_emits_each_new_bar_exactly_once() {
        let gateway = FakeGateway::new();
        gateway.push_bar(1, 1.10);

        let (tx, mut rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway.clone(), tx, fast_config());
        assert!(subs.subscribe("EURUSD", Timeframe::M15).await);

        let first = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.bar.timestamp, 1);

        // Same bar keeps getting fetched but is never re-emitted
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());

        gateway.push_bar(2, 1.11);
        let second = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.bar.timestamp, 2);
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_is_rejected() {
        let gateway = FakeGateway::new();
        let (tx, _rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway, tx, fast_config());

        assert!(subs.subscribe("EURUSD", Timeframe::M15).await);
        assert!(!subs.subscribe("EURUSD", Timeframe::M15).await);
        assert_eq!(subs.count().await, 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_events_within_interval() {
        let gateway = FakeGateway::new();
        gateway.push_bar(1, 1.10);

        let (tx, mut rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway.clone(), tx, fast_config());
        subs.subscribe("EURUSD", Timeframe::M15).await;

        timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        assert!(subs.unsubscribe("EURUSD").await);
        assert!(!subs.is_subscribed("EURUSD").await);

        // Give the task a few intervals to observe the removal, then
        // publish a new bar; it must not be delivered
        tokio::time::sleep(Duration::from_millis(50)).await;
        gateway.push_bar(2, 1.11);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_resubscribe_starts_from_latest_bar() {
        let gateway = FakeGateway::new();
        gateway.push_bar(1, 1.10);

        let (tx, mut rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway.clone(), tx, fast_config());
        subs.subscribe("EURUSD", Timeframe::M15).await;
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        subs.unsubscribe("EURUSD").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Bars 2 and 3 close while unsubscribed; only the latest is seen
        gateway.push_bar(2, 1.11);
        gateway.push_bar(3, 1.12);

        subs.subscribe("EURUSD", Timeframe::M15).await;
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.bar.timestamp, 3);
    }

    #[tokio::test]
    async fn test_fetch_errors_back_off_and_recover() {
        let gateway = FakeGateway::failing_first(3);
        gateway.push_bar(1, 1.10);

        let (tx, mut rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway.clone(), tx, fast_config());
        subs.subscribe("EURUSD", Timeframe::M15).await;

        // The poller survives the failures and emits once fetches succeed
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.bar.timestamp, 1);
        assert!(gateway.fetches.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_tick_polling_dedupes_by_time() {
        let gateway = FakeGateway::new();
        gateway.push_bar(1_000, 1.10);

        let (bar_tx, _bar_rx) = mpsc::channel(16);
        let (tick_tx, mut tick_rx) = mpsc::channel(16);
        let subs = Subscriptions::with_config(gateway.clone(), bar_tx, fast_config());
        subs.subscribe_ticks("EURUSD", tick_tx).await;

        let first = timeout(Duration::from_secs(1), tick_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!((first.tick.last - 1.10).abs() < 1e-9);

        // No new tick time, no new event
        assert!(timeout(Duration::from_millis(100), tick_rx.recv())
            .await
            .is_err());

        gateway.push_bar(2_000, 1.12);
        let second = timeout(Duration::from_secs(1), tick_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!((second.tick.last - 1.12).abs() < 1e-9);
    }
}
