//! Strategy dispatch over the bar event channel.
//!
//! A single consumer task drains the subscription poller's channel and
//! forwards each event to the strategy registered for its symbol, so bar
//! handling within one symbol is strictly ordered by observation time.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use traderd_core::types::BarEvent;

use crate::technical::{StrategyState, TechnicalStrategy};

/// Owns the per-symbol strategy instances and drives them from bar events.
#[derive(Clone, Default)]
pub struct StrategyRunner {
    strategies: Arc<RwLock<HashMap<String, TechnicalStrategy>>>,
}

impl StrategyRunner {
    /// Create an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy for a symbol, replacing any previous one.
    pub async fn insert(&self, strategy: TechnicalStrategy) {
        let symbol = strategy.symbol().to_string();
        self.strategies.write().await.insert(symbol, strategy);
    }

    /// Remove the strategy for a symbol. Returns true if one was registered.
    pub async fn remove(&self, symbol: &str) -> bool {
        self.strategies.write().await.remove(symbol).is_some()
    }

    /// Number of registered strategies.
    pub async fn len(&self) -> usize {
        self.strategies.read().await.len()
    }

    /// Whether no strategies are registered.
    pub async fn is_empty(&self) -> bool {
        self.strategies.read().await.is_empty()
    }

    /// States of all registered strategies.
    pub async fn states(&self) -> Vec<StrategyState> {
        self.strategies
            .read()
            .await
            .values()
            .map(|s| s.state())
            .collect()
    }

    /// Drain the event channel until every sender is dropped.
    pub async fn run(self, mut events: mpsc::Receiver<BarEvent>) {
        while let Some(event) = events.recv().await {
            let mut strategies = self.strategies.write().await;
            match strategies.get_mut(&event.symbol) {
                Some(strategy) => {
                    if let Err(e) = strategy.on_bar(&event.bar).await {
                        warn!(symbol = %event.symbol, error = %e, "strategy error");
                    }
                }
                None => {
                    // Events can race an unsubscribe; nothing to do
                    continue;
                }
            }
        }
        info!("bar event channel closed, strategy runner stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use traderd_core::error::GatewayError;
    use traderd_core::traits::MarketGateway;
    use traderd_core::types::{
        AccountSnapshot, Bar, OpenPosition, OrderAck, PriceTick, Side, Timeframe,
    };

    use crate::technical::StrategyParams;

    struct NullGateway;

    #[async_trait]
    impl MarketGateway for NullGateway {
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
            _count: usize,
        ) -> Result<Vec<Bar>, GatewayError> {
            Ok(vec![])
        }

        async fn current_ticks(
            &self,
            _symbols: &[String],
        ) -> Result<std::collections::HashMap<String, PriceTick>, GatewayError> {
            Ok(std::collections::HashMap::new())
        }

        async fn account_info(&self) -> Result<AccountSnapshot, GatewayError> {
            Ok(AccountSnapshot {
                login: 1,
                server: "null".to_string(),
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
            "null"
        }
    }

    fn strategy_for(symbol: &str) -> TechnicalStrategy {
        TechnicalStrategy::new(
            symbol.to_string(),
            StrategyParams::default(),
            Arc::new(NullGateway),
        )
    }

    #[tokio::test]
    async fn test_insert_remove_counts() {
        let runner = StrategyRunner::new();
        assert!(runner.is_empty().await);

        runner.insert(strategy_for("EURUSD")).await;
        runner.insert(strategy_for("GBPUSD")).await;
        assert_eq!(runner.len().await, 2);

        assert!(runner.remove("EURUSD").await);
        assert!(!runner.remove("EURUSD").await);
        assert_eq!(runner.len().await, 1);
    }

    #[tokio::test]
    async fn test_run_dispatches_events_in_order() {
        let runner = StrategyRunner::new();
        runner.insert(strategy_for("EURUSD")).await;

        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(runner.clone().run(rx));

        for i in 0..5 {
            let close = 1.10 + i as f64 * 0.001;
            tx.send(BarEvent {
                symbol: "EURUSD".to_string(),
                timeframe: Timeframe::M15,
                bar: Bar::new(i * 900_000, close, close, close, close, 1.0),
            })
            .await
            .unwrap();
        }

        // Event for an unregistered symbol is ignored
        tx.send(BarEvent {
            symbol: "USDJPY".to_string(),
            timeframe: Timeframe::M15,
            bar: Bar::new(0, 150.0, 150.0, 150.0, 150.0, 1.0),
        })
        .await
        .unwrap();

        drop(tx);
        task.await.unwrap();

        let states = runner.states().await;
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].bars_processed, 5);
    }
}
