//! Configuration structures.

use serde::{Deserialize, Serialize};
use traderd_core::types::Timeframe;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub backtest: BacktestSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "traderd".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Gateway selection and bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// "mt5" or "simulated"
    pub kind: String,
    pub bridge_url: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            kind: "mt5".to_string(),
            bridge_url: "http://127.0.0.1:6542".to_string(),
        }
    }
}

/// Trading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSettings {
    /// Symbols served by default from the prices endpoint
    pub symbols: Vec<String>,
    pub default_timeframe: Timeframe,
    pub risk_per_trade: f64,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbols: vec![
                "EURUSD".to_string(),
                "GBPUSD".to_string(),
                "USDJPY".to_string(),
                "AUDUSD".to_string(),
                "XAUUSD".to_string(),
                "BTCUSD".to_string(),
                "ETHUSD".to_string(),
            ],
            default_timeframe: Timeframe::M15,
            risk_per_trade: 0.02,
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSettings {
    pub default_capital: f64,
    pub default_period: String,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            default_capital: 10_000.0,
            default_period: "30d".to_string(),
        }
    }
}
