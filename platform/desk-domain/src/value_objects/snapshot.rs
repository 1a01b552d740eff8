use crate::value_objects::agent_status::AgentStatus;
use crate::value_objects::timestamp::TradeTimestamp;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: AgentStatus,
    pub market_hours: String,
    pub portfolio: Portfolio,
    pub holdings: Vec<Holding>,
    pub recent_trades: Vec<Trade>,
    #[serde(default)]
    pub watchlist: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings_value: f64,
    pub total_value: f64,
    pub unrealized_pl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: i64,
    pub avg_price: f64,
    pub current_price: f64,
    pub value: f64,
    pub pl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: TradeTimestamp,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: i64,
    pub price: f64,
    pub total: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum TradeAction {
    Buy,
    Sell,
    Unknown,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for TradeAction {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "BUY" => Self::Buy,
            "SELL" => Self::Sell,
            _ => Self::Unknown,
        }
    }
}

/// Body of `GET /api/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogsSnapshot {
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{StatusSnapshot, TradeAction};
    use crate::value_objects::agent_status::AgentStatus;

    #[test]
    fn parses_backend_status_body() {
        let body = r#"{
            "status": "running",
            "market_hours": "09:15:00 - 15:30:00",
            "portfolio": {"cash": 90000.0, "holdings_value": 10500.0, "total_value": 100500.0, "unrealized_pl": 500.0},
            "holdings": [{"symbol": "TCS.NS", "quantity": 3, "avg_price": 3333.33, "current_price": 3500.0, "value": 10500.0, "pl": 500.0}],
            "recent_trades": [
                {"timestamp": "2024-03-01T10:00:00", "symbol": "INFY.NS", "action": "SELL", "quantity": 5, "price": 1500.0, "total": 7500.0, "profit_loss": -120.5, "reason": "rsi overbought"},
                {"timestamp": 1709265600000, "symbol": "TCS.NS", "action": "BUY", "quantity": 3, "price": 3333.33, "total": 9999.99, "reason": "ma crossover"}
            ],
            "watchlist": ["TCS.NS", "INFY.NS"]
        }"#;
        let snapshot: StatusSnapshot = serde_json::from_str(body).expect("status body");
        assert_eq!(snapshot.status, AgentStatus::Running);
        assert_eq!(snapshot.holdings[0].quantity, 3);
        assert_eq!(snapshot.recent_trades[0].action, TradeAction::Sell);
        assert_eq!(snapshot.recent_trades[0].profit_loss, Some(-120.5));
        assert_eq!(snapshot.recent_trades[1].profit_loss, None);
        assert_eq!(snapshot.watchlist.len(), 2);
    }

    #[test]
    fn watchlist_is_optional() {
        let body = r#"{"status": "stopped", "market_hours": "x", "portfolio": {"cash": 1, "holdings_value": 0, "total_value": 1, "unrealized_pl": 0}, "holdings": [], "recent_trades": []}"#;
        let snapshot: StatusSnapshot = serde_json::from_str(body).expect("status body");
        assert!(snapshot.watchlist.is_empty());
    }

    #[test]
    fn missing_portfolio_is_a_shape_error() {
        let body = r#"{"status": "stopped", "market_hours": "x", "holdings": [], "recent_trades": []}"#;
        assert!(serde_json::from_str::<StatusSnapshot>(body).is_err());
    }
}
