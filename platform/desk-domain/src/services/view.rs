//! Pure view models. Each successful poll builds a complete view that replaces
//! the previous one; adapters (terminal, HTML) only bind them to regions.

use crate::services::format::{format_inr_fixed, format_inr_grouped, Tone};
use crate::value_objects::agent_status::{AgentStatus, ControlButtons};
use crate::value_objects::snapshot::{
    Holding, LogsSnapshot, Portfolio, StatusSnapshot, Trade, TradeAction,
};
use crate::value_objects::timestamp::ClockZone;
use serde::Serialize;

pub const HOLDINGS_COLUMNS: [&str; 6] = ["Symbol", "Qty", "Avg Price", "Current", "Value", "P/L"];
pub const TRADES_COLUMNS: [&str; 7] = [
    "Time", "Symbol", "Action", "Qty", "Price", "Total", "Reason",
];
pub const EMPTY_HOLDINGS_TEXT: &str = "No holdings";
pub const EMPTY_TRADES_TEXT: &str = "No trades yet";
pub const EMPTY_CLASS: &str = "empty";
pub const INVALID_TIME_TEXT: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSettings {
    pub zone: ClockZone,
    pub time_format: String,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            zone: ClockZone::Local,
            time_format: "%H:%M:%S".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Normal,
    Strong,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    pub tone: Option<Tone>,
    pub emphasis: Emphasis,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
            emphasis: Emphasis::Normal,
        }
    }

    fn strong(text: impl Into<String>) -> Self {
        Self {
            emphasis: Emphasis::Strong,
            ..Self::plain(text)
        }
    }

    fn muted(text: impl Into<String>) -> Self {
        Self {
            emphasis: Emphasis::Muted,
            ..Self::plain(text)
        }
    }

    fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            tone: Some(tone),
            ..Self::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Realized P/L reported on SELL trades; not one of the table columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized: Option<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableBody {
    Placeholder {
        colspan: usize,
        text: String,
        class: String,
    },
    Rows { rows: Vec<Row> },
}

impl TableBody {
    fn placeholder(colspan: usize, text: &str) -> Self {
        Self::Placeholder {
            colspan,
            text: text.to_string(),
            class: EMPTY_CLASS.to_string(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Placeholder { .. } => 1,
            Self::Rows { rows } => rows.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioView {
    pub cash: Cell,
    pub holdings_value: Cell,
    pub total_value: Cell,
    pub unrealized_pl: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeView {
    pub text: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub status: AgentStatus,
    pub badge: BadgeView,
    pub controls: ControlButtons,
    pub market_hours: String,
    pub portfolio: PortfolioView,
    pub holdings: TableBody,
    pub trades: TableBody,
    pub watchlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LogView {
    pub lines: Vec<String>,
}

pub fn build_status_view(snapshot: &StatusSnapshot, clock: &ClockSettings) -> StatusView {
    StatusView {
        status: snapshot.status,
        badge: BadgeView {
            text: snapshot.status.badge_text().to_string(),
            class: snapshot.status.badge_class(),
        },
        controls: snapshot.status.controls(),
        market_hours: format!("Market: {}", snapshot.market_hours),
        portfolio: build_portfolio_view(&snapshot.portfolio),
        holdings: build_holdings_body(&snapshot.holdings),
        trades: build_trades_body(&snapshot.recent_trades, clock),
        watchlist: snapshot.watchlist.clone(),
    }
}

pub fn build_portfolio_view(portfolio: &Portfolio) -> PortfolioView {
    PortfolioView {
        cash: Cell::plain(format_inr_grouped(portfolio.cash)),
        holdings_value: Cell::plain(format_inr_grouped(portfolio.holdings_value)),
        total_value: Cell::plain(format_inr_grouped(portfolio.total_value)),
        unrealized_pl: Cell::toned(
            format_inr_grouped(portfolio.unrealized_pl),
            Tone::of(portfolio.unrealized_pl),
        ),
    }
}

pub fn build_holdings_body(holdings: &[Holding]) -> TableBody {
    if holdings.is_empty() {
        return TableBody::placeholder(HOLDINGS_COLUMNS.len(), EMPTY_HOLDINGS_TEXT);
    }
    let rows = holdings
        .iter()
        .map(|h| Row {
            cells: vec![
                Cell::strong(h.symbol.clone()),
                Cell::plain(h.quantity.to_string()),
                Cell::plain(format_inr_fixed(h.avg_price)),
                Cell::plain(format_inr_fixed(h.current_price)),
                Cell::plain(format_inr_fixed(h.value)),
                Cell::toned(format_inr_fixed(h.pl), Tone::of(h.pl)),
            ],
            realized: None,
        })
        .collect();
    TableBody::Rows { rows }
}

/// Keeps the backend's ordering (most recent first).
pub fn build_trades_body(trades: &[Trade], clock: &ClockSettings) -> TableBody {
    if trades.is_empty() {
        return TableBody::placeholder(TRADES_COLUMNS.len(), EMPTY_TRADES_TEXT);
    }
    let rows = trades.iter().map(|t| trade_row(t, clock)).collect();
    TableBody::Rows { rows }
}

fn trade_row(trade: &Trade, clock: &ClockSettings) -> Row {
    let time = trade
        .timestamp
        .resolve(&clock.zone)
        .map(|instant| clock.zone.format(instant, &clock.time_format))
        .unwrap_or_else(|| INVALID_TIME_TEXT.to_string());
    let action_tone = match trade.action {
        TradeAction::Buy => Tone::Positive,
        TradeAction::Sell | TradeAction::Unknown => Tone::Negative,
    };
    Row {
        cells: vec![
            Cell::plain(time),
            Cell::strong(trade.symbol.clone()),
            Cell::toned(trade.action.as_str(), action_tone),
            Cell::plain(trade.quantity.to_string()),
            Cell::plain(format_inr_fixed(trade.price)),
            Cell::plain(format_inr_fixed(trade.total)),
            Cell::muted(trade.reason.clone()),
        ],
        realized: trade
            .profit_loss
            .map(|pl| Cell::toned(format_inr_fixed(pl), Tone::of(pl))),
    }
}

/// Lines are kept verbatim and in the order received.
pub fn build_log_view(snapshot: &LogsSnapshot) -> LogView {
    LogView {
        lines: snapshot.logs.clone(),
    }
}
