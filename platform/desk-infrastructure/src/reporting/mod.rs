use desk_domain::services::markup::escape_html;
use desk_domain::services::view::{
    Cell, Emphasis, LogView, Row, StatusView, TableBody, HOLDINGS_COLUMNS, TRADES_COLUMNS,
};
use desk_domain::value_objects::control::ControlAction;
use std::fs;
use std::path::Path;

/// Static HTML rendering of one dashboard snapshot. Every backend string goes
/// through `escape_html`; nothing from the view is emitted raw.
pub fn render_dashboard_html(view: &StatusView, logs: Option<&LogView>) -> String {
    let controls = ControlAction::ALL
        .iter()
        .map(|action| {
            let disabled = if view.controls.is_enabled(*action) {
                ""
            } else {
                " disabled"
            };
            format!(
                r#"<button id="{id}Btn"{disabled}>{label}</button>"#,
                id = action.as_str(),
                label = action.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ");

    let watchlist = if view.watchlist.is_empty() {
        String::new()
    } else {
        let symbols = view
            .watchlist
            .iter()
            .map(|symbol| escape_html(symbol))
            .collect::<Vec<_>>()
            .join(", ");
        format!(r#"<p class="muted">Watchlist: {symbols}</p>"#)
    };

    let log_items = logs
        .map(|logs| {
            logs.lines
                .iter()
                .map(|line| format!(r#"<div class="log-entry">{}</div>"#, escape_html(line)))
                .collect::<Vec<_>>()
                .join("\n      ")
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Agent Desk Snapshot</title>
  <style>
    body {{ font-family: ui-sans-serif, system-ui; padding: 24px; }}
    .grid {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; }}
    .card {{ border: 1px solid #ddd; border-radius: 10px; padding: 16px; background: #fff; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #eee; padding: 8px; font-size: 12px; }}
    th {{ background: #fafafa; text-align: left; }}
    .status-badge {{ padding: 2px 8px; border-radius: 6px; font-weight: 600; }}
    .running {{ background: #d1fae5; }}
    .paused {{ background: #fef3c7; }}
    .stopped {{ background: #fee2e2; }}
    .unknown {{ background: #e5e7eb; }}
    .positive {{ color: #047857; }}
    .negative {{ color: #b91c1c; }}
    .empty, .muted, .reason {{ color: #666; }}
    .log-entry {{ font-family: ui-monospace, monospace; font-size: 12px; }}
  </style>
</head>
<body>
  <h1>Agent Desk</h1>
  <p>
    <span id="statusBadge" class="{badge_class}">{badge_text}</span>
    <span id="marketHours">{market_hours}</span>
  </p>
  <p>
      {controls}
  </p>
  {watchlist}
  <div class="grid">
    <div class="card"><h3>Cash</h3><div id="cash">{cash}</div></div>
    <div class="card"><h3>Holdings Value</h3><div id="holdingsValue">{holdings_value}</div></div>
    <div class="card"><h3>Total Value</h3><div id="totalValue">{total_value}</div></div>
    <div class="card"><h3>Unrealized P/L</h3><div id="unrealizedPL">{unrealized_pl}</div></div>
  </div>

  <h2>Holdings</h2>
  <table>
    <thead><tr>{holdings_head}</tr></thead>
    <tbody id="holdingsTable">
      {holdings_body}
    </tbody>
  </table>

  <h2>Recent Trades</h2>
  <table>
    <thead><tr>{trades_head}</tr></thead>
    <tbody id="tradesTable">
      {trades_body}
    </tbody>
  </table>

  <h2>Logs</h2>
  <div id="logsContainer">
      {log_items}
  </div>
</body>
</html>
"#,
        badge_class = escape_html(&view.badge.class),
        badge_text = escape_html(&view.badge.text),
        market_hours = escape_html(&view.market_hours),
        cash = render_cell_inline(&view.portfolio.cash),
        holdings_value = render_cell_inline(&view.portfolio.holdings_value),
        total_value = render_cell_inline(&view.portfolio.total_value),
        unrealized_pl = render_cell_inline(&view.portfolio.unrealized_pl),
        holdings_head = render_head(&HOLDINGS_COLUMNS),
        holdings_body = render_body(&view.holdings),
        trades_head = render_head(&TRADES_COLUMNS),
        trades_body = render_body(&view.trades),
    )
}

pub fn write_dashboard_html(
    path: &Path,
    view: &StatusView,
    logs: Option<&LogView>,
) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
    }
    fs::write(path, render_dashboard_html(view, logs))
        .map_err(|err| format!("failed to write dashboard html {}: {err}", path.display()))
}

fn render_head(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|name| format!("<th>{}</th>", escape_html(name)))
        .collect::<String>()
}

fn render_body(body: &TableBody) -> String {
    match body {
        TableBody::Placeholder {
            colspan,
            text,
            class,
        } => format!(
            r#"<tr><td colspan="{colspan}" class="{}">{}</td></tr>"#,
            escape_html(class),
            escape_html(text)
        ),
        TableBody::Rows { rows } => rows
            .iter()
            .map(render_row)
            .collect::<Vec<_>>()
            .join("\n      "),
    }
}

fn render_row(row: &Row) -> String {
    let mut cells = row.cells.iter().map(render_td).collect::<String>();
    if let Some(realized) = &row.realized {
        cells.push_str(&format!(
            r#"<td class="realized {}">{}</td>"#,
            cell_class(realized),
            render_cell_text(realized)
        ));
    }
    format!("<tr>{cells}</tr>")
}

fn render_td(cell: &Cell) -> String {
    match cell_class(cell) {
        "" => format!("<td>{}</td>", render_cell_text(cell)),
        class => format!(r#"<td class="{class}">{}</td>"#, render_cell_text(cell)),
    }
}

fn cell_class(cell: &Cell) -> &'static str {
    match (cell.tone, cell.emphasis) {
        (Some(tone), _) => tone.class_name(),
        (None, Emphasis::Muted) => "reason",
        _ => "",
    }
}

fn render_cell_text(cell: &Cell) -> String {
    let text = escape_html(&cell.text);
    match cell.emphasis {
        Emphasis::Strong => format!("<strong>{text}</strong>"),
        Emphasis::Normal | Emphasis::Muted => text,
    }
}

/// Standalone value outside a table; the tone becomes a span class.
fn render_cell_inline(cell: &Cell) -> String {
    match cell.tone {
        Some(tone) => format!(
            r#"<span class="{}">{}</span>"#,
            tone.class_name(),
            render_cell_text(cell)
        ),
        None => render_cell_text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_dashboard_html, write_dashboard_html};
    use desk_domain::services::view::{build_status_view, ClockSettings, LogView};
    use desk_domain::value_objects::agent_status::AgentStatus;
    use desk_domain::value_objects::snapshot::{
        Holding, Portfolio, StatusSnapshot, Trade, TradeAction,
    };
    use desk_domain::value_objects::timestamp::{ClockZone, TradeTimestamp};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("desk_{prefix}_{}_{}", std::process::id(), now))
    }

    fn clock() -> ClockSettings {
        ClockSettings {
            zone: ClockZone::from_offset_minutes(Some(0)).expect("offset"),
            time_format: "%H:%M:%S".to_string(),
        }
    }

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            status: AgentStatus::Running,
            market_hours: "09:15:00 - 15:30:00".to_string(),
            portfolio: Portfolio {
                cash: 1234567.5,
                holdings_value: 7000.0,
                total_value: 1241567.5,
                unrealized_pl: -250.0,
            },
            holdings: vec![Holding {
                symbol: "<script>alert(1)</script>".to_string(),
                quantity: 2,
                avg_price: 3400.0,
                current_price: 3500.0,
                value: 7000.0,
                pl: 200.0,
            }],
            recent_trades: vec![Trade {
                timestamp: TradeTimestamp::Text("2026-01-05T10:15:00Z".to_string()),
                symbol: "TCS.NS".to_string(),
                action: TradeAction::Sell,
                quantity: 2,
                price: 3500.0,
                total: 7000.0,
                reason: "take \"profit\" & <exit>".to_string(),
                profit_loss: Some(200.0),
            }],
            watchlist: vec!["TCS.NS".to_string()],
        }
    }

    #[test]
    fn html_escapes_backend_strings() {
        let view = build_status_view(&snapshot(), &clock());
        let logs = LogView {
            lines: vec!["<img src=x onerror=alert(1)>".to_string()],
        };
        let html = render_dashboard_html(&view, Some(&logs));

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("take &quot;profit&quot; &amp; &lt;exit&gt;"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn html_binds_status_controls_and_tables() {
        let view = build_status_view(&snapshot(), &clock());
        let html = render_dashboard_html(&view, None);

        assert!(html.contains(r#"class="status-badge running">RUNNING<"#));
        assert!(html.contains("Market: 09:15:00 - 15:30:00"));
        assert!(html.contains(r#"<button id="startBtn" disabled>start</button>"#));
        assert!(html.contains(r#"<button id="pauseBtn">pause</button>"#));
        assert!(html.contains("₹12,34,567.50"));
        assert!(html.contains(r#"<span class="negative">₹-250.00</span>"#));
        assert!(html.contains("<td>₹3500.00</td>"));
        assert!(html.contains(r#"<td class="negative">SELL</td>"#));
        assert!(html.contains("<td>10:15:00</td>"));
    }

    #[test]
    fn html_renders_empty_placeholders() {
        let mut snap = snapshot();
        snap.holdings.clear();
        snap.recent_trades.clear();
        let view = build_status_view(&snap, &clock());
        let html = render_dashboard_html(&view, None);

        assert!(html.contains(r#"<td colspan="6" class="empty">No holdings</td>"#));
        assert!(html.contains(r#"<td colspan="7" class="empty">No trades yet</td>"#));
    }

    #[test]
    fn write_dashboard_html_creates_parent_dirs() {
        let dir = unique_tmp_dir("snapshot_test");
        let path = dir.join("nested").join("dashboard.html");
        let view = build_status_view(&snapshot(), &clock());

        write_dashboard_html(&path, &view, None).expect("write html");
        let written = fs::read_to_string(&path).expect("read html");
        assert!(written.starts_with("<!DOCTYPE html>"));
        let _ = fs::remove_dir_all(&dir);
    }
}
