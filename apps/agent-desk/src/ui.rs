use crate::app::{App, Focus};
use desk_domain::services::markup::sanitize_terminal;
use desk_domain::services::view::{
    Cell as ViewCell, Emphasis, LogView, StatusView, TableBody, HOLDINGS_COLUMNS, TRADES_COLUMNS,
};
use desk_domain::services::format::Tone;
use desk_domain::value_objects::agent_status::{AgentStatus, ControlButtons};
use desk_domain::value_objects::control::ControlAction;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(10),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(size);

    let view = app.state.status_view();
    draw_header(frame, outer[0], app, view);
    draw_portfolio(frame, outer[1], view);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(outer[2]);
    draw_holdings(frame, tables[0], view);
    draw_trades(frame, tables[1], view);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(outer[3]);
    draw_backend_logs(frame, bottom[0], app, app.state.log_view());
    draw_diagnostics(frame, bottom[1], app);
    draw_footer(frame, outer[4], app);

    if let Some(message) = app.state.notification() {
        draw_notification(frame, size, message);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, view: Option<&StatusView>) {
    let status = app.state.status();
    let badge_text = view
        .map(|v| v.badge.text.clone())
        .unwrap_or_else(|| status.badge_text().to_string());
    let market = view
        .map(|v| sanitize_terminal(&v.market_hours))
        .unwrap_or_else(|| "Market: --".to_string());

    let mut spans = vec![
        Span::styled(format!(" {badge_text} "), badge_style(status)),
        Span::raw("  "),
        Span::raw(market),
        Span::raw("  "),
    ];
    spans.extend(control_spans(app.state.controls()));
    if let Some(view) = view.filter(|v| !v.watchlist.is_empty()) {
        let symbols = view
            .watchlist
            .iter()
            .map(|s| sanitize_terminal(s))
            .collect::<Vec<_>>()
            .join(", ");
        spans.push(Span::styled(
            format!("  watching: {symbols}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let updated = app
        .last_status_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let title = format!("Agent Desk | {} | updated {updated}", app.backend_url);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn badge_style(status: AgentStatus) -> Style {
    let color = match status {
        AgentStatus::Running => Color::Green,
        AgentStatus::Paused => Color::Yellow,
        AgentStatus::Stopped => Color::Red,
        AgentStatus::Unknown => Color::Gray,
    };
    Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}

fn control_spans(controls: ControlButtons) -> Vec<Span<'static>> {
    ControlAction::ALL
        .iter()
        .flat_map(|action| {
            let key = match action {
                ControlAction::Start => 's',
                ControlAction::Pause => 'p',
                ControlAction::Stop => 'x',
            };
            let style = if controls.is_enabled(*action) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            };
            [
                Span::styled(format!("[{key}] {action}"), style),
                Span::raw(" "),
            ]
        })
        .collect()
}

fn draw_portfolio(frame: &mut Frame, area: Rect, view: Option<&StatusView>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4].as_ref())
        .split(area);
    let cards: [(&str, Option<&ViewCell>); 4] = [
        ("Cash", view.map(|v| &v.portfolio.cash)),
        ("Holdings Value", view.map(|v| &v.portfolio.holdings_value)),
        ("Total Value", view.map(|v| &v.portfolio.total_value)),
        ("Unrealized P/L", view.map(|v| &v.portfolio.unrealized_pl)),
    ];
    for (idx, (title, cell)) in cards.into_iter().enumerate() {
        let line = match cell {
            Some(cell) => Line::from(Span::styled(sanitize_terminal(&cell.text), cell_style(cell))),
            None => Line::from(Span::styled("--", Style::default().fg(Color::DarkGray))),
        };
        frame.render_widget(
            Paragraph::new(line)
                .alignment(Alignment::Right)
                .block(Block::default().title(title).borders(Borders::ALL)),
            cols[idx],
        );
    }
}

fn draw_holdings(frame: &mut Frame, area: Rect, view: Option<&StatusView>) {
    let block = Block::default().title("Holdings").borders(Borders::ALL);
    let widths = [
        Constraint::Min(10),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    draw_table(
        frame,
        area,
        block,
        &HOLDINGS_COLUMNS,
        &widths,
        view.map(|v| &v.holdings),
        false,
    );
}

fn draw_trades(frame: &mut Frame, area: Rect, view: Option<&StatusView>) {
    let block = Block::default().title("Recent Trades").borders(Borders::ALL);
    let widths = [
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(10),
        Constraint::Length(12),
    ];
    draw_table(
        frame,
        area,
        block,
        &TRADES_COLUMNS,
        &widths,
        view.map(|v| &v.trades),
        true,
    );
}

/// `realized` adds a trailing column for the optional realized P/L cell.
fn draw_table(
    frame: &mut Frame,
    area: Rect,
    block: Block<'_>,
    columns: &[&str],
    widths: &[Constraint],
    body: Option<&TableBody>,
    realized: bool,
) {
    let rows = match body {
        None => {
            frame.render_widget(
                Paragraph::new(Span::styled("waiting for data...", Style::default().fg(Color::DarkGray)))
                    .block(block),
                area,
            );
            return;
        }
        Some(TableBody::Placeholder { text, .. }) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    sanitize_terminal(text),
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center)
                .block(block),
                area,
            );
            return;
        }
        Some(TableBody::Rows { rows }) => rows,
    };

    let mut header: Vec<Cell> = columns.iter().map(|name| Cell::from(*name)).collect();
    if realized {
        header.push(Cell::from("Realized"));
    }
    let header = Row::new(header).style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.cells.iter().map(table_cell).collect();
            if realized {
                cells.push(row.realized.as_ref().map(table_cell).unwrap_or_default());
            }
            Row::new(cells)
        })
        .collect();

    frame.render_widget(
        Table::new(rows, widths.to_vec())
            .header(header)
            .column_spacing(1)
            .block(block),
        area,
    );
}

fn table_cell(cell: &ViewCell) -> Cell<'static> {
    Cell::from(Span::styled(sanitize_terminal(&cell.text), cell_style(cell)))
}

fn cell_style(cell: &ViewCell) -> Style {
    let mut style = match cell.tone {
        Some(Tone::Positive) => Style::default().fg(Color::Green),
        Some(Tone::Negative) => Style::default().fg(Color::Red),
        None => Style::default(),
    };
    match cell.emphasis {
        Emphasis::Strong => style = style.add_modifier(Modifier::BOLD),
        Emphasis::Muted => style = style.fg(Color::DarkGray),
        Emphasis::Normal => {}
    }
    style
}

fn draw_backend_logs(frame: &mut Frame, area: Rect, app: &App, view: Option<&LogView>) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let text: Vec<Line> = view
        .map(|view| {
            view.lines
                .iter()
                .skip(app.backend_log_scroll)
                .take(max_lines)
                .map(|line| Line::from(sanitize_terminal(line)))
                .collect()
        })
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(text)
            .block(panel_block("Agent Logs", app.focus == Focus::BackendLogs))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_diagnostics(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let text: Vec<Line> = app
        .logs
        .lock()
        .window(app.diag_scroll, max_lines)
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(text)
            .block(panel_block("Diagnostics", app.focus == Focus::Diagnostics))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(
        "keys: s start | p pause | x stop | Tab focus | Up/Down/PgUp/PgDn scroll | End latest | q quit",
    )];
    if app.state.in_flight_controls() > 0 {
        spans.push(Span::styled(
            format!("  sending ({})", app.state.in_flight_controls()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some((kind, err)) = app.state.last_poll_error() {
        spans.push(Span::styled(
            format!("  {} poll failed: {err}", kind.as_str()),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notification(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 7, area);
    let text = vec![
        Line::from(sanitize_terminal(message)),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Notice")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            ),
        popup,
    );
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(area.height.saturating_sub(height) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
