use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Table, TableState},
};
use std::io::{Stdout, stdout};

use crate::state::{DashboardState, InputMode};
use crate::types::{LogRecord, ServiceSummary};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

const BAR_WIDTH: u16 = 9;
const BAR_GAP: u16 = 2;

pub fn init() -> Result<Tui> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore() -> Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// ダッシュボード全体を描画
pub fn ui(f: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(12),
            Constraint::Length(1),
        ])
        .split(f.area());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(middle[1]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    render_filter_pane(f, chunks[0], state);
    render_logs_pane(f, middle[0], state);
    render_totals_pane(f, right[0], state);
    render_summary_pane(f, right[1], &state.summaries);
    render_latency_chart(f, charts[0], &state.summaries);
    render_error_rate_chart(f, charts[1], &state.summaries);
    render_status_line(f, chunks[3], state);
}

fn render_filter_pane(f: &mut Frame, area: Rect, state: &DashboardState) {
    let (title, content, color) = match state.input_mode {
        InputMode::Editing => (
            "Filter Input (Enter: apply, Esc: cancel)",
            format!("{}_", state.editing_text),
            Color::Yellow,
        ),
        InputMode::Normal if state.filter_text.is_empty() => (
            "Filter Input",
            "Press '/' to type a regex filter... (Press 'q' to quit)".to_string(),
            Color::DarkGray,
        ),
        InputMode::Normal => ("Filter Input", state.filter_text.clone(), Color::Yellow),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    let text = Paragraph::new(content).block(block);
    f.render_widget(text, area);
}

fn log_row(index: usize, log: &LogRecord) -> Row<'static> {
    let style = if log.is_error() {
        Style::default().fg(Color::Red)
    } else if log.status_code() >= 400 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    Row::new(vec![
        index.to_string(),
        log.timestamp_iso(),
        log.service().to_string(),
        log.status_code().to_string(),
        log.latency_ms().to_string(),
    ])
    .style(style)
}

fn render_logs_pane(f: &mut Frame, area: Rect, state: &DashboardState) {
    let visible = state.visible_records();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            "Raw Logs ({} of {} items)",
            visible.len(),
            state.records.len()
        ))
        .border_style(Style::default().fg(Color::Blue));

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, log)| log_row(i, log))
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(27),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "timestamp", "service", "status", "latency_ms"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">");

    let mut table_state = TableState::default().with_selected(state.selected_log_index);
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_totals_pane(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Statistics (Batch #{})", state.batch_number))
        .border_style(Style::default().fg(Color::Magenta));

    let t = &state.totals;
    let text_content = format!(
        "Total Requests: {:>6}\nError Count:    {:>6}\nError Rate:     {:>6.2}%\nAvg Latency:    {:>6.2} ms",
        t.total_requests, t.error_count, t.error_rate_pct, t.avg_latency
    );

    let text = Paragraph::new(text_content).block(block);
    f.render_widget(text, area);
}

fn render_summary_pane(f: &mut Frame, area: Rect, summaries: &[ServiceSummary]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Aggregated Metrics")
        .border_style(Style::default().fg(Color::Magenta));

    let rows: Vec<Row> = summaries
        .iter()
        .map(|s| {
            Row::new(vec![
                s.service.to_string(),
                s.total_requests.to_string(),
                format!("{:.2}", s.avg_latency),
                format!("{:.2}", s.error_rate_pct),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["service", "requests", "avg_latency", "error_%"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block);

    f.render_widget(table, area);
}

// グラフのラベル用に "-service" を落とす
fn short_label(summary: &ServiceSummary) -> String {
    let name = summary.service.as_str();
    name.strip_suffix("-service").unwrap_or(name).to_string()
}

fn render_latency_chart(f: &mut Frame, area: Rect, summaries: &[ServiceSummary]) {
    let bars: Vec<Bar> = summaries
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.avg_latency.round() as u64)
                .label(Line::from(short_label(s)))
                .text_value(format!("{:.0}", s.avg_latency))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Average Latency (ms)")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, area);
}

fn render_error_rate_chart(f: &mut Frame, area: Rect, summaries: &[ServiceSummary]) {
    let bars: Vec<Bar> = summaries
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.error_rate_pct.round() as u64)
                .label(Line::from(short_label(s)))
                .text_value(format!("{:.1}%", s.error_rate_pct))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error Rate (%)")
                .border_style(Style::default().fg(Color::Red)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .max(100)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(Style::default().fg(Color::Black).bg(Color::Red));

    f.render_widget(chart, area);
}

fn render_status_line(f: &mut Frame, area: Rect, state: &DashboardState) {
    let help = "q: quit  j/k: move  Esc: unselect  c: copy  r: regenerate  /: filter";
    let line = match &state.status_message {
        Some(message) => Line::from(vec![
            Span::styled(message.as_str(), Style::default().fg(Color::Yellow)),
            Span::raw("  |  "),
            Span::raw(help),
        ]),
        None => Line::from(help),
    };
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Service;
    use chrono::Utc;
    use ratatui::backend::TestBackend;

    fn render(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 45)).unwrap();
        terminal.draw(|f| ui(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample() -> DashboardState {
        let now = Utc::now();
        DashboardState::new(vec![
            LogRecord::new(Service::AuthService, now, 200, 100),
            LogRecord::new(Service::AuthService, now, 500, 300),
            LogRecord::new(Service::PaymentService, now, 200, 80),
        ])
    }

    #[test]
    fn renders_every_pane() {
        let screen = render(&sample());

        assert!(screen.contains("Raw Logs (3 of 3 items)"));
        assert!(screen.contains("Aggregated Metrics"));
        assert!(screen.contains("Average Latency (ms)"));
        assert!(screen.contains("Error Rate (%)"));
        assert!(screen.contains("Statistics (Batch #1)"));
        assert!(screen.contains("payment-service"));
        assert!(screen.contains("200.00"));
        assert!(screen.contains("50.00"));
    }

    #[test]
    fn shows_filter_and_status_message() {
        let mut state = sample();
        state.set_filter("payment".to_string());
        state.set_status("Copied record to clipboard");
        let screen = render(&state);

        assert!(screen.contains("Raw Logs (1 of 3 items)"));
        assert!(screen.contains("Copied record to clipboard"));
    }

    #[test]
    fn empty_batch_still_renders() {
        let screen = render(&DashboardState::new(Vec::new()));
        assert!(screen.contains("Raw Logs (0 of 0 items)"));
    }

    #[test]
    fn chart_labels_drop_the_service_suffix() {
        let summary = ServiceSummary {
            service: Service::CatalogService,
            total_requests: 1,
            avg_latency: 1.0,
            error_rate_pct: 0.0,
        };
        assert_eq!(short_label(&summary), "catalog");
    }
}
