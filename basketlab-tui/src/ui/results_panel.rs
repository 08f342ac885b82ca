//! Panel 3 — Results: per-symbol PnL bars, row table, signed total.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use basketlab_core::{AggregatedView, BacktestResultRow, PnlSign};

use crate::app::AppState;
use crate::theme;
use crate::ui::truncate;

/// Below this height the chart is dropped and only the table is drawn.
const MIN_CHART_HEIGHT: u16 = 8;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let view = app.orchestrator.view();
    let rows = app.orchestrator.results();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    render_header(f, chunks[0], app);

    if view.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("Run a backtest to see results", theme::muted())),
        ];
        f.render_widget(Paragraph::new(lines), chunks[1]);
        return;
    }

    let body = chunks[1];
    if body.height >= MIN_CHART_HEIGHT * 2 {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body);
        render_chart(f, split[0], view);
        render_table(f, split[1], rows, app.results_scroll);
    } else {
        render_table(f, body, rows, app.results_scroll);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let view = app.orchestrator.view();
    let mut spans = vec![Span::styled("Total PnL: ", theme::muted())];

    if view.is_empty() {
        spans.push(Span::styled("-", theme::muted()));
    } else {
        spans.push(Span::styled(
            format!("{:+.2}", view.total_pnl),
            theme::pnl_style(view.sign()).add_modifier(ratatui::style::Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(
                "  {} symbols, {} trades",
                view.per_symbol.len(),
                view.total_trades()
            ),
            theme::muted(),
        ));
        if !app.row_issues.is_empty() {
            spans.push(Span::styled(
                format!("  {} non-numeric", app.row_issues.len()),
                theme::warning(),
            ));
        }
    }

    let run_style = if app.can_run() {
        theme::accent()
    } else {
        theme::disabled()
    };
    spans.push(Span::styled("  [Enter/R]run", run_style));
    spans.push(Span::styled(" [j/k]scroll", theme::muted()));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chart(f: &mut Frame, area: Rect, view: &AggregatedView) {
    let Some((lo, hi)) = view.pnl_bounds() else {
        let msg = Span::styled("No numeric PnL to chart.", theme::warning());
        f.render_widget(Paragraph::new(msg), area);
        return;
    };

    // Bars sit on x = 0..n; one empty slot either side keeps them off the axes.
    let mut positive: Vec<(f64, f64)> = Vec::new();
    let mut negative: Vec<(f64, f64)> = Vec::new();
    for (i, sym) in view.per_symbol.iter().enumerate() {
        if !sym.pnl.is_finite() {
            continue;
        }
        let point = (i as f64, sym.pnl);
        match PnlSign::of(sym.pnl) {
            PnlSign::NonNegative => positive.push(point),
            PnlSign::Negative => negative.push(point),
        }
    }

    let pad = ((hi - lo).abs() * 0.1).max(1.0);
    let (y_min, y_max) = (lo - pad, hi + pad);
    let n = view.per_symbol.len();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::HalfBlock)
            .style(Style::default().fg(theme::POSITIVE))
            .graph_type(GraphType::Bar)
            .data(&positive),
        Dataset::default()
            .marker(symbols::Marker::HalfBlock)
            .style(Style::default().fg(theme::NEGATIVE))
            .graph_type(GraphType::Bar)
            .data(&negative),
    ];

    // Labels spread evenly over [-1, n], so one per slot lines up with the bars.
    let label_width = (area.width as usize / (n + 2)).clamp(1, 10);
    let mut x_labels = vec![Span::raw("")];
    x_labels.extend(
        view.per_symbol
            .iter()
            .map(|s| Span::styled(truncate(&s.name, label_width), theme::muted())),
    );
    x_labels.push(Span::raw(""));

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([-1.0, n as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("PnL", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.1}"), theme::muted()),
                    Span::styled("0", theme::muted()),
                    Span::styled(format!("{y_max:.1}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, rows: &[BacktestResultRow], scroll: usize) {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("{:<12} {:>12} {:>7} {:>12}", "Symbol", "Total PnL", "Trades", "Avg PnL"),
        theme::accent_bold(),
    )));

    let visible = area.height.saturating_sub(1) as usize;
    for row in rows.iter().skip(scroll).take(visible) {
        let pnl = row.pnl();
        let pnl_style = if pnl.is_finite() {
            theme::pnl_style(PnlSign::of(pnl))
        } else {
            theme::warning()
        };
        let avg = row.avg();
        let avg_style = if avg.is_finite() {
            theme::pnl_style(PnlSign::of(avg))
        } else {
            theme::warning()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<12} ", truncate(&row.symbol, 12)), theme::neutral()),
            Span::styled(format!("{:>12} ", truncate(&row.total_pnl, 12)), pnl_style),
            Span::styled(format!("{:>7} ", row.trades), theme::muted()),
            Span::styled(format!("{:>12}", truncate(&row.avg_pnl, 12)), avg_style),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}
