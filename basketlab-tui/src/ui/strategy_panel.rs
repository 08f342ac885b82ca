//! Panel 2 — Strategies: strategy list with default parameters.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::{scroll_start, truncate};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let strategies = &app.catalog.strategies;
    let selected = app.selection.strategy_id();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Strategy: ", theme::muted()),
        Span::styled(selected.unwrap_or("-"), theme::accent()),
        Span::styled(
            "  [j/k]move [Enter]select [R]un [r]eload",
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    if strategies.is_empty() {
        let msg = if app.catalog_loading {
            "Loading strategies..."
        } else {
            "No strategies loaded. Press r to reload."
        };
        lines.push(Line::from(Span::styled(msg, theme::muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let height = area.height.saturating_sub(2) as usize;
    let start = scroll_start(app.strategy_cursor, height.max(1));

    for (i, strategy) in strategies.iter().enumerate().skip(start).take(height.max(1)) {
        let is_cursor = i == app.strategy_cursor;
        let is_selected = selected == Some(strategy.id.as_str());

        let style = if is_cursor {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else if is_selected {
            theme::accent_bold()
        } else {
            theme::neutral()
        };

        let params = if strategy.params.is_empty() {
            "defaults".to_string()
        } else {
            strategy.params_summary()
        };

        lines.push(Line::from(vec![
            Span::styled(if is_selected { "● " } else { "  " }, theme::positive()),
            Span::styled(format!("{:<20}", truncate(&strategy.name, 20)), style),
            Span::styled(format!(" {:<16} ", truncate(&strategy.id, 16)), theme::muted()),
            Span::styled(params, theme::muted()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}
