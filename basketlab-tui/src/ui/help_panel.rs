//! Panel 4 — Help: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "R", "Run backtest for the current selection");
    key(&mut lines, "r", "Reload strategies and baskets");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Baskets / Panel 2 — Strategies");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "g / G", "Jump to first / last");
    key(&mut lines, "Enter / Space", "Select entry under cursor");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Results");
    key(&mut lines, "Enter", "Run backtest");
    key(&mut lines, "j / k", "Scroll result rows");
    lines.push(Line::from(""));

    section(&mut lines, "Catalog");
    key(&mut lines, "", &catalog_summary(app));

    f.render_widget(Paragraph::new(lines), area);
}

fn catalog_summary(app: &AppState) -> String {
    format!(
        "{} strategies, {} baskets loaded",
        app.catalog.strategies.len(),
        app.catalog.baskets.len()
    )
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
