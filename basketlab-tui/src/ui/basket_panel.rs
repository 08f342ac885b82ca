//! Panel 1 — Baskets: service-ordered basket list with symbol preview.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::{scroll_start, truncate};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let baskets = &app.catalog.baskets;
    let selected = app.selection.basket_name();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Basket: ", theme::muted()),
        Span::styled(selected.unwrap_or("-"), theme::accent()),
        Span::styled(
            "  [j/k]move [Enter]select [R]un [r]eload",
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    if baskets.is_empty() {
        let msg = if app.catalog_loading {
            "Loading baskets..."
        } else {
            "No baskets loaded. Press r to reload."
        };
        lines.push(Line::from(Span::styled(msg, theme::muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    // Two header lines plus a preview block at the bottom.
    let list_height = area.height.saturating_sub(6) as usize;
    let start = scroll_start(app.basket_cursor, list_height.max(1));

    for (i, (name, symbols)) in baskets.iter().enumerate().skip(start).take(list_height.max(1)) {
        let is_cursor = i == app.basket_cursor;
        let is_selected = selected == Some(name);

        let marker = if is_selected { "● " } else { "  " };
        let style = if is_cursor {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else if is_selected {
            theme::accent_bold()
        } else {
            theme::neutral()
        };

        lines.push(Line::from(vec![
            Span::styled(marker, theme::positive()),
            Span::styled(format!("{:<16}", truncate(name, 16)), style),
            Span::styled(format!(" {:>3} symbols", symbols.len()), theme::muted()),
        ]));
    }

    // Symbols of the basket under the cursor.
    if let Some(name) = baskets.name_at(app.basket_cursor) {
        let symbols = baskets.symbols(name).unwrap_or(&[]);
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("{name}: "), theme::accent_bold()),
            Span::styled(symbols.join(", "), theme::muted()),
        ]));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(para, area);
}
