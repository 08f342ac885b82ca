//! Bottom status bar — run state, selection, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    // Run state
    match app.orchestrator.in_flight() {
        Some(fingerprint) => {
            spans.push(Span::styled(format!(" Running… [{fingerprint}]"), theme::warning()));
        }
        None if app.catalog_loading => {
            spans.push(Span::styled(" Loading…", theme::warning()));
        }
        None => {
            spans.push(Span::styled(" Idle", theme::muted()));
        }
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        format!(
            "{} @ {}",
            app.selection.strategy_id().unwrap_or("-"),
            app.selection.basket_name().unwrap_or("-")
        ),
        theme::accent(),
    ));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    } else {
        spans.push(Span::styled(
            "1:Baskets 2:Strategies 3:Results 4:Help  e:errors q:quit",
            theme::muted(),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
