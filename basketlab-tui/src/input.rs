//! Keyboard input dispatch — overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, Panel};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(panel) = c.to_digit(10).and_then(|d| Panel::from_index(d as usize - 1)) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('R') => {
            app.run_backtest();
            return;
        }
        KeyCode::Char('r') => {
            app.request_catalog();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Baskets => handle_basket_key(app, key),
        Panel::Strategies => handle_strategy_key(app, key),
        Panel::Results => handle_results_key(app, key),
        Panel::Help => {} // display only
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn move_cursor(cursor: &mut usize, len: usize, code: KeyCode) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            if *cursor + 1 < len {
                *cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => *cursor = 0,
        KeyCode::Char('G') | KeyCode::End => *cursor = len.saturating_sub(1),
        _ => {}
    }
}

fn handle_basket_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.select_basket_at_cursor(),
        code => move_cursor(&mut app.basket_cursor, app.catalog.baskets.len(), code),
    }
}

fn handle_strategy_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.select_strategy_at_cursor(),
        code => move_cursor(&mut app.strategy_cursor, app.catalog.strategies.len(), code),
    }
}

fn handle_results_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.run_backtest(),
        code => move_cursor(
            &mut app.results_scroll,
            app.orchestrator.results().len(),
            code,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{WorkerCommand, WorkerResponse};
    use basketlab_client::CatalogFetch;
    use basketlab_core::{BasketCatalog, Params, Strategy};
    use proptest::prelude::*;
    use std::sync::mpsc::{self, Receiver, Sender};

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let mut app = AppState::new(cmd_tx, resp_rx);
        app.apply_catalog(CatalogFetch {
            strategies: Ok(vec![
                Strategy { id: "momentum".into(), name: "Momentum ML".into(), params: Params::new() },
                Strategy { id: "mean_reversion".into(), name: "MR".into(), params: Params::new() },
            ]),
            baskets: Ok([
                ("TOP_3", vec!["BTCUSDT".to_string()]),
                ("MEME", vec!["DOGEUSDT".to_string()]),
                ("ETH", vec!["ETHUSDT".to_string()]),
            ]
            .into_iter()
            .collect::<BasketCatalog>()),
        });
        (app, cmd_rx, resp_tx)
    }

    #[test]
    fn number_keys_switch_panels() {
        let (mut app, _rx, _tx) = app();
        handle_key(&mut app, press('3'));
        assert_eq!(app.active_panel, Panel::Results);
        handle_key(&mut app, press('4'));
        assert_eq!(app.active_panel, Panel::Help);
        handle_key(&mut app, KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.active_panel, Panel::Baskets);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let (mut app, _rx, _tx) = app();
        for _ in 0..10 {
            handle_key(&mut app, press('j'));
        }
        assert_eq!(app.basket_cursor, 2);
        handle_key(&mut app, press('g'));
        assert_eq!(app.basket_cursor, 0);
        handle_key(&mut app, press('k'));
        assert_eq!(app.basket_cursor, 0);
    }

    #[test]
    fn enter_selects_basket_under_cursor() {
        let (mut app, _rx, _tx) = app();
        handle_key(&mut app, press('j'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.selection.basket_name(), Some("MEME"));
        assert_eq!(app.selection.strategy_id(), Some("momentum"));
    }

    #[test]
    fn space_selects_strategy_under_cursor() {
        let (mut app, _rx, _tx) = app();
        handle_key(&mut app, press('2'));
        handle_key(&mut app, press('j'));
        handle_key(&mut app, press(' '));
        assert_eq!(app.selection.strategy_id(), Some("mean_reversion"));
    }

    #[test]
    fn run_key_is_ignored_while_running() {
        let (mut app, rx, _tx) = app();
        handle_key(&mut app, press('R'));
        handle_key(&mut app, press('R'));
        handle_key(&mut app, press('3'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::RunBacktest { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn error_overlay_captures_keys() {
        let (mut app, _rx, _tx) = app();
        handle_key(&mut app, press('e'));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press('q'));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.running);
        handle_key(&mut app, press('q'));
        assert!(!app.running);
    }

    proptest! {
        #[test]
        fn cursors_never_escape_catalog(keys in proptest::collection::vec(
            prop::sample::select(vec!['j', 'k', 'g', 'G', '1', '2', '3', ' ']), 0..64))
        {
            let (mut app, _rx, _tx) = app();
            for c in keys {
                handle_key(&mut app, press(c));
            }
            prop_assert!(app.basket_cursor < app.catalog.baskets.len());
            prop_assert!(app.strategy_cursor < app.catalog.strategies.len());
            prop_assert!(app.selection.is_complete());
        }
    }
}
