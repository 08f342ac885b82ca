//! Parrot/neon theme tokens for the BasketLab TUI
//!
//! # Color Palette
//! - **Accent**: Electric cyan (primary highlights, focus)
//! - **Positive**: Neon green (non-negative PnL)
//! - **Negative**: Hot pink (negative PnL, failures)
//! - **Warning**: Neon orange (alerts, flagged rows)
//! - **Neutral**: Cool purple (secondary info)
//! - **Muted**: Steel blue (disabled, secondary text)

use ratatui::style::{Color, Modifier, Style};

use basketlab_core::PnlSign;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const DIM: Color = Color::Rgb(80, 80, 90);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

/// Disabled controls, e.g. the run action while a backtest is in flight.
pub fn disabled() -> Style {
    Style::default().fg(DIM).add_modifier(Modifier::DIM)
}

/// Zero is non-negative; NaN is not.
pub fn pnl_style(sign: PnlSign) -> Style {
    match sign {
        PnlSign::NonNegative => positive(),
        PnlSign::Negative => negative(),
    }
}

pub fn panel_border() -> Style {
    accent()
}

pub fn panel_title() -> Style {
    accent_bold()
}
