//! Dashboard panels.

pub mod chart;
pub mod order_book;
pub mod quote_list;
pub mod summary;

use ratatui::style::{Color, Style};
use rust_decimal::Decimal;

use crate::chart::Direction;

/// Rising prices are red and falling ones green, as on mainland boards.
pub fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => Color::Red,
        Direction::Down => Color::Green,
    }
}

/// Color for a signed change.
pub fn change_color(change: Decimal) -> Color {
    if change >= Decimal::ZERO {
        direction_color(Direction::Up)
    } else {
        direction_color(Direction::Down)
    }
}

/// Border style for a panel depending on focus.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
