use cardwise_core::Rating;
use ratatui::style::{Color, Style};
use ratatui::style::Stylize;

pub fn title_style() -> Style { Style::default().fg(Color::Cyan).bold() }
pub fn hint_style() -> Style { Style::default().fg(Color::DarkGray) }
pub fn selected_style() -> Style { Style::default().fg(Color::Yellow).bold() }
pub fn footer_style() -> Style { Style::default().fg(Color::Gray) }
pub fn due_style() -> Style { Style::default().fg(Color::LightRed) }

pub fn rating_style(rating: Rating) -> Style {
    let color = match rating {
        Rating::Again => Color::Red,
        Rating::Hard => Color::Yellow,
        Rating::Medium => Color::Blue,
        Rating::Easy => Color::Green,
    };
    Style::default().fg(color).bold()
}
