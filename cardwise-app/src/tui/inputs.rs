use cardwise_core::Rating;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    Up,
    Down,
    Enter,
    ToggleReveal,
    Rate(Rating),
    Skip,
    Dashboard,
    Decks,
    Stats,
    None,
}

pub fn map_event(ev: Event) -> Action {
    if let Event::Key(KeyEvent {
        code, modifiers, kind, ..
    }) = ev
    {
        if kind != KeyEventKind::Press {
            return Action::None;
        }
        match (code, modifiers) {
            (KeyCode::Char('q'), _) => Action::Quit,
            (KeyCode::Esc, _) | (KeyCode::Backspace, _) => Action::Back,
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Action::Up,
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::Down,
            (KeyCode::Enter, _) => Action::Enter,
            (KeyCode::Char(' '), _) => Action::ToggleReveal,
            (KeyCode::Char(c @ '1'..='4'), _) => c
                .to_string()
                .parse::<Rating>()
                .map(Action::Rate)
                .unwrap_or(Action::None),
            (KeyCode::Char('s'), KeyModifiers::NONE) => Action::Skip,
            (KeyCode::Char('d'), KeyModifiers::NONE) => Action::Dashboard,
            (KeyCode::Char('l'), KeyModifiers::NONE) => Action::Decks,
            (KeyCode::Char('t'), KeyModifiers::NONE) => Action::Stats,
            _ => Action::None,
        }
    } else {
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn digits_map_to_ratings() {
        assert_eq!(map_event(key(KeyCode::Char('1'))), Action::Rate(Rating::Again));
        assert_eq!(map_event(key(KeyCode::Char('3'))), Action::Rate(Rating::Medium));
        assert_eq!(map_event(key(KeyCode::Char('4'))), Action::Rate(Rating::Easy));
        assert_eq!(map_event(key(KeyCode::Char('5'))), Action::None);
    }

    #[test]
    fn escape_goes_back_and_q_quits() {
        assert_eq!(map_event(key(KeyCode::Esc)), Action::Back);
        assert_eq!(map_event(key(KeyCode::Char('q'))), Action::Quit);
    }
}
