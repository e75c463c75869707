use crate::tui::theme::*;
use cardwise_core::{preview_intervals, Card, DailyReviews, Deck, Rating, StudySession, StudyStats, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

/// Everything a frame needs, borrowed from the app.
pub struct Screen<'a> {
    pub view: View,
    pub decks: &'a [Deck],
    pub due_per_deck: &'a [u32],
    pub sel: usize,
    pub cards: &'a [Card],
    pub session: Option<&'a StudySession>,
    pub reveal: bool,
    pub stats: &'a StudyStats,
    pub overdue: usize,
    pub streak: u32,
    pub week: &'a [DailyReviews],
    pub status: &'a str,
}

const TABS: [View; 3] = [View::Dashboard, View::DeckList, View::Stats];

pub fn draw_ui(f: &mut Frame, area: Rect, s: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let active = match s.view {
        View::Dashboard => 0,
        View::Stats => 2,
        _ => 1,
    };
    let tabs = Tabs::new(TABS.iter().map(|v| Line::from(v.title())))
        .select(active)
        .highlight_style(selected_style())
        .block(Block::default().title(" Cardwise ").borders(Borders::ALL));
    f.render_widget(tabs, chunks[0]);

    match s.view {
        View::Dashboard => draw_dashboard(f, chunks[1], s),
        View::DeckList => draw_decks(f, chunks[1], s),
        View::DeckDetail(_) => draw_deck_detail(f, chunks[1], s),
        View::Study(_) => draw_study(f, chunks[1], s),
        View::Stats => draw_stats(f, chunks[1], s),
    }

    let keys = match s.view {
        View::Study(_) => " space reveal  1-4 rate  s skip  esc back  q quit ",
        View::DeckList => " ↑/k ↓/j select  enter open  d/l/t tabs  q quit ",
        View::DeckDetail(_) => " enter study  esc back  q quit ",
        _ => " d dashboard  l decks  t stats  q quit ",
    };
    let mut spans = vec![Span::raw(keys)];
    if !s.status.is_empty() {
        spans.push(Span::raw(format!(" | {}", s.status)).style(hint_style()));
    }
    let foot = Paragraph::new(Line::from(spans))
        .style(footer_style())
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(foot, chunks[2]);
}

fn draw_dashboard(f: &mut Frame, area: Rect, s: &Screen) {
    let total: u32 = s.due_per_deck.iter().sum();
    let lines = vec![
        Line::from(vec![Span::raw("Due now        ").style(title_style()), Span::raw(s.stats.cards_to_review.to_string())]),
        Line::from(vec![Span::raw("Overdue        ").style(title_style()), Span::raw(s.overdue.to_string()).style(due_style())]),
        Line::from(vec![Span::raw("Reviewed today ").style(title_style()), Span::raw(s.stats.cards_reviewed.to_string())]),
        Line::from(vec![Span::raw("Day streak     ").style(title_style()), Span::raw(s.streak.to_string())]),
        Line::from(""),
        Line::from(format!("{} deck(s), {} card(s) waiting. Press l to pick a deck.", s.decks.len(), total)),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Dashboard").borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_decks(f: &mut Frame, area: Rect, s: &Screen) {
    if s.decks.is_empty() {
        let p = Paragraph::new("No decks yet. Create one with `cardwise deck add <name>`.")
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Decks").borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    }
    let items: Vec<_> = s
        .decks
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let due = s.due_per_deck.get(i).copied().unwrap_or(0);
            let text = format!("{:<30} {:>4} cards {:>4} due", d.name, d.card_count, due);
            let line = if i == s.sel { Line::from(text).style(selected_style()) } else { Line::from(text) };
            ListItem::new(line)
        })
        .collect();
    let list = List::new(items).block(Block::default().title("Decks").borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_deck_detail(f: &mut Frame, area: Rect, s: &Screen) {
    let deck = s.view.deck_id().and_then(|id| s.decks.iter().find(|d| d.id == id));
    let Some(deck) = deck else {
        let p = Paragraph::new("Deck not found.").block(Block::default().title("Deck").borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let head = Paragraph::new(vec![
        Line::from(Span::raw(deck.name.clone()).style(title_style())),
        Line::from(Span::raw(deck.description.clone()).style(hint_style())),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(head, chunks[0]);

    let now = chrono::Utc::now();
    let items: Vec<_> = s
        .cards
        .iter()
        .map(|c| {
            let due = if c.is_due(now) { Span::raw(" due ").style(due_style()) } else { Span::raw("     ") };
            ListItem::new(Line::from(vec![
                due,
                Span::raw(format!("{} | {}", c.front, c.back)),
                Span::raw(format!("  ({}d, ease {:.2})", c.interval, c.ease)).style(hint_style()),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().title("Cards").borders(Borders::ALL));
    f.render_widget(list, chunks[1]);
}

fn draw_study(f: &mut Frame, area: Rect, s: &Screen) {
    let block = Block::default().title("Study").borders(Borders::ALL);
    let card = s.session.and_then(|sess| sess.current());
    let Some(card) = card else {
        let reviewed = s.session.map(|sess| sess.reviewed()).unwrap_or(0);
        let p = Paragraph::new(format!("Session complete. Reviewed {reviewed} card(s). Press esc to go back."))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, area);
        return;
    };
    let inner = block.inner(area);
    f.render_widget(block, area);

    let remaining = s.session.map(|sess| sess.remaining()).unwrap_or(0);
    let mut text = vec![
        Line::from(Span::raw(format!("{remaining} left")).style(hint_style())),
        Line::from(""),
        Line::from(vec![Span::raw("Q: ").style(title_style()), Span::raw(&card.front)]),
        Line::from(""),
    ];
    if s.reveal {
        text.push(Line::from(vec![Span::raw("A: ").style(title_style()), Span::raw(&card.back)]));
        text.push(Line::from(""));
        let choices: Vec<Span> = preview_intervals(card.schedule())
            .iter()
            .map(|(r, days)| Span::raw(format!("[{}] {} {}d  ", r.key(), r.label(), days)).style(rating_style(*r)))
            .collect();
        text.push(Line::from(choices));
    } else {
        text.push(Line::from(Span::raw("press space to reveal").style(hint_style())));
    }
    let p = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(p, inner);
}

fn draw_stats(f: &mut Frame, area: Rect, s: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut lines = vec![
        Line::from(format!("Cards due       {}", s.stats.cards_to_review)),
        Line::from(format!("Reviewed today  {}", s.stats.cards_reviewed)),
        Line::from(format!("Day streak      {}", s.streak)),
        Line::from(""),
    ];
    for r in Rating::ALL {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<8}", r.label())).style(rating_style(r)),
            Span::raw(s.stats.reviews_by_rating.get(r).to_string()),
        ]));
    }
    let p = Paragraph::new(lines).block(Block::default().title("Today").borders(Borders::ALL));
    f.render_widget(p, chunks[0]);

    let labels: Vec<String> = s.week.iter().map(|d| d.date.format("%a").to_string()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(s.week)
        .map(|(l, d)| (l.as_str(), u64::from(d.reviews)))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title("Last 7 days").borders(Borders::ALL))
        .data(&data)
        .bar_width(5)
        .bar_gap(1)
        .bar_style(title_style());
    f.render_widget(chart, chunks[1]);
}
