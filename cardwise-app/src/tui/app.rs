use crate::tui::{inputs::{map_event, Action}, views::{self, Screen}};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cardwise_core::{
    compute_stats, daily_reviews, daily_streak, deck_summary, overdue_count, review_card, Card, DailyReviews,
    DateRange, Deck, Rating, Repository, ReviewLog, StudySession, StudyStats, View,
};
use chrono::{Local, Utc};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tokio::runtime::Runtime;

pub struct TuiApp {
    pub repo: Arc<dyn Repository>,
    pub rt: Arc<Runtime>,
    view: View,
    decks: Vec<Deck>,
    due_per_deck: Vec<u32>,
    sel: usize,
    all_cards: Vec<Card>,
    deck_cards: Vec<Card>,
    reviews: Vec<ReviewLog>,
    session: Option<StudySession>,
    reveal: bool,
    status: String,
}

impl TuiApp {
    pub fn new(repo: Arc<dyn Repository>, rt: Arc<Runtime>) -> Self {
        Self {
            repo,
            rt,
            view: View::default(),
            decks: vec![],
            due_per_deck: vec![],
            sel: 0,
            all_cards: vec![],
            deck_cards: vec![],
            reviews: vec![],
            session: None,
            reveal: false,
            status: String::new(),
        }
    }

    fn reload(&mut self) {
        let loaded = self.rt.block_on(async {
            let decks = self.repo.list_decks().await?;
            let cards = self.repo.list_cards(None).await?;
            let reviews = self.repo.list_reviews().await?;
            Ok::<_, cardwise_core::CoreError>((decks, cards, reviews))
        });
        match loaded {
            Ok((mut decks, cards, reviews)) => {
                decks.sort_by_key(|d| d.created_at);
                let now = Utc::now();
                self.due_per_deck = decks.iter().map(|d| deck_summary(d.id, &cards, now).due).collect();
                self.decks = decks;
                self.all_cards = cards;
                self.reviews = reviews;
            }
            Err(e) => self.status = format!("load failed: {e}"),
        }
        self.sel = self.sel.min(self.decks.len().saturating_sub(1));
        self.deck_cards = match self.view.deck_id() {
            Some(id) => {
                let mut v: Vec<Card> = self.all_cards.iter().filter(|c| c.deck_id == id).cloned().collect();
                v.sort_by_key(|c| (c.due_date, c.id));
                v
            }
            None => vec![],
        };
    }

    fn navigate(&mut self, view: View) {
        if !matches!(view, View::Study(_)) {
            self.session = None;
        }
        self.view = view;
        self.reveal = false;
        self.reload();
    }

    fn start_study(&mut self, deck_id: cardwise_core::DeckId) {
        self.navigate(View::Study(deck_id));
        let session = StudySession::start(deck_id, &self.deck_cards, Utc::now(), &mut rand::thread_rng());
        if session.is_finished() {
            self.status = "no cards due".into();
        }
        self.session = Some(session);
    }

    fn rate(&mut self, rating: Rating) {
        if !self.reveal { return; }
        let Some(card_id) = self.session.as_ref().and_then(|s| s.current()).map(|c| c.id) else { return };
        match self.rt.block_on(review_card(&*self.repo, card_id, rating, &Local::now())) {
            Ok(out) => {
                if let Some(s) = self.session.as_mut() { s.complete(card_id); }
                self.status = format!("{} → next in {}d", rating.label(), out.updated_card.interval);
                self.reveal = false;
                self.reload();
            }
            Err(e) => self.status = format!("review failed: {e}"),
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.reload();

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn handle(&mut self, action: Action) -> bool {
        match (action, self.view) {
            (Action::Quit, _) => return false,
            (Action::Back, v) if v != View::Dashboard => self.navigate(v.back()),
            (Action::Dashboard, _) => self.navigate(View::Dashboard),
            (Action::Decks, _) => self.navigate(View::DeckList),
            (Action::Stats, _) => self.navigate(View::Stats),
            (Action::Up, View::DeckList) => self.sel = self.sel.saturating_sub(1),
            (Action::Down, View::DeckList) => {
                if self.sel + 1 < self.decks.len() { self.sel += 1; }
            }
            (Action::Enter, View::DeckList) => {
                if let Some(d) = self.decks.get(self.sel) { self.navigate(View::DeckDetail(d.id)); }
            }
            (Action::Enter, View::DeckDetail(id)) => self.start_study(id),
            (Action::ToggleReveal, View::Study(_)) => self.reveal = !self.reveal,
            (Action::Rate(r), View::Study(_)) => self.rate(r),
            (Action::Skip, View::Study(_)) => {
                if let Some(s) = self.session.as_mut() { s.skip(); }
                self.reveal = false;
            }
            _ => {}
        }
        true
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            let now = Local::now();
            let stats: StudyStats = compute_stats(&self.all_cards, &self.reviews, &now);
            let overdue = overdue_count(&self.all_cards, now.with_timezone(&Utc));
            let streak = daily_streak(&self.reviews, &now);
            let week: Vec<DailyReviews> = daily_reviews(&self.reviews, &now, DateRange::Week);

            terminal.draw(|f| {
                let screen = Screen {
                    view: self.view,
                    decks: &self.decks,
                    due_per_deck: &self.due_per_deck,
                    sel: self.sel,
                    cards: &self.deck_cards,
                    session: self.session.as_ref(),
                    reveal: self.reveal,
                    stats: &stats,
                    overdue,
                    streak,
                    week: &week,
                    status: &self.status,
                };
                views::draw_ui(f, f.size(), &screen);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                let action = map_event(event::read()?);
                if action == Action::None { continue; }
                self.status.clear();
                if !self.handle(action) { break; }
            }
        }
        Ok(())
    }
}
