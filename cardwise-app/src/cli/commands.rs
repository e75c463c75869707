use crate::cli::opts::*;

use anyhow::{anyhow, bail, Context, Result};
use cardwise_core::{
    compute_stats, daily_reviews, daily_streak, deck_summary, due_cards, filter_by_text, overdue_count,
    preview_intervals, review_card, Card, CardId, DateRange, Deck, Rating, Repository, ReviewLog, StudySession,
};
use cardwise_json::JsonStore;
use chrono::{Local, Utc};
use std::collections::{HashMap, HashSet};
use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;
use uuid::Uuid;

pub async fn run_cli(args: Cli) -> Result<()> {
    let repo = open_repo(&args).await?;
    match args.cmd {
        Command::Deck(cmd) => deck_cmd(repo, cmd).await,
        Command::Card(cmd) => card_cmd(repo, cmd).await,
        Command::Study(cmd) => study_cmd(repo, cmd).await,
        Command::Stats(cmd) => stats_cmd(repo, cmd).await,
        Command::Export(cmd) => export_cmd(repo, cmd).await,
        Command::Import(cmd) => import_cmd(repo, cmd).await,
        Command::Tui => bail!("the TUI is started from main"),
    }
}

pub async fn open_repo(args: &Cli) -> Result<Arc<dyn Repository>> {
    let opts = args.store_options();
    let root = opts.root.clone();
    let store = JsonStore::open(opts)
        .await
        .with_context(|| format!("opening data dir {}", root.display()))?;
    Ok(Arc::new(store))
}

async fn deck_cmd(repo: Arc<dyn Repository>, cmd: DeckCmd) -> Result<()> {
    match cmd {
        DeckCmd::Add { name, description } => {
            let d = repo.create_deck(&name, &description).await?;
            println!("{}", d.id);
        }
        DeckCmd::List => {
            let mut v = repo.list_decks().await?;
            v.sort_by_key(|d| d.created_at);
            let cards = repo.list_cards(None).await?;
            let now = Utc::now();
            for d in v {
                let s = deck_summary(d.id, &cards, now);
                println!("{}\t{}\tcards={}\tdue={}", d.id, d.name, d.card_count, s.due);
            }
        }
        DeckCmd::Edit { deck, name, description } => {
            let mut d = resolve_deck(&*repo, &deck).await?;
            if let Some(n) = name { d.name = n; }
            if let Some(desc) = description { d.description = desc; }
            repo.update_deck(&d).await?;
            println!("ok");
        }
        DeckCmd::Rm { deck } => {
            let d = resolve_deck(&*repo, &deck).await?;
            repo.delete_deck(d.id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn card_cmd(repo: Arc<dyn Repository>, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let deck = resolve_deck(&*repo, &a.deck).await?;
            let c = repo.add_card(deck.id, &a.front, &a.back).await?;
            println!("{}", c.id);
        }
        CardCmd::List { deck, search, due } => {
            let deck_id = if let Some(sel) = deck {
                Some(resolve_deck(&*repo, &sel).await?.id)
            } else {
                None
            };
            let mut cards = repo.list_cards(deck_id).await?;
            if let Some(q) = search { cards = filter_by_text(&cards, &q); }
            if due { cards = due_cards(&cards, Utc::now()); }
            cards.sort_by_key(|c| (c.due_date, c.id));
            for c in cards {
                println!(
                    "{}\t{}\t{}\tdue={}\tinterval={}d\tease={:.2}\treviews={}",
                    c.id,
                    c.front,
                    c.back,
                    c.due_date.with_timezone(&Local).format("%Y-%m-%d"),
                    c.interval,
                    c.ease,
                    c.reviews
                );
            }
        }
        CardCmd::Rm { card_id } => {
            let id = parse_uuid(&card_id)?;
            repo.delete_card(id).await?;
            println!("ok");
        }
        CardCmd::Edit(e) => {
            let id = parse_uuid(&e.card_id)?;
            let mut card = repo.get_card(id).await?;
            if let Some(f) = e.front { card.front = f; }
            if let Some(b) = e.back { card.back = b; }
            repo.update_card(&card).await?;
            println!("ok");
        }
    }
    Ok(())
}

fn rating_choices(card: &Card) -> String {
    let parts: Vec<String> = preview_intervals(card.schedule())
        .iter()
        .map(|(r, days)| format!("{}={} {}d", r.key(), r.label(), days))
        .collect();
    format!("[{}, s=skip, q=quit]", parts.join(", "))
}

async fn study_cmd(repo: Arc<dyn Repository>, cmd: StudyCmd) -> Result<()> {
    let deck = resolve_deck(&*repo, &cmd.deck).await?;
    let cards = repo.list_cards(Some(deck.id)).await?;
    let mut session = StudySession::start(deck.id, &cards, Utc::now(), &mut rand::thread_rng());
    if session.is_finished() {
        println!("no cards due");
        return Ok(());
    }
    let total = session.remaining().min(cmd.max);

    while let Some(card) = session.current().cloned() {
        if session.reviewed() >= cmd.max { break; }
        println!("\n[{}/{}] {}", session.reviewed() + 1, total, deck.name);
        println!("Q: {}", card.front);
        if !prompt_enter("[enter=show]")? { break; }
        println!("A: {}", card.back);
        println!("{}", rating_choices(&card));

        let choice = loop {
            // End of input quits like `q`.
            let line = read_line("rating> ")?.unwrap_or_else(|| "q".into());
            match line.trim().to_lowercase().as_str() {
                "s" | "skip" => break None,
                "q" | "quit" => {
                    println!("\nreviewed {}", session.reviewed());
                    return Ok(());
                }
                other => match other.parse::<Rating>() {
                    Ok(r) => break Some(r),
                    Err(_) => println!("enter 1-4, s, or q"),
                },
            }
        };

        match choice {
            Some(rating) => {
                let out = review_card(&*repo, card.id, rating, &Local::now()).await?;
                session.complete(card.id);
                println!("→ next due in {} day(s)", out.updated_card.interval);
            }
            None => session.skip(),
        }
    }

    println!("\nreviewed {}", session.reviewed());
    Ok(())
}

async fn stats_cmd(repo: Arc<dyn Repository>, cmd: StatsCmd) -> Result<()> {
    let deck_id = if let Some(sel) = cmd.deck {
        Some(resolve_deck(&*repo, &sel).await?.id)
    } else {
        None
    };
    let cards = repo.list_cards(deck_id).await?;
    let mut events = repo.list_reviews().await?;
    if deck_id.is_some() {
        let ids: HashSet<CardId> = cards.iter().map(|c| c.id).collect();
        events.retain(|e| ids.contains(&e.card_id));
    }

    let now = Local::now();
    let stats = compute_stats(&cards, &events, &now);
    println!("cards due        {}", stats.cards_to_review);
    println!("overdue          {}", overdue_count(&cards, now.with_timezone(&Utc)));
    println!("reviewed today   {}", stats.cards_reviewed);
    for r in Rating::ALL {
        println!("  {:<6}         {}", r.label(), stats.reviews_by_rating.get(r));
    }
    println!("active today     {}", if stats.streak > 0 { "yes" } else { "no" });
    println!("day streak       {}", daily_streak(&events, &now));

    let range = DateRange::from(cmd.range);
    let series = daily_reviews(&events, &now, range);
    let peak = series.iter().map(|d| d.reviews).max().unwrap_or(0).max(1);
    println!("\nreviews, last {} days", range.days());
    for d in series {
        let width = (d.reviews as usize * 40).div_ceil(peak as usize);
        println!("{}  {:>4}  {}", d.date.format("%Y-%m-%d"), d.reviews, "#".repeat(width));
    }
    Ok(())
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBundle {
    version: u32,
    decks: Vec<Deck>,
    cards: Vec<Card>,
    #[serde(default)]
    review_logs: Vec<ReviewLog>,
}

async fn export_cmd(repo: Arc<dyn Repository>, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path } => {
            let mut decks = repo.list_decks().await?;
            decks.sort_by_key(|d| d.created_at);
            let mut cards = repo.list_cards(None).await?;
            cards.sort_by_key(|c| (c.deck_id, c.id));
            let review_logs = repo.list_reviews().await?;
            let bundle = ExportBundle { version: 1, decks, cards, review_logs };
            let s = serde_json::to_string_pretty(&bundle)?;
            std::fs::write(&path, s)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path, deck } => {
            let deck_id = if let Some(sel) = deck {
                Some(resolve_deck(&*repo, &sel).await?.id)
            } else {
                None
            };
            let mut cards = repo.list_cards(deck_id).await?;
            cards.sort_by_key(|c| (c.deck_id, c.id));

            let decks = repo.list_decks().await?;
            let deck_name: HashMap<Uuid, String> = decks.into_iter().map(|d| (d.id, d.name)).collect();

            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["deck", "front", "back"])?;
            for c in cards {
                let dn = deck_name.get(&c.deck_id).cloned().unwrap_or_else(|| c.deck_id.to_string());
                wtr.write_record([dn, c.front, c.back])?;
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

async fn import_cmd(repo: Arc<dyn Repository>, cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Json { path } => {
            let data = std::fs::read_to_string(&path)?;
            let bundle: ExportBundle = serde_json::from_str(&data)?;
            let r = import_bundle(&*repo, bundle).await?;
            println!("imported {} cards, {} reviews, skipped {} existing cards", r.cards, r.reviews, r.skipped);
        }
        ImportCmd::Csv { path, deck } => {
            let rdr = csv::Reader::from_path(&path)?;
            let target_deck = match deck {
                Some(sel) => Some(resolve_deck(&*repo, &sel).await?),
                None => None,
            };
            let r = import_csv(&*repo, rdr, target_deck.as_ref()).await?;
            println!("imported {} cards, skipped {} rows", r.cards, r.skipped);
        }
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ImportReport {
    cards: usize,
    reviews: usize,
    skipped: usize,
}

/// Imports a bundle, keeping scheduling and review history. A card whose
/// front and back already exist in the target deck is skipped with its
/// reviews, so importing the same bundle twice adds nothing.
async fn import_bundle<R: Repository + ?Sized>(repo: &R, bundle: ExportBundle) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let names: HashMap<Uuid, String> = bundle.decks.iter().map(|d| (d.id, d.name.clone())).collect();
    for d in &bundle.decks {
        ensure_deck_by_name(repo, &d.name, &d.description).await?;
    }
    let mut imported: HashMap<CardId, Card> = HashMap::new();
    for c in bundle.cards {
        let name = names.get(&c.deck_id).cloned().unwrap_or_else(|| c.deck_id.to_string());
        let deck = ensure_deck_by_name(repo, &name, "").await?;
        let existing = repo.list_cards(Some(deck.id)).await?;
        if existing.iter().any(|e| e.front == c.front && e.back == c.back) {
            report.skipped += 1;
            continue;
        }
        let mut card = repo.add_card(deck.id, &c.front, &c.back).await?;
        card.due_date = c.due_date;
        card.interval = c.interval;
        card.ease = c.ease;
        card.reviews = c.reviews;
        card.last_reviewed_at = c.last_reviewed_at;
        let card = repo.update_card(&card).await?;
        imported.insert(c.id, card);
        report.cards += 1;
    }
    for log in bundle.review_logs {
        let Some(card) = imported.get(&log.card_id) else { continue };
        let log = ReviewLog::new(card.id, log.rating, log.reviewed_at);
        repo.record_review(card, &log).await?;
        report.reviews += 1;
    }
    Ok(report)
}

/// Imports `deck,front,back` rows. Rows with no deck (and no `--deck`
/// target) or no text are skipped and reported.
async fn import_csv<R: Repository + ?Sized, In: std::io::Read>(
    repo: &R,
    mut rdr: csv::Reader<In>,
    target_deck: Option<&Deck>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let deck_name = rec.get(0).unwrap_or("").trim();
        let front = rec.get(1).unwrap_or("").to_string();
        let back = rec.get(2).unwrap_or("").to_string();
        if front.is_empty() && back.is_empty() {
            report.skipped += 1;
            continue;
        }
        let deck = match target_deck {
            Some(d) => d.clone(),
            None if deck_name.is_empty() => {
                tracing::warn!(row = i + 2, "csv row has no deck; skipped");
                report.skipped += 1;
                continue;
            }
            None => ensure_deck_by_name(repo, deck_name, "").await?,
        };
        repo.add_card(deck.id, &front, &back).await?;
        report.cards += 1;
    }
    Ok(report)
}

// ===== Helpers =====
fn parse_uuid(s: &str) -> Result<Uuid> { Uuid::parse_str(s).map_err(|_| anyhow!("invalid uuid")) }

pub async fn resolve_deck<R: Repository + ?Sized>(repo: &R, sel: &str) -> Result<Deck> {
    if let Ok(id) = Uuid::parse_str(sel) { if let Ok(d) = repo.get_deck(id).await { return Ok(d); } }
    let decks = repo.list_decks().await?;
    if let Some(d) = decks.into_iter().find(|d| d.name.eq_ignore_ascii_case(sel.trim())) { return Ok(d); }
    bail!("deck not found: {}", sel)
}

async fn ensure_deck_by_name<R: Repository + ?Sized>(repo: &R, name: &str, description: &str) -> Result<Deck> {
    let decks = repo.list_decks().await?;
    if let Some(d) = decks.into_iter().find(|d| d.name.eq_ignore_ascii_case(name.trim())) { return Ok(d); }
    let d = repo.create_deck(name, description).await?;
    Ok(d)
}

fn prompt_enter(label: &str) -> Result<bool> { Ok(read_line(label)?.is_some()) }

/// Prints `prompt` and reads one line; `None` at end of input.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    stdout().flush().ok();
    next_line(&mut stdin().lock())
}

fn next_line<B: BufRead>(input: &mut B) -> Result<Option<String>> {
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s))
}
