use cardwise_core::DateRange;
use cardwise_json::{StoreOptions, DEFAULT_MAX_BACKUPS};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "cardwise", version, about = "Cardwise spaced-repetition flashcards (CLI/TUI)")]
pub struct Cli {
    /// Directory holding decks.json, cards.json and review_logs.json (defaults to app data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Timestamped backups kept per collection
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BACKUPS)]
    pub max_backups: usize,

    #[command(subcommand)]
    pub cmd: Command,
}

impl Cli {
    pub fn store_options(&self) -> StoreOptions {
        let mut opts = match &self.data_dir {
            Some(dir) => StoreOptions::in_dir(dir),
            None => StoreOptions::default(),
        };
        opts.max_backups = self.max_backups;
        opts
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Deck operations
    #[command(subcommand)]
    Deck(DeckCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Study the due cards of a deck
    Study(StudyCmd),
    /// Show study statistics
    Stats(StatsCmd),
    /// Export data
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import data
    #[command(subcommand)]
    Import(ImportCmd),
    /// Launch Terminal UI
    Tui,
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List,
    Edit {
        deck: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Rm { deck: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        deck: Option<String>,
        /// Case-insensitive match on front or back
        #[arg(long)]
        search: Option<String>,
        /// Only cards due now
        #[arg(long)]
        due: bool,
    },
    Edit(CardEdit),
    Rm { card_id: String },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub deck: String,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    #[arg(long)]
    pub deck: String,
    #[arg(long, default_value_t = 50)]
    pub max: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Week,
    Month,
    Year,
}

impl From<RangeArg> for DateRange {
    fn from(r: RangeArg) -> Self {
        match r {
            RangeArg::Week => DateRange::Week,
            RangeArg::Month => DateRange::Month,
            RangeArg::Year => DateRange::Year,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct StatsCmd {
    #[arg(long)]
    pub deck: Option<String>,
    #[arg(long, value_enum, default_value_t = RangeArg::Week)]
    pub range: RangeArg,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf, #[arg(long)] deck: Option<String> },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    /// Import an export bundle; cards already present in their deck are skipped
    Json { path: PathBuf },
    /// Import deck,front,back rows; rows with no deck need --deck or are skipped
    Csv { path: PathBuf, #[arg(long)] deck: Option<String> },
}
