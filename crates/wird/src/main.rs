//! wird - daily reading companion
//!
//! Command-line front end for the progress engine. It wires together:
//! - Configuration loading
//! - Store initialization
//! - Chapter catalog
//! - Progress engine

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wird_api::{ChallengeView, DayState, GoalView, HabitPlanView, PlanScope, StreakView};
use wird_config::{Settings, load_config_or_default};
use wird_core::{
    CoreEvent, NewChallenge, NewGoal, NewHabitPlan, ProgressEngine,
    StaticCatalog,
};
use wird_store::{SqliteStore, Store};
use wird_util::{ChapterId, GoalId, PlanId, config_path_without_env};

/// wird - Track reading challenges, habit plans and daily streaks
#[derive(Parser, Debug)]
#[command(name = "wird")]
#[command(about = "Track reading challenges, habit plans and daily streaks", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/wird/config.toml)
    #[arg(short, long, env = "WIRD_CONFIG", default_value_os_t = config_path_without_env())]
    config: PathBuf,

    /// Data directory override (or set WIRD_DATA_DIR env var)
    #[arg(short, long, env = "WIRD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Day-by-day reading challenges
    Challenge {
        #[command(subcommand)]
        action: ChallengeAction,
    },

    /// Habit checklists
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Cumulative reading goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Show the daily streak
    Streak,

    /// List or search chapters
    Chapters {
        /// Name fragment or chapter number
        query: Option<String>,
    },
}

/// What a challenge or goal covers
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ScopeArgs {
    /// Cover the whole book
    #[arg(long)]
    whole_book: bool,

    /// Cover a single chapter
    #[arg(long, value_name = "ID")]
    chapter: Option<u32>,
}

impl ScopeArgs {
    fn resolve(&self) -> (PlanScope, Option<ChapterId>) {
        match self.chapter {
            Some(id) => (PlanScope::SingleChapter, Some(ChapterId::new(id))),
            None => (PlanScope::WholeBook, None),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ChallengeAction {
    /// Create a challenge
    New {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Number of days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },
    List,
    Show { id: String },
    /// Mark a day done, or undo it
    Toggle { id: String, day: u32 },
    /// Start the next cycle of a completed challenge
    Restart { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum HabitAction {
    /// Create a habit plan
    New {
        #[arg(long)]
        title: String,

        /// Habit to track; repeat for several
        #[arg(long = "habit", required = true)]
        habits: Vec<String>,

        /// Number of days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },
    List,
    Show { id: String },
    /// Check a habit on a day, or undo it
    Toggle { id: String, day: u32, habit: usize },
    /// Start the next cycle of a completed plan
    Restart { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum GoalAction {
    /// Add a goal
    Add {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Number of days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },
    List {
        /// Include completed goals
        #[arg(long)]
        all: bool,
    },
    /// Record today's reading for a goal
    Progress { id: String },
    Delete { id: String },
}

struct App {
    engine: ProgressEngine,
    json: bool,
}

impl App {
    fn open(args: &Args) -> Result<Self> {
        let mut settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(data_dir) = &args.data_dir {
            settings.storage.data_dir = data_dir.clone();
        }

        std::fs::create_dir_all(&settings.storage.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {:?}",
                settings.storage.data_dir
            )
        })?;

        let db_path = settings.storage.database_path();
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        let catalog = build_catalog(&settings)?;
        let engine = ProgressEngine::new(store, settings, Arc::new(catalog))
            .context("Failed to load saved progress")?;

        Ok(Self {
            engine,
            json: args.json,
        })
    }

    fn default_days(&self) -> u32 {
        self.engine.settings().plans.default_duration_days
    }

    fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Challenge { action } => self.challenge(action),
            Command::Habit { action } => self.habit(action),
            Command::Goal { action } => self.goal(action),
            Command::Streak => {
                let view = self.engine.streak_view(wird_util::today());
                self.show(&view, print_streak)
            }
            Command::Chapters { query } => {
                let chapters = self.engine.catalog().search(query.as_deref().unwrap_or(""));
                if self.json {
                    return print_json(&chapters);
                }
                if chapters.is_empty() {
                    println!("No chapters found");
                }
                for chapter in chapters {
                    println!(
                        "{:>3}. {} (pages {}-{})",
                        chapter.id.get(),
                        chapter.name,
                        chapter.pages.0,
                        chapter.pages.1
                    );
                }
                Ok(())
            }
        }
    }

    fn challenge(&mut self, action: ChallengeAction) -> Result<()> {
        let now = wird_util::now();

        match action {
            ChallengeAction::New { scope, days } => {
                let (scope, chapter) = scope.resolve();
                let request = NewChallenge {
                    scope,
                    chapter,
                    duration: days.unwrap_or(self.default_days()),
                };
                let id = self.engine.create_challenge(request, now)?;
                match self.engine.challenge_view(&id) {
                    Some(view) => self.show(&view, print_challenge_summary),
                    None => Ok(()),
                }
            }
            ChallengeAction::List => {
                let views = self.engine.challenge_views();
                if self.json {
                    return print_json(&views);
                }
                if views.is_empty() {
                    println!("No challenges yet");
                }
                views.iter().for_each(print_challenge_summary);
                Ok(())
            }
            ChallengeAction::Show { id } => {
                let id = PlanId::new(id);
                let Some(view) = self.engine.challenge_view(&id) else {
                    bail!("No challenge with id {}", id);
                };
                self.show(&view, print_challenge)
            }
            ChallengeAction::Toggle { id, day } => {
                let events = self
                    .engine
                    .toggle_challenge_day(&PlanId::new(id), day_index(day)?)?;
                print_events(&events);
                Ok(())
            }
            ChallengeAction::Restart { id } => {
                let events = self.engine.finish_challenge(&PlanId::new(id), now)?;
                print_events(&events);
                Ok(())
            }
            ChallengeAction::Delete { id } => {
                let events = self.engine.delete_challenge(&PlanId::new(id))?;
                print_events(&events);
                Ok(())
            }
        }
    }

    fn habit(&mut self, action: HabitAction) -> Result<()> {
        let now = wird_util::now();

        match action {
            HabitAction::New {
                title,
                habits,
                days,
            } => {
                let request = NewHabitPlan {
                    title,
                    habits,
                    duration: days.unwrap_or(self.default_days()),
                };
                let id = self.engine.create_habit_plan(request, now)?;
                match self.engine.habit_view(&id) {
                    Some(view) => self.show(&view, print_habit_summary),
                    None => Ok(()),
                }
            }
            HabitAction::List => {
                let views = self.engine.habit_views();
                if self.json {
                    return print_json(&views);
                }
                if views.is_empty() {
                    println!("No habit plans yet");
                }
                views.iter().for_each(print_habit_summary);
                Ok(())
            }
            HabitAction::Show { id } => {
                let id = PlanId::new(id);
                let Some(view) = self.engine.habit_view(&id) else {
                    bail!("No habit plan with id {}", id);
                };
                self.show(&view, print_habit_plan)
            }
            HabitAction::Toggle { id, day, habit } => {
                let habit = habit
                    .checked_sub(1)
                    .context("Habits are numbered from 1")?;
                let events = self
                    .engine
                    .toggle_habit(&PlanId::new(id), day_index(day)?, habit)?;
                print_events(&events);
                Ok(())
            }
            HabitAction::Restart { id } => {
                let events = self.engine.finish_habit_plan(&PlanId::new(id), now)?;
                print_events(&events);
                Ok(())
            }
            HabitAction::Delete { id } => {
                let events = self.engine.delete_habit_plan(&PlanId::new(id))?;
                print_events(&events);
                Ok(())
            }
        }
    }

    fn goal(&mut self, action: GoalAction) -> Result<()> {
        match action {
            GoalAction::Add { scope, days } => {
                let (scope, chapter) = scope.resolve();
                let request = NewGoal {
                    scope,
                    chapter,
                    duration_days: days.unwrap_or(self.default_days()),
                };
                let id = self.engine.add_goal(request, wird_util::now())?;
                match self.engine.goal_view(&id) {
                    Some(view) => self.show(&view, print_goal),
                    None => Ok(()),
                }
            }
            GoalAction::List { all } => {
                let views = if all {
                    self.engine.goals().views()
                } else {
                    self.engine.active_goal_views()
                };
                if self.json {
                    return print_json(&views);
                }
                if views.is_empty() {
                    println!("No goals in progress");
                }
                views.iter().for_each(print_goal);
                Ok(())
            }
            GoalAction::Progress { id } => {
                let events = self
                    .engine
                    .mark_daily_progress(&GoalId::new(id), wird_util::today())?;
                print_events(&events);
                Ok(())
            }
            GoalAction::Delete { id } => {
                let events = self.engine.delete_goal(&GoalId::new(id))?;
                print_events(&events);
                Ok(())
            }
        }
    }

    fn show<T: Serialize>(&self, value: &T, print: fn(&T)) -> Result<()> {
        if self.json {
            print_json(value)
        } else {
            print(value);
            Ok(())
        }
    }
}

fn build_catalog(settings: &Settings) -> Result<StaticCatalog> {
    let mut catalog = match &settings.storage.catalog_path {
        Some(path) => StaticCatalog::load(path)
            .with_context(|| format!("Failed to load chapter catalog {:?}", path))?,
        None => StaticCatalog::default(),
    };

    // Inline entries take precedence over the catalog file
    catalog.merge(StaticCatalog::new(settings.chapters.iter().cloned()));
    debug!(chapters = catalog.len(), "Chapter catalog ready");
    Ok(catalog)
}

/// Convert a 1-based day number from the command line
fn day_index(day: u32) -> Result<u32> {
    day.checked_sub(1).context("Days are numbered from 1")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

fn print_events(events: &[CoreEvent]) {
    for event in events {
        println!("{}", event);
    }
}

fn print_challenge_summary(view: &ChallengeView) {
    println!(
        "{}  {}  {}/{} days ({}%)  cycles: {}",
        view.id,
        view.title,
        view.completed_days,
        view.duration,
        view.percent,
        view.cycles_completed
    );
}

fn print_challenge(view: &ChallengeView) {
    print_challenge_summary(view);
    println!(
        "  started {}",
        wird_util::format_datetime_full(&view.start_date)
    );

    for day in &view.days {
        let mark = match day.state {
            DayState::Completed => "[x]",
            DayState::Unlocked => "[ ]",
            DayState::Locked => "[-]",
        };
        println!(
            "  {} Day {:>3}  {}  ({})",
            mark,
            day.index + 1,
            day.label,
            day.subtext
        );
    }
}

fn print_habit_summary(view: &HabitPlanView) {
    println!(
        "{}  {}  {} habit(s) x {} days ({}%)  cycles: {}",
        view.id,
        view.title,
        view.habits.len(),
        view.duration,
        view.percent,
        view.cycles_completed
    );
}

fn print_habit_plan(view: &HabitPlanView) {
    print_habit_summary(view);
    for (i, habit) in view.habits.iter().enumerate() {
        println!("  {}. {}", i + 1, habit);
    }

    for day in &view.days {
        let marks: Vec<&str> = day
            .checked
            .iter()
            .map(|checked| if *checked { "x" } else { " " })
            .collect();
        let done = if day.fully_checked { "  done" } else { "" };
        println!("  Day {:>3}  [{}]{}", day.index + 1, marks.join("]["), done);
    }
}

fn print_goal(view: &GoalView) {
    let status = if view.is_completed {
        "completed".to_string()
    } else {
        format!(
            "next page {}, {} page(s) a day",
            view.next_unit, view.daily_target_units
        )
    };
    println!(
        "{}  {}  {}/{} pages ({}%)  {}",
        view.id, view.title, view.completed_units, view.total_units, view.percent, status
    );
}

fn print_streak(view: &StreakView) {
    match view.last_streak_date {
        Some(last) if view.alive => println!(
            "Streak: {} day(s), last activity {}",
            view.count,
            wird_util::format_date(last)
        ),
        Some(last) => println!(
            "Streak broken (was {} day(s), last activity {})",
            view.count,
            wird_util::format_date(last)
        ),
        None => println!("No activity recorded yet"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "wird starting");

    if wird_util::is_mock_time_active() {
        warn!(
            now = %wird_util::format_datetime_full(&wird_util::now()),
            "Mock time active"
        );
    }

    let mut app = App::open(&args)?;
    app.run(args.command)
}
