/*!
# codemood - A Developer Mood Journal

This file contains the main application flow: it initialises logging, parses
the command line, builds the application context and dispatches the command.

## Usage

```text
codemood [OPTIONS] <COMMAND>

Commands:
  entry     Write, list, edit or delete journal entries
  goal      Manage goals
  mood      Set or show the current mood
  theme     Switch between light and dark theme
  draft     Keep unfinished writing around
  pomodoro  Track focus sessions
  token     Store or forget the GitHub token
  get       Print the decoded value stored under a key
  set       Store a JSON value under a key
  export    Export all data to a dated snapshot file
  import    Merge a snapshot file into the journal
  prune     Reclaim space by dropping old entries, drafts and completed goals
  status    Show storage usage and the last backup time
  watch     Run the periodic backup worker until interrupted

Options:
  -v, --verbose                  Print verbose output
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
```

## Configuration

See [`codemood::config`] for the `CODEMOOD_*` environment variables.
*/

use chrono::Utc;
use codemood::cli::{
    CliArgs, Command, DraftCommand, EntryCommand, GoalCommand, MoodCommand, PomodoroCommand,
    ThemeCommand, TokenCommand,
};
use codemood::config::Config;
use codemood::constants::{
    DEFAULT_LOG_LEVEL, KEY_LAST_BACKUP, KNOWN_KEYS, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use codemood::context::AppContext;
use codemood::errors::{AppError, AppResult};
use codemood::notify::{ConsoleNotifier, Notifier};
use codemood::ops::{self, journal, scheduler};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
fn init_tracing(args: &CliArgs) {
    let default_level = if args.verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if args.json_logs() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse_args();
    init_tracing(&args);

    let correlation_id = Uuid::new_v4();
    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );

    async move {
        info!("Starting codemood");
        debug!("CLI arguments: {:?}", args);

        match run(args).await {
            Ok(code) => code,
            Err(e) => {
                error!("Command failed: {}", e);
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }
    .instrument(span)
    .await
}

fn warn_unknown_key(key: &str) {
    if !KNOWN_KEYS.contains(&key) {
        warn!("'{}' is not a key codemood uses", key);
    }
}

fn status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Loads configuration, builds the context and runs one command.
async fn run(args: CliArgs) -> AppResult<ExitCode> {
    info!("Loading configuration");
    let config = Config::load()?;
    let mut context = AppContext::open(config, Arc::new(ConsoleNotifier))?;
    let now = Utc::now();

    let code = match args.command {
        Command::Entry(command) => {
            let mut store = context.store().lock().await;
            match command {
                EntryCommand::Add(entry) => {
                    let mood = entry.mood.unwrap_or_else(|| journal::current_mood(&store));
                    match journal::save_entry(&mut store, &entry.content, mood, &entry.tags, now)?
                    {
                        Some(saved) => context
                            .notifier()
                            .success(&format!("Saved entry {} {}", saved.id, mood)),
                        None => context.notifier().failure("Nothing to save: entry is empty"),
                    }
                }
                EntryCommand::List { limit } => {
                    for entry in journal::list_entries(&store, limit) {
                        let tags: Vec<String> =
                            entry.tags.iter().map(|tag| format!("#{}", tag)).collect();
                        println!(
                            "{}  {}  {}  {} {}",
                            entry.id,
                            entry.timestamp,
                            entry.mood.as_deref().unwrap_or(" "),
                            entry.content,
                            tags.join(" ")
                        );
                    }
                }
                EntryCommand::Edit { id, content } => {
                    journal::update_entry(&mut store, &id, &content, now)?;
                    context.notifier().success(&format!("Updated entry {}", id));
                }
                EntryCommand::Delete { id } => {
                    journal::delete_entry(&mut store, &id, now)?;
                    context.notifier().success(&format!("Deleted entry {}", id));
                }
            }
            ExitCode::SUCCESS
        }
        Command::Goal(command) => {
            let mut store = context.store().lock().await;
            match command {
                GoalCommand::Add { text } => {
                    let goal = journal::add_goal(&mut store, &text, now)?;
                    context
                        .notifier()
                        .success(&format!("Added goal {}", goal.id));
                }
                GoalCommand::Toggle { id } => {
                    let goal = journal::toggle_goal(&mut store, &id, now)?;
                    let state = if goal.completed { "completed" } else { "open" };
                    context
                        .notifier()
                        .success(&format!("Goal {} is now {}", goal.id, state));
                }
                GoalCommand::Remove { id } => {
                    journal::remove_goal(&mut store, &id, now)?;
                    context.notifier().success(&format!("Removed goal {}", id));
                }
                GoalCommand::List => {
                    for goal in journal::list_goals(&store) {
                        let mark = if goal.completed { "x" } else { " " };
                        println!("[{}] {}  {}", mark, goal.id, goal.text);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Command::Mood(command) => {
            let mut store = context.store().lock().await;
            match command {
                MoodCommand::Set { mood } => {
                    journal::set_mood(&mut store, mood, now)?;
                    context
                        .notifier()
                        .success(&format!("Mood set to {} {}", mood, mood.name()));
                }
                MoodCommand::Show => {
                    let mood = journal::current_mood(&store);
                    println!("{} {}", mood, mood.name());
                }
            }
            ExitCode::SUCCESS
        }
        Command::Theme(ThemeCommand::Toggle) => {
            let mut store = context.store().lock().await;
            let enabled = journal::toggle_dark_mode(&mut store, now)?;
            let theme = if enabled { "dark" } else { "light" };
            context
                .notifier()
                .success(&format!("Switched to {} theme", theme));
            ExitCode::SUCCESS
        }
        Command::Draft(DraftCommand::Save { content }) => {
            let mut store = context.store().lock().await;
            let draft = journal::save_draft(&mut store, &content, now)?;
            context
                .notifier()
                .success(&format!("Saved draft {}", draft.id));
            ExitCode::SUCCESS
        }
        Command::Pomodoro(PomodoroCommand::Record { minutes }) => {
            let mut store = context.store().lock().await;
            let stats = journal::record_pomodoro(&mut store, minutes, now)?;
            context.notifier().success(&format!(
                "Recorded session: {} sessions, {} focus minutes in total",
                stats.completed_sessions, stats.total_focus_minutes
            ));
            ExitCode::SUCCESS
        }
        Command::Token(command) => {
            let mut store = context.store().lock().await;
            match command {
                TokenCommand::Set { token } => {
                    journal::set_github_token(&mut store, &token, now)?;
                    context.notifier().success("GitHub token stored");
                    ExitCode::SUCCESS
                }
                TokenCommand::Clear => {
                    let cleared = journal::clear_github_token(&mut store);
                    if cleared {
                        context.notifier().success("GitHub token cleared");
                    } else {
                        context.notifier().failure("Failed to clear GitHub token");
                    }
                    status(cleared)
                }
            }
        }
        Command::Get { key } => {
            warn_unknown_key(&key);
            let store = context.store().lock().await;
            match store.get(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => {
                    return Err(AppError::Journal(format!(
                        "No value stored under '{}'",
                        key
                    )))
                }
            }
            ExitCode::SUCCESS
        }
        Command::Set { key, value } => {
            warn_unknown_key(&key);
            let value: serde_json::Value = serde_json::from_str(&value)?;
            let mut store = context.store().lock().await;
            store.try_set_at(&key, &value, now)?;
            context.notifier().success(&format!("Stored '{}'", key));
            ExitCode::SUCCESS
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| context.config().backup_dir.clone());
            status(ops::export_with_notice(context.store(), &dir, context.notifier()).await)
        }
        Command::Import { path } => {
            status(ops::import_with_notice(context.store(), &path, context.notifier()).await)
        }
        Command::Prune => {
            let mut store = context.store().lock().await;
            let report = store.reclaim_at(now)?;
            context.notifier().success(&format!(
                "Reclaimed {} records ({} entries, {} drafts, {} goals)",
                report.total(),
                report.entries_removed,
                report.drafts_removed,
                report.goals_removed
            ));
            ExitCode::SUCCESS
        }
        Command::Status => {
            let store = context.store().lock().await;
            let limit = store.limits().storage_limit;
            let used = store.usage()?;
            println!("Storage: {} / {} bytes", used, limit);
            println!("Entries: {}", store.entries().len());
            println!("Goals: {}", store.goals().len());
            match scheduler::last_backup_time(store.get(KEY_LAST_BACKUP).as_ref()) {
                Some(time) => println!("Last backup: {}", time.to_rfc3339()),
                None => println!("Last backup: never"),
            }
            ExitCode::SUCCESS
        }
        Command::Watch => {
            context.start_backup_worker();
            println!(
                "Backing up to {} every {} hours; press Ctrl-C to stop",
                context.config().backup_dir.display(),
                context.config().backup_interval_hours
            );
            tokio::signal::ctrl_c().await?;
            info!("Interrupt received, stopping backup worker");
            context.shutdown().await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    context.shutdown().await?;
    Ok(code)
}
