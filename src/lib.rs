/*!
# codemood

codemood is a developer mood journal: journal entries tagged with a mood,
a goal list, drafts, a theme flag and Pomodoro counters, all kept in a small
local key-value store with a fixed size budget.

## Core Features

- A persistent store with a reversible record encoding, a storage budget with
  reclamation, and validation plus salvage-and-rebuild on open
- Snapshot export to dated JSON files and import with a newest-wins merge
- A periodic background backup worker
- Journal operations for entries, goals, mood, theme, drafts and Pomodoro sessions

## Architecture

- `store`: the `Store` façade over a `Medium`, with encoding and capacity policy
- `model`: entries, goals, moods, drafts and snapshots
- `ops`: journal operations, export/import/merge and the backup worker
- `context`: the `AppContext` owning config, store and notifier
- `notify`: user-facing success and failure notices
- `cli`, `config`, `constants`, `errors`: the application shell

## Usage Example

```rust,no_run
use codemood::ops::journal;
use codemood::{Config, Mood};
use codemood::context::AppContext;
use codemood::notify::ConsoleNotifier;
use std::sync::Arc;

#[tokio::main]
async fn main() -> codemood::AppResult<()> {
    let config = Config::load()?;
    let context = AppContext::open(config, Arc::new(ConsoleNotifier))?;

    let mut store = context.store().lock().await;
    journal::save_entry(&mut store, "Shipped it", Mood::Productive, &[], chrono::Utc::now())?;
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Explicitly constructed application state
pub mod context;
/// Error types and utilities for error handling
pub mod errors;
/// Journal data types
pub mod model;
/// Success and failure notices
pub mod notify;
/// High-level operations
pub mod ops;
/// Persistent key-value store
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use context::AppContext;
pub use errors::{AppError, AppResult};
pub use model::{Entry, Goal, Mood, Snapshot};
pub use store::{SharedStore, Store, StoreLimits};
