//! Everyday journal operations: entries, goals, mood, theme, drafts,
//! Pomodoro counters and the GitHub token.
//!
//! Each function is one read-modify-write against the store. Callers holding
//! a `SharedStore` should keep the lock for the whole call.

use crate::constants::{
    KEY_CURRENT_MOOD, KEY_DARK_MODE, KEY_DRAFTS, KEY_GITHUB_TOKEN, KEY_GOALS, KEY_JOURNAL_ENTRIES,
    KEY_POMODORO_STATS,
};
use crate::errors::{AppError, AppResult};
use crate::model::{value_id, Draft, Entry, Goal, Mood, PomodoroStats};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

fn stored_array(store: &Store, key: &str) -> Vec<Value> {
    match store.get(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn write(store: &mut Store, key: &str, value: Value, now: DateTime<Utc>) -> AppResult<()> {
    store.try_set_at(key, &value, now)
}

/// Saves a new journal entry at the front of the list.
///
/// Returns `Ok(None)` without writing anything when `content` is blank.
///
/// # Errors
///
/// Returns an error if the entry cannot be stored.
pub fn save_entry(
    store: &mut Store,
    content: &str,
    mood: Mood,
    tags: &[String],
    now: DateTime<Utc>,
) -> AppResult<Option<Entry>> {
    if content.trim().is_empty() {
        debug!("Ignoring empty journal entry");
        return Ok(None);
    }

    let entry = Entry::new(content, Some(mood.emoji()), tags, now.to_rfc3339());
    let mut entries = stored_array(store, KEY_JOURNAL_ENTRIES);
    entries.insert(0, serde_json::to_value(&entry)?);
    write(store, KEY_JOURNAL_ENTRIES, Value::Array(entries), now)?;

    info!("Saved journal entry with {} tags", entry.tags.len());
    Ok(Some(entry))
}

/// Replaces an entry's content, stamping `updatedAt`. `timestamp` is unchanged.
///
/// # Errors
///
/// Returns `AppError::Journal` if no entry has `id`.
pub fn update_entry(
    store: &mut Store,
    id: &str,
    content: &str,
    now: DateTime<Utc>,
) -> AppResult<Entry> {
    let mut entries = store.entry_records();
    let record = entries
        .iter_mut()
        .find(|record| value_id(record).as_deref() == Some(id))
        .ok_or_else(|| AppError::Journal(format!("No journal entry with id '{}'", id)))?;
    if let Value::Object(fields) = &mut *record {
        fields.insert("content".to_string(), Value::String(content.to_string()));
        fields.insert("updatedAt".to_string(), Value::String(now.to_rfc3339()));
    }
    let updated = Entry::from_value(&*record)
        .ok_or_else(|| AppError::Journal(format!("Journal entry '{}' is malformed", id)))?;

    write(store, KEY_JOURNAL_ENTRIES, Value::Array(entries), now)?;
    Ok(updated)
}

/// Deletes an entry.
///
/// # Errors
///
/// Returns `AppError::Journal` if no entry has `id`.
pub fn delete_entry(store: &mut Store, id: &str, now: DateTime<Utc>) -> AppResult<()> {
    let mut entries = stored_array(store, KEY_JOURNAL_ENTRIES);
    let before = entries.len();
    entries.retain(|entry| value_id(entry).as_deref() != Some(id));
    if entries.len() == before {
        return Err(AppError::Journal(format!("No journal entry with id '{}'", id)));
    }
    write(store, KEY_JOURNAL_ENTRIES, Value::Array(entries), now)
}

/// The newest `limit` entries, or all of them.
pub fn list_entries(store: &Store, limit: Option<usize>) -> Vec<Entry> {
    let mut entries = store.entries();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// Adds an open goal at the end of the list.
///
/// # Errors
///
/// Returns `AppError::Journal` for blank text, or a storage error.
pub fn add_goal(store: &mut Store, text: &str, now: DateTime<Utc>) -> AppResult<Goal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Journal("Goal text cannot be empty".to_string()));
    }

    let goal = Goal::new(text);
    let mut goals = stored_array(store, KEY_GOALS);
    goals.push(serde_json::to_value(&goal)?);
    write(store, KEY_GOALS, Value::Array(goals), now)?;
    Ok(goal)
}

/// Flips a goal between open and completed.
///
/// # Errors
///
/// Returns `AppError::Journal` if no goal has `id`.
pub fn toggle_goal(store: &mut Store, id: &str, now: DateTime<Utc>) -> AppResult<Goal> {
    let mut goals = stored_array(store, KEY_GOALS);
    let mut toggled = None;
    for raw in goals.iter_mut() {
        if value_id(raw).as_deref() != Some(id) {
            continue;
        }
        let mut goal = Goal::from_value(raw)
            .ok_or_else(|| AppError::Journal(format!("Goal '{}' is malformed", id)))?;
        goal.toggle(now);
        *raw = serde_json::to_value(&goal)?;
        toggled = Some(goal);
        break;
    }

    let goal = toggled.ok_or_else(|| AppError::Journal(format!("No goal with id '{}'", id)))?;
    write(store, KEY_GOALS, Value::Array(goals), now)?;
    Ok(goal)
}

/// Deletes a goal.
///
/// # Errors
///
/// Returns `AppError::Journal` if no goal has `id`.
pub fn remove_goal(store: &mut Store, id: &str, now: DateTime<Utc>) -> AppResult<()> {
    let mut goals = stored_array(store, KEY_GOALS);
    let before = goals.len();
    goals.retain(|goal| value_id(goal).as_deref() != Some(id));
    if goals.len() == before {
        return Err(AppError::Journal(format!("No goal with id '{}'", id)));
    }
    write(store, KEY_GOALS, Value::Array(goals), now)
}

/// Goals that parse, in stored order.
pub fn list_goals(store: &Store) -> Vec<Goal> {
    store.goals().iter().filter_map(Goal::from_value).collect()
}

/// Stores the picker's current mood.
pub fn set_mood(store: &mut Store, mood: Mood, now: DateTime<Utc>) -> AppResult<()> {
    write(store, KEY_CURRENT_MOOD, Value::from(mood.index()), now)
}

/// The picker's current mood, defaulting to the first mood.
///
/// Accepts the index form this crate writes as well as a stringified index.
pub fn current_mood(store: &Store) -> Mood {
    let index = match store.get(KEY_CURRENT_MOOD) {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    index.and_then(Mood::from_index).unwrap_or_default()
}

/// Whether the dark theme is on.
pub fn dark_mode(store: &Store) -> bool {
    match store.get(KEY_DARK_MODE) {
        Some(Value::Bool(enabled)) => enabled,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Flips the theme and returns the new state.
pub fn toggle_dark_mode(store: &mut Store, now: DateTime<Utc>) -> AppResult<bool> {
    let enabled = !dark_mode(store);
    write(store, KEY_DARK_MODE, Value::Bool(enabled), now)?;
    Ok(enabled)
}

/// Saves a draft at the front of the draft list; older drafts past the limit
/// fall off.
pub fn save_draft(store: &mut Store, content: &str, now: DateTime<Utc>) -> AppResult<Draft> {
    let draft = Draft::new(content, now.to_rfc3339());
    let mut drafts = stored_array(store, KEY_DRAFTS);
    drafts.insert(0, serde_json::to_value(&draft)?);
    write(store, KEY_DRAFTS, Value::Array(drafts), now)?;
    Ok(draft)
}

/// Records a finished Pomodoro session of `minutes`.
pub fn record_pomodoro(
    store: &mut Store,
    minutes: u64,
    now: DateTime<Utc>,
) -> AppResult<PomodoroStats> {
    let mut stats: PomodoroStats = store.get_as(KEY_POMODORO_STATS).unwrap_or_default();
    stats.completed_sessions += 1;
    stats.total_focus_minutes += minutes;
    stats.last_session_at = Some(now.to_rfc3339());
    write(store, KEY_POMODORO_STATS, serde_json::to_value(&stats)?, now)?;
    Ok(stats)
}

/// Stores the GitHub token. The record is only base64-encoded, not encrypted.
pub fn set_github_token(store: &mut Store, token: &str, now: DateTime<Utc>) -> AppResult<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Journal("GitHub token cannot be empty".to_string()));
    }
    write(store, KEY_GITHUB_TOKEN, Value::String(token.to_string()), now)?;
    info!("GitHub token stored");
    Ok(())
}

/// Forgets the GitHub token.
pub fn clear_github_token(store: &mut Store) -> bool {
    store.remove(KEY_GITHUB_TOKEN)
}
