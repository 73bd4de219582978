//! Merging an imported snapshot into stored collections.
//!
//! Entry conflicts use a single policy, **newest wins**: an imported entry
//! replaces the stored entry with the same id only when its revision time
//! (the later of `timestamp` and `updatedAt`) is strictly newer. Goals merge by
//! id presence and the stored goal always wins. Settings are a shallow overlay.
//!
//! Entries merge as raw records, so fields of a stored entry are written back
//! exactly as they were read.

use crate::model::entry::{record_revision_time, sort_newest_first};
use crate::model::value_id;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Counts of what a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Imported entries whose id was new
    pub entries_added: usize,
    /// Stored entries replaced by a newer imported copy
    pub entries_updated: usize,
    /// Imported goals appended
    pub goals_added: usize,
    /// Settings keys written by the overlay
    pub settings_applied: usize,
}

impl MergeReport {
    /// Whether the merge changed anything at all.
    pub fn is_noop(&self) -> bool {
        self.entries_added == 0 && self.entries_updated == 0 && self.goals_added == 0
    }
}

/// Merges imported entry records into stored ones and sorts the result newest
/// first.
///
/// Records without an id are kept on the stored side and skipped on the
/// imported side. Returns the merged collection plus `(added, updated)` counts.
pub fn merge_entries(stored: Vec<Value>, imported: Vec<Value>) -> (Vec<Value>, usize, usize) {
    let mut merged = stored;
    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(index, record)| value_id(record).map(|id| (id, index)))
        .collect();
    let (mut added, mut updated) = (0, 0);

    for incoming in imported {
        let Some(id) = value_id(&incoming) else {
            continue;
        };
        match positions.get(&id) {
            Some(&index) => {
                if record_revision_time(&incoming) > record_revision_time(&merged[index]) {
                    merged[index] = incoming;
                    updated += 1;
                }
            }
            None => {
                positions.insert(id, merged.len());
                merged.push(incoming);
                added += 1;
            }
        }
    }

    sort_newest_first(&mut merged);
    (merged, added, updated)
}

/// Appends imported goals whose id is not stored yet.
///
/// Goals without an id are appended unless an identical record already exists.
/// Returns the merged list and how many goals were added.
pub fn merge_goals(stored: Vec<Value>, imported: Vec<Value>) -> (Vec<Value>, usize) {
    let mut merged = stored;
    let mut added = 0;

    for incoming in imported {
        let exists = match value_id(&incoming) {
            Some(id) => merged
                .iter()
                .any(|goal| value_id(goal).as_deref() == Some(id.as_str())),
            None => merged.contains(&incoming),
        };
        if !exists {
            merged.push(incoming);
            added += 1;
        }
    }

    (merged, added)
}

/// Overlays imported settings onto stored ones; imported keys win.
pub fn merge_settings(
    stored: Map<String, Value>,
    imported: Map<String, Value>,
) -> (Map<String, Value>, usize) {
    let mut merged = stored;
    let applied = imported.len();
    for (key, value) in imported {
        merged.insert(key, value);
    }
    (merged, applied)
}
