//! Per-character dungeon progress

use raidtrack_api::{Dungeon, ProgressAggregate, RunRecord};
use raidtrack_util::{CharacterId, DungeonId};
use serde::Serialize;
use std::collections::HashMap;

/// Derived state of one (character, dungeon) pair for the current period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonProgress {
    /// Runs completed in the current reset period
    pub entries_count: u32,
    avg_clear_seconds: Option<f64>,
}

impl DungeonProgress {
    /// Non-positive or non-finite averages carry no usable estimate and are
    /// stored as absent.
    pub fn new(entries_count: u32, avg_clear_seconds: Option<f64>) -> Self {
        Self {
            entries_count,
            avg_clear_seconds: avg_clear_seconds.filter(|s| s.is_finite() && *s > 0.0),
        }
    }

    pub fn from_aggregate(aggregate: &ProgressAggregate) -> Self {
        Self::new(aggregate.entries_count, aggregate.avg_clear_seconds)
    }

    /// Historical mean clear time, if any usable one exists
    pub fn avg_clear_seconds(&self) -> Option<f64> {
        self.avg_clear_seconds
    }

    /// Classify what this progress says about the time a run takes
    pub fn estimate(&self, dungeon: &Dungeon) -> ClearEstimate {
        if dungeon.quota.is_none() {
            return ClearEstimate::Untracked;
        }
        match self.avg_clear_seconds {
            Some(avg_seconds) => ClearEstimate::Ran { avg_seconds },
            None => ClearEstimate::NotYetRun,
        }
    }
}

/// Clear-time knowledge for a (character, dungeon) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClearEstimate {
    /// Dungeon has no quota; runs are not counted
    Untracked,
    /// Tracked, but no completed run has a recorded duration yet
    NotYetRun,
    /// Tracked, with a positive historical mean
    Ran { avg_seconds: f64 },
}

/// Reduce one character's completed runs into progress for `dungeon`.
/// Records for other dungeons are ignored.
pub fn aggregate(dungeon: &Dungeon, runs: &[RunRecord]) -> DungeonProgress {
    let durations: Vec<f64> = runs
        .iter()
        .filter(|run| run.dungeon_id == dungeon.id)
        .map(|run| run.duration_seconds)
        .collect();

    DungeonProgress::new(durations.len() as u32, mean(&durations))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Progress for every (character, dungeon) pair the backend reported.
/// Pairs without a record read as zero entries and no history.
#[derive(Debug, Clone, Default)]
pub struct ProgressBook {
    entries: HashMap<(CharacterId, DungeonId), DungeonProgress>,
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from backend aggregates. A later record for the same pair wins.
    pub fn from_aggregates<'a>(aggregates: impl IntoIterator<Item = &'a ProgressAggregate>) -> Self {
        let mut book = Self::new();
        for aggregate in aggregates {
            book.insert(
                aggregate.character_id.clone(),
                aggregate.dungeon_id.clone(),
                DungeonProgress::from_aggregate(aggregate),
            );
        }
        book
    }

    /// Build from raw run records, grouping by character and dungeon
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let mut grouped: HashMap<(CharacterId, DungeonId), Vec<f64>> = HashMap::new();
        for run in runs {
            grouped
                .entry((run.character_id.clone(), run.dungeon_id.clone()))
                .or_default()
                .push(run.duration_seconds);
        }

        let entries = grouped
            .into_iter()
            .map(|(key, durations)| {
                let progress = DungeonProgress::new(durations.len() as u32, mean(&durations));
                (key, progress)
            })
            .collect();

        Self { entries }
    }

    pub fn insert(&mut self, character_id: CharacterId, dungeon_id: DungeonId, progress: DungeonProgress) {
        self.entries.insert((character_id, dungeon_id), progress);
    }

    /// Progress of a pair, defaulting to zero entries and no history
    pub fn get(&self, character_id: &CharacterId, dungeon_id: &DungeonId) -> DungeonProgress {
        // HashMap lookups with a tuple key need owned parts
        self.entries
            .get(&(character_id.clone(), dungeon_id.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Replace everything known about one character, e.g. after a refetch
    pub fn replace_character<'a>(
        &mut self,
        character_id: &CharacterId,
        aggregates: impl IntoIterator<Item = &'a ProgressAggregate>,
    ) {
        self.entries.retain(|(c, _), _| c != character_id);
        for aggregate in aggregates {
            if &aggregate.character_id != character_id {
                continue;
            }
            self.insert(
                aggregate.character_id.clone(),
                aggregate.dungeon_id.clone(),
                DungeonProgress::from_aggregate(aggregate),
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
