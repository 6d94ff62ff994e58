//! Schedule evaluation and estimated time to clear

use raidtrack_api::{Dungeon, EtcResult, TrackedCharacter};
use raidtrack_util::{CharacterId, DayName};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::{DungeonProgress, ProgressBook, is_complete, remaining_runs};

/// One scheduled dungeon with the character's progress in it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonStatus {
    pub dungeon: Dungeon,
    pub progress: DungeonProgress,
    /// Runs left this period; `None` for untracked dungeons
    pub remaining: Option<u32>,
    pub is_complete: bool,
}

impl DungeonStatus {
    pub fn new(dungeon: Dungeon, progress: DungeonProgress) -> Self {
        Self {
            remaining: remaining_runs(&progress, &dungeon),
            is_complete: is_complete(&progress, &dungeon),
            dungeon,
            progress,
        }
    }
}

/// How a character's day looks when shown to the player.
///
/// `NoSchedule` and `Cleared` both count as complete for rotation, but mean
/// different things on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    NoSchedule,
    Pending,
    Cleared,
}

/// Result of evaluating one character's schedule for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvaluation {
    pub character_id: CharacterId,
    pub day: DayName,
    pub dungeons: Vec<DungeonStatus>,
    /// Nothing scheduled for the day blocks moving on. True for an empty
    /// schedule; use [`ScheduleEvaluation::status`] to tell the two apart.
    pub is_complete: bool,
    pub etc: EtcResult,
}

impl ScheduleEvaluation {
    pub fn has_schedule(&self) -> bool {
        !self.dungeons.is_empty()
    }

    pub fn status(&self) -> ScheduleStatus {
        if !self.has_schedule() {
            ScheduleStatus::NoSchedule
        } else if self.is_complete {
            ScheduleStatus::Cleared
        } else {
            ScheduleStatus::Pending
        }
    }
}

/// Resolve a character's schedule for `day` against the catalog.
///
/// Ids missing from the catalog are dropped; repeated ids keep their first
/// position.
pub fn resolve_schedule<'a>(
    character: &TrackedCharacter,
    day: DayName,
    catalog: &'a [Dungeon],
) -> Vec<&'a Dungeon> {
    let mut seen = HashSet::new();
    character
        .schedule
        .dungeons_for(day)
        .iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| catalog.iter().find(|d| &d.id == id))
        .collect()
}

/// Evaluate a character's schedule for `day`
pub fn evaluate(
    character: &TrackedCharacter,
    day: DayName,
    catalog: &[Dungeon],
    progress: &ProgressBook,
) -> ScheduleEvaluation {
    let dungeons: Vec<DungeonStatus> = resolve_schedule(character, day, catalog)
        .into_iter()
        .map(|dungeon| {
            let p = progress.get(&character.id, &dungeon.id);
            DungeonStatus::new(dungeon.clone(), p)
        })
        .collect();

    let is_complete = dungeons.iter().all(|status| status.is_complete);
    let etc = calculate_etc(dungeons.iter().map(|s| (&s.dungeon, &s.progress)));

    debug!(
        character_id = %character.id,
        day = %day,
        scheduled = dungeons.len(),
        is_complete,
        etc_seconds = etc.total_seconds,
        "Schedule evaluated"
    );

    ScheduleEvaluation {
        character_id: character.id.clone(),
        day,
        dungeons,
        is_complete,
        etc,
    }
}

/// Estimate the time to clear the remaining quota-bound runs.
///
/// Untracked dungeons are skipped. A pending dungeon without a usable
/// average adds nothing and sets `has_missing_data`, so the total is an
/// under-estimate rather than unavailable.
pub fn calculate_etc<'a>(
    dungeons: impl IntoIterator<Item = (&'a Dungeon, &'a DungeonProgress)>,
) -> EtcResult {
    let mut etc = EtcResult::EMPTY;

    for (dungeon, progress) in dungeons {
        let Some(remaining) = remaining_runs(progress, dungeon) else {
            continue;
        };
        if remaining == 0 {
            continue;
        }

        etc.is_complete = false;
        match progress.avg_clear_seconds() {
            Some(avg) => etc.total_seconds += avg * remaining as f64,
            None => etc.has_missing_data = true,
        }
    }

    etc
}

/// Whole-day ETC across the roster: the per-dungeon rule summed over every
/// tracked character's schedule for `day`
pub fn day_etc(
    roster: &[TrackedCharacter],
    day: DayName,
    catalog: &[Dungeon],
    progress: &ProgressBook,
) -> EtcResult {
    roster
        .iter()
        .map(|character| evaluate(character, day, catalog, progress).etc)
        .fold(EtcResult::EMPTY, EtcResult::merge)
}
