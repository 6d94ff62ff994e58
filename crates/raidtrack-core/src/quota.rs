//! Quota evaluation

use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, TimeZone};
use raidtrack_api::{Dungeon, EntryPeriod};
use raidtrack_util::DayName;

use crate::DungeonProgress;

/// Weekly reset day assumed when the catalog does not name one
pub const DEFAULT_WEEKLY_RESET_DAY: DayName = DayName::Monday;

/// Whether the dungeon's quota is used up. Untracked dungeons are never complete.
pub fn is_complete(progress: &DungeonProgress, dungeon: &Dungeon) -> bool {
    match dungeon.quota {
        Some(quota) => progress.entries_count >= quota.limit,
        None => false,
    }
}

/// Runs left in the current period, or `None` for an untracked dungeon
pub fn remaining_runs(progress: &DungeonProgress, dungeon: &Dungeon) -> Option<u32> {
    dungeon
        .quota
        .map(|quota| quota.limit.saturating_sub(progress.entries_count))
}

/// Next local midnight at which a counter with this period resets.
///
/// Weekly counters reset on `reset_day` (Monday if unset). The result is
/// always strictly after `now`.
pub fn next_reset(
    period: EntryPeriod,
    reset_day: Option<DayName>,
    now: DateTime<Local>,
) -> DateTime<Local> {
    let days_ahead = match period {
        EntryPeriod::Daily => 1,
        EntryPeriod::Weekly => {
            let target = reset_day
                .unwrap_or(DEFAULT_WEEKLY_RESET_DAY)
                .weekday()
                .num_days_from_sunday() as i64;
            let current = now.weekday().num_days_from_sunday() as i64;
            match (target - current).rem_euclid(7) {
                0 => 7,
                n => n,
            }
        }
    };

    let date = now.date_naive() + Duration::days(days_ahead);
    let midnight = date.and_time(NaiveTime::MIN);

    // Midnight can fall in a DST gap; take the first valid instant after it
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or(now + Duration::days(days_ahead))
}

/// Next reset of a dungeon's counter, or `None` for untracked dungeons
pub fn next_reset_for(dungeon: &Dungeon, now: DateTime<Local>) -> Option<DateTime<Local>> {
    dungeon
        .quota
        .map(|quota| next_reset(quota.period, dungeon.reset_day, now))
}
