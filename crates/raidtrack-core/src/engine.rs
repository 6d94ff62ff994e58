//! Tracker state container
//!
//! Owns everything the pure evaluation functions need (catalog, roster,
//! progress, live state) and re-runs them on demand. The tracker is the only
//! owner of the live reducer, so it is the only writer of [`LiveState`].

use chrono::{DateTime, Local};
use raidtrack_api::{
    Dungeon, EtcResult, ProgressAggregate, Recommendation, StreamEvent, StreamMessage,
    TrackedCharacter,
};
use raidtrack_util::{CharacterId, DayName, DungeonId};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    CoreEvent, DungeonOverview, LivePhase, LiveState, LiveStateReducer, ProgressBook,
    ScheduleEvaluation, day_etc, dungeon_overview, evaluate, next_reset_for, recommend,
};

/// Everything a UI needs to render one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub day: DayName,
    pub live: LiveState,
    /// Evaluation of the active character, if it is tracked
    pub active: Option<ScheduleEvaluation>,
    pub recommendation: Recommendation,
    pub day_etc: EtcResult,
    /// Every tracked character's day, in roster order
    pub overview: Vec<ScheduleEvaluation>,
    /// Roster-wide runs per quota-bound dungeon
    pub dungeons: Vec<DungeonOverview>,
}

/// Explicitly owned state for one companion session
#[derive(Debug, Default)]
pub struct Tracker {
    catalog: Vec<Dungeon>,
    roster: Vec<TrackedCharacter>,
    progress: ProgressBook,
    live: LiveStateReducer,
}

impl Tracker {
    /// Create a tracker with no progress data and no active character
    pub fn new(catalog: Vec<Dungeon>, roster: Vec<TrackedCharacter>) -> Self {
        info!(
            dungeons = catalog.len(),
            characters = roster.len(),
            "Tracker initialized"
        );

        Self {
            catalog,
            roster,
            progress: ProgressBook::new(),
            live: LiveStateReducer::new(),
        }
    }

    pub fn catalog(&self) -> &[Dungeon] {
        &self.catalog
    }

    pub fn roster(&self) -> &[TrackedCharacter] {
        &self.roster
    }

    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    /// Latest reduced stream state
    pub fn live_state(&self) -> LiveState {
        self.live.state()
    }

    pub fn live_phase(&self) -> &LivePhase {
        self.live.phase()
    }

    /// Replace the dungeon catalog
    pub fn set_catalog(&mut self, catalog: Vec<Dungeon>) {
        info!(dungeons = catalog.len(), "Catalog replaced");
        self.catalog = catalog;
    }

    /// Replace the roster (order is rotation priority)
    pub fn set_roster(&mut self, roster: Vec<TrackedCharacter>) {
        info!(characters = roster.len(), "Roster replaced");
        self.roster = roster;
    }

    /// Replace all progress after a full fetch
    pub fn set_progress(&mut self, progress: ProgressBook) {
        debug!(pairs = progress.len(), "Progress replaced");
        self.progress = progress;
    }

    /// Replace one character's progress after a targeted refetch
    pub fn update_character_progress<'a>(
        &mut self,
        character_id: &CharacterId,
        aggregates: impl IntoIterator<Item = &'a ProgressAggregate>,
    ) {
        self.progress.replace_character(character_id, aggregates);
        debug!(character_id = %character_id, "Character progress refreshed");
    }

    /// Feed one raw NDJSON line from the event stream
    pub fn handle_line(&mut self, line: &str) -> Vec<CoreEvent> {
        self.live.apply_line(line)
    }

    /// Feed the NDJSON lines that arrived together as one tick
    pub fn handle_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<CoreEvent> {
        self.live.apply_lines(lines)
    }

    /// Feed one stream message
    pub fn handle_message(&mut self, message: &StreamMessage) -> Vec<CoreEvent> {
        self.live.apply_message(message)
    }

    /// Feed the decoded events of one tick
    pub fn handle_tick(&mut self, events: &[StreamEvent]) -> Vec<CoreEvent> {
        self.live.apply_tick(events)
    }

    pub fn character(&self, id: &CharacterId) -> Option<&TrackedCharacter> {
        self.roster.iter().find(|c| &c.id == id)
    }

    /// Evaluate a tracked character. Untracked ids yield nothing.
    pub fn evaluate(
        &self,
        character_id: &CharacterId,
        day: DayName,
    ) -> Option<ScheduleEvaluation> {
        self.character(character_id)
            .map(|character| evaluate(character, day, &self.catalog, &self.progress))
    }

    /// Evaluate the character the player is on right now
    pub fn evaluate_active(&self, day: DayName) -> Option<ScheduleEvaluation> {
        let active = self.live.phase().character_id()?;
        self.evaluate(active, day)
    }

    /// Which character to play next
    pub fn recommend(&self, day: DayName) -> Recommendation {
        recommend(
            self.live.phase().character_id(),
            &self.roster,
            day,
            &self.catalog,
            &self.progress,
        )
    }

    /// ETC across every tracked character for `day`
    pub fn day_etc(&self, day: DayName) -> EtcResult {
        day_etc(&self.roster, day, &self.catalog, &self.progress)
    }

    /// Every tracked character's evaluation for `day`, in roster order
    pub fn day_overview(&self, day: DayName) -> Vec<ScheduleEvaluation> {
        self.roster
            .iter()
            .map(|character| evaluate(character, day, &self.catalog, &self.progress))
            .collect()
    }

    /// Roster-wide runs per quota-bound dungeon, in catalog order
    pub fn dungeon_overview(&self) -> Vec<DungeonOverview> {
        dungeon_overview(&self.catalog, &self.roster, &self.progress)
    }

    /// Next reset of the given dungeon's counter, if it is tracked and known
    pub fn next_reset(
        &self,
        dungeon_id: &DungeonId,
        now: DateTime<Local>,
    ) -> Option<DateTime<Local>> {
        self.catalog
            .iter()
            .find(|d| &d.id == dungeon_id)
            .and_then(|d| next_reset_for(d, now))
    }

    /// Recompute everything derived for `day`
    pub fn snapshot(&self, day: DayName) -> TrackerSnapshot {
        TrackerSnapshot {
            day,
            live: self.live_state(),
            active: self.evaluate_active(day),
            recommendation: self.recommend(day),
            day_etc: self.day_etc(day),
            overview: self.day_overview(day),
            dungeons: self.dungeon_overview(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DungeonProgress, ScheduleStatus};
    use raidtrack_api::{CharacterSchedule, EntryPeriod};

    const DAY: DayName = DayName::Friday;

    fn make_tracker() -> Tracker {
        let catalog = vec![
            Dungeon::with_quota("d1", "Gate", 1, EntryPeriod::Daily),
            Dungeon::with_quota("d2", "Abyss", 2, EntryPeriod::Weekly),
        ];
        let roster = vec![
            TrackedCharacter::new(
                "aria",
                CharacterSchedule::new().with_day(DAY, [DungeonId::new("d1")]),
            ),
            TrackedCharacter::new(
                "brom",
                CharacterSchedule::new().with_day(DAY, [DungeonId::new("d1"), DungeonId::new("d2")]),
            ),
        ];
        Tracker::new(catalog, roster)
    }

    fn aggregate(c: &str, d: &str, count: u32, avg: Option<f64>) -> ProgressAggregate {
        ProgressAggregate {
            character_id: CharacterId::new(c),
            dungeon_id: DungeonId::new(d),
            entries_count: count,
            avg_clear_seconds: avg,
        }
    }

    #[test]
    fn untracked_active_character_has_no_evaluation() {
        let mut tracker = make_tracker();
        tracker.handle_line(r#"{"event":"character","data":"stranger"}"#);

        assert_eq!(
            tracker.live_state().active_character_id,
            Some(CharacterId::new("stranger"))
        );
        assert!(tracker.evaluate_active(DAY).is_none());
    }

    #[test]
    fn character_and_started_in_one_tick_enter_dungeon() {
        let mut tracker = make_tracker();
        tracker.handle_line(r#"{"event":"character","data":"aria"}"#);

        tracker.handle_lines(&[
            r#"{"event":"dungeons","data":{"type":"started","dungeonId":"d2"}}"#,
            r#"{"event":"character","data":"brom"}"#,
        ]);

        assert_eq!(
            tracker.live_state(),
            LiveState {
                active_character_id: Some(CharacterId::new("brom")),
                active_dungeon_id: Some(DungeonId::new("d2")),
            }
        );
    }

    #[test]
    fn rotation_follows_live_state_and_progress() {
        let mut tracker = make_tracker();
        tracker.handle_line(r#"{"event":"character","data":"aria"}"#);

        // aria still has d1 to do
        assert_eq!(tracker.recommend(DAY), Recommendation::undetermined());

        tracker.set_progress(ProgressBook::from_aggregates(&[aggregate(
            "aria",
            "d1",
            1,
            Some(90.0),
        )]));
        assert_eq!(
            tracker.recommend(DAY),
            Recommendation::switch_to(CharacterId::new("brom"))
        );
    }

    #[test]
    fn refetch_updates_one_character() {
        let mut tracker = make_tracker();
        tracker.set_progress(ProgressBook::from_aggregates(&[
            aggregate("aria", "d1", 0, Some(90.0)),
            aggregate("brom", "d2", 1, Some(600.0)),
        ]));

        tracker.update_character_progress(
            &CharacterId::new("aria"),
            &[aggregate("aria", "d1", 1, Some(80.0))],
        );

        let aria = tracker.evaluate(&CharacterId::new("aria"), DAY).unwrap();
        assert_eq!(aria.status(), ScheduleStatus::Cleared);
        assert_eq!(
            tracker.progress().get(&CharacterId::new("brom"), &DungeonId::new("d2")),
            DungeonProgress::new(1, Some(600.0))
        );
    }

    #[test]
    fn snapshot_collects_day_view() {
        let mut tracker = make_tracker();
        tracker.set_progress(ProgressBook::from_aggregates(&[
            aggregate("aria", "d1", 1, Some(90.0)),
            aggregate("brom", "d1", 0, Some(120.0)),
            aggregate("brom", "d2", 1, Some(600.0)),
        ]));
        tracker.handle_line(r#"{"event":"character","data":"aria"}"#);

        let snapshot = tracker.snapshot(DAY);
        assert_eq!(snapshot.overview.len(), 2);
        assert_eq!(snapshot.overview[0].status(), ScheduleStatus::Cleared);
        assert_eq!(snapshot.overview[1].status(), ScheduleStatus::Pending);
        assert_eq!(snapshot.day_etc.total_seconds, 720.0);
        assert_eq!(
            snapshot.recommendation,
            Recommendation::switch_to(CharacterId::new("brom"))
        );
        assert!(snapshot.active.is_some());

        // Both catalog dungeons are quota-bound
        assert_eq!(snapshot.dungeons.len(), 2);
        assert_eq!(snapshot.dungeons[0].entries, 1);
        assert_eq!(snapshot.dungeons[0].capacity, 2);
        assert_eq!(snapshot.dungeons[1].capacity, 4);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["recommendation"]["characterId"], "brom");
        assert_eq!(json["live"]["activeCharacterId"], "aria");
    }

    #[test]
    fn next_reset_only_for_tracked_catalog_entries() {
        let tracker = make_tracker();
        let now = raidtrack_util::now();
        assert!(tracker.next_reset(&DungeonId::new("d1"), now).is_some());
        assert!(tracker.next_reset(&DungeonId::new("missing"), now).is_none());
    }
}
