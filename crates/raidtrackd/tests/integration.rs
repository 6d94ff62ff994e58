//! Integration tests for raidtrackd
//!
//! These tests drive a full session through config parsing, catalog
//! normalization, the tracker and its live reducer.

use raidtrack_api::{CatalogDungeon, ProgressAggregate, Recommendation, normalize_catalog};
use raidtrack_config::parse_config;
use raidtrack_core::{CoreEvent, ProgressBook, ScheduleStatus, Tracker};
use raidtrack_util::{CharacterId, DayName, DungeonId};

const CONFIG: &str = r#"
    config_version = 1

    [[characters]]
    id = "aria"
    name = "Aria"

    [characters.schedule]
    wednesday = [1, 2]

    [[characters]]
    id = "brom"

    [characters.schedule]
    wed = [1]

    [[characters]]
    id = "cato"

    [characters.schedule]
    monday = [1]
"#;

const CATALOG: &str = r#"[
    {"id": 1, "name": "gate", "displayName": "Gate of Dawn", "type": "hero",
     "entryLimit": 1, "entryPeriod": "daily"},
    {"id": 2, "name": "abyss", "type": "void-raid",
     "entryLimit": 3, "entryPeriod": "weekly", "resetDay": 3},
    {"id": 3, "name": "festival", "type": "event"}
]"#;

const DAY: DayName = DayName::Wednesday;

fn make_tracker(progress: &str) -> Tracker {
    let config = parse_config(CONFIG).unwrap();
    let raw: Vec<CatalogDungeon> = serde_json::from_str(CATALOG).unwrap();
    let aggregates: Vec<ProgressAggregate> = serde_json::from_str(progress).unwrap();

    let mut tracker = Tracker::new(normalize_catalog(raw), config.roster);
    tracker.set_progress(ProgressBook::from_aggregates(&aggregates));
    tracker
}

#[test]
fn test_session_rotates_after_completion() {
    let mut tracker = make_tracker(
        r#"[
            {"characterId": "aria", "dungeonId": 1, "entriesCount": 0, "avgClearSeconds": 60},
            {"characterId": "aria", "dungeonId": 2, "entriesCount": 3, "avgClearSeconds": 900},
            {"characterId": "brom", "dungeonId": 1, "entriesCount": 0, "avgClearSeconds": null}
        ]"#,
    );

    tracker.handle_line(r#"{"event":"character","data":"aria"}"#);
    let aria = tracker.evaluate_active(DAY).unwrap();
    assert_eq!(aria.status(), ScheduleStatus::Pending);
    assert_eq!(aria.etc.total_seconds, 60.0);
    assert!(!aria.etc.has_missing_data);
    assert_eq!(tracker.recommend(DAY), Recommendation::undetermined());

    let events = tracker.handle_line(r#"{"event":"dungeons","data":{"type":"started","dungeonId":1}}"#);
    assert_eq!(
        events,
        vec![CoreEvent::DungeonEntered {
            character_id: CharacterId::new("aria"),
            dungeon_id: DungeonId::new("1"),
        }]
    );

    let events = tracker.handle_line(
        r#"{"event":"dungeons","data":"{\"type\":\"completed\",\"dungeonId\":1}"}"#,
    );
    assert!(events.contains(&CoreEvent::RefetchProgress {
        character_id: CharacterId::new("aria"),
    }));
    assert!(events.contains(&CoreEvent::RefetchDayStatistics));
    assert_eq!(tracker.live_state().active_dungeon_id, None);

    // What the driver does on a refetch: reload the backend's aggregates
    let refreshed: Vec<ProgressAggregate> = serde_json::from_str(
        r#"[{"characterId": "aria", "dungeonId": 1, "entriesCount": 1, "avgClearSeconds": 62}]"#,
    )
    .unwrap();
    tracker.update_character_progress(&CharacterId::new("aria"), &refreshed);

    let snapshot = tracker.snapshot(DAY);
    assert_eq!(snapshot.active.unwrap().status(), ScheduleStatus::Cleared);
    assert_eq!(
        snapshot.recommendation,
        Recommendation::switch_to(CharacterId::new("brom"))
    );
    // brom's only pending dungeon has no average yet
    assert_eq!(snapshot.day_etc.total_seconds, 0.0);
    assert!(!snapshot.day_etc.is_complete);
    assert!(snapshot.day_etc.has_missing_data);

    // cato has nothing on Wednesday
    assert_eq!(snapshot.overview[2].status(), ScheduleStatus::NoSchedule);
}

#[test]
fn test_all_done_when_every_schedule_is_cleared() {
    let mut tracker = make_tracker(
        r#"[
            {"characterId": "aria", "dungeonId": 1, "entriesCount": 1, "avgClearSeconds": 60},
            {"characterId": "aria", "dungeonId": 2, "entriesCount": 3, "avgClearSeconds": 900},
            {"characterId": "brom", "dungeonId": 1, "entriesCount": 1, "avgClearSeconds": 75}
        ]"#,
    );
    tracker.handle_line(r#"{"event":"character","data":"brom"}"#);

    assert_eq!(tracker.recommend(DAY), Recommendation::all_done());
    assert!(tracker.day_etc(DAY).is_complete);
}

#[test]
fn test_malformed_feed_lines_are_ignored() {
    let mut tracker = make_tracker("[]");
    tracker.handle_line(r#"{"event":"character","data":"aria"}"#);
    tracker.handle_line(r#"{"event":"dungeons","data":{"type":"started","dungeonId":2}}"#);
    let before = tracker.live_state();

    for line in [
        "not json",
        r#"{"event":"dungeons","data":"{broken"}"#,
        r#"{"event":"dungeons","data":{"type":"started"}}"#,
        r#"{"event":"weather","data":"rain"}"#,
    ] {
        assert!(tracker.handle_line(line).is_empty());
    }

    assert_eq!(tracker.live_state(), before);
}

#[test]
fn test_catalog_quota_rules() {
    let tracker = make_tracker("[]");
    let catalog = tracker.catalog();

    assert_eq!(catalog[0].label(), "Gate of Dawn");
    assert_eq!(catalog[1].reset_day, Some(DayName::Wednesday));
    assert!(!catalog[2].is_tracked());
}

#[test]
fn test_tick_with_switch_and_start_enters_dungeon() {
    let mut tracker = make_tracker("[]");
    tracker.handle_line(r#"{"event":"character","data":"aria"}"#);

    let events = tracker.handle_lines(&[
        r#"{"event":"dungeons","data":{"type":"started","dungeonId":1}}"#,
        r#"{"event":"character","data":"brom"}"#,
    ]);

    assert_eq!(tracker.live_state().active_character_id, Some(CharacterId::new("brom")));
    assert_eq!(tracker.live_state().active_dungeon_id, Some(DungeonId::new("1")));
    assert!(events.iter().all(|e| match e {
        CoreEvent::DungeonEntered { character_id, .. }
        | CoreEvent::DungeonLeft { character_id, .. } => character_id.as_str() == "brom",
        _ => true,
    }));
}

#[test]
fn test_bare_none_character_clears_active() {
    let mut tracker = make_tracker("[]");
    tracker.handle_line(r#"{"event":"character","data":"aria"}"#);
    tracker.handle_line(r#"{"event":"character","data":"None"}"#);

    assert_eq!(tracker.live_state().active_character_id, None);
    assert!(tracker.evaluate_active(DAY).is_none());
}

#[test]
fn test_dungeon_overview_counts_roster() {
    let tracker = make_tracker(
        r#"[
            {"characterId": "aria", "dungeonId": 2, "entriesCount": 3, "avgClearSeconds": 900},
            {"characterId": "brom", "dungeonId": 2, "entriesCount": 1, "avgClearSeconds": 950}
        ]"#,
    );

    let overview = tracker.dungeon_overview();
    // The event dungeon has no quota
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[1].dungeon.id.as_str(), "2");
    assert_eq!(overview[1].entries, 4);
    assert_eq!(overview[1].capacity, 9);
}
