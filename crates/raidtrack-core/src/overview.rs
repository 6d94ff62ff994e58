//! Roster-wide progress per dungeon

use raidtrack_api::{Dungeon, TrackedCharacter};
use raidtrack_util::CharacterId;
use serde::Serialize;

use crate::{ProgressBook, is_complete};

/// One character's standing in a dungeon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntries {
    pub character_id: CharacterId,
    pub entries_count: u32,
    pub is_complete: bool,
}

/// Runs done across the whole roster in one quota-bound dungeon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonOverview {
    pub dungeon: Dungeon,
    /// Sum of every tracked character's entries this period
    pub entries: u32,
    /// Entry limit times the number of tracked characters
    pub capacity: u32,
    /// Roster order
    pub characters: Vec<CharacterEntries>,
}

impl DungeonOverview {
    /// Every tracked character has used up this dungeon
    pub fn is_complete(&self) -> bool {
        self.characters.iter().all(|c| c.is_complete)
    }
}

/// Per-dungeon totals across the roster, in catalog order.
///
/// Untracked dungeons have no capacity and are left out. Schedules play no
/// part: every tracked character counts toward every dungeon.
pub fn dungeon_overview(
    catalog: &[Dungeon],
    roster: &[TrackedCharacter],
    progress: &ProgressBook,
) -> Vec<DungeonOverview> {
    catalog
        .iter()
        .filter_map(|dungeon| {
            let quota = dungeon.quota?;

            let characters: Vec<CharacterEntries> = roster
                .iter()
                .map(|character| {
                    let p = progress.get(&character.id, &dungeon.id);
                    CharacterEntries {
                        character_id: character.id.clone(),
                        entries_count: p.entries_count,
                        is_complete: is_complete(&p, dungeon),
                    }
                })
                .collect();

            let entries = characters
                .iter()
                .fold(0u32, |sum, c| sum.saturating_add(c.entries_count));
            let capacity = quota.limit.saturating_mul(roster.len() as u32);

            Some(DungeonOverview {
                dungeon: dungeon.clone(),
                entries,
                capacity,
                characters,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DungeonProgress;
    use raidtrack_api::{CharacterSchedule, EntryPeriod};
    use raidtrack_util::DungeonId;

    fn roster() -> Vec<TrackedCharacter> {
        ["aria", "brom", "cato"]
            .into_iter()
            .map(|id| TrackedCharacter::new(id, CharacterSchedule::new()))
            .collect()
    }

    #[test]
    fn totals_across_roster() {
        let catalog = vec![
            Dungeon::with_quota("abyss", "Abyss", 3, EntryPeriod::Weekly),
            Dungeon::untracked("fest", "Festival"),
            Dungeon::with_quota("gate", "Gate", 1, EntryPeriod::Daily),
        ];
        let mut progress = ProgressBook::new();
        progress.insert(
            CharacterId::new("aria"),
            DungeonId::new("abyss"),
            DungeonProgress::new(3, Some(600.0)),
        );
        progress.insert(
            CharacterId::new("cato"),
            DungeonId::new("abyss"),
            DungeonProgress::new(1, None),
        );
        progress.insert(
            CharacterId::new("brom"),
            DungeonId::new("fest"),
            DungeonProgress::new(9, None),
        );

        let overview = dungeon_overview(&catalog, &roster(), &progress);

        assert_eq!(overview.len(), 2);

        let abyss = &overview[0];
        assert_eq!(abyss.dungeon.id.as_str(), "abyss");
        assert_eq!(abyss.entries, 4);
        assert_eq!(abyss.capacity, 9);
        assert_eq!(
            abyss
                .characters
                .iter()
                .map(|c| (c.character_id.as_str(), c.is_complete))
                .collect::<Vec<_>>(),
            vec![("aria", true), ("brom", false), ("cato", false)]
        );
        assert!(!abyss.is_complete());

        let gate = &overview[1];
        assert_eq!(gate.entries, 0);
        assert_eq!(gate.capacity, 3);
    }

    #[test]
    fn complete_when_every_character_is_done() {
        let catalog = vec![Dungeon::with_quota("gate", "Gate", 1, EntryPeriod::Daily)];
        let mut progress = ProgressBook::new();
        for id in ["aria", "brom", "cato"] {
            progress.insert(
                CharacterId::new(id),
                DungeonId::new("gate"),
                DungeonProgress::new(1, Some(60.0)),
            );
        }

        let overview = dungeon_overview(&catalog, &roster(), &progress);
        assert!(overview[0].is_complete());
        assert_eq!(overview[0].entries, overview[0].capacity);
    }

    #[test]
    fn empty_roster_has_no_capacity() {
        let catalog = vec![Dungeon::with_quota("gate", "Gate", 1, EntryPeriod::Daily)];
        let overview = dungeon_overview(&catalog, &[], &ProgressBook::new());
        assert_eq!(overview[0].capacity, 0);
        assert!(overview[0].characters.is_empty());
    }
}
