//! Rotation recommendation

use raidtrack_api::{Dungeon, Recommendation, TrackedCharacter};
use raidtrack_util::{CharacterId, DayName};
use tracing::debug;

use crate::{ProgressBook, evaluate};

/// Decide which character the player should switch to for `day`.
///
/// Nothing is recommended while the active character still has pending work.
/// Otherwise the first other character in roster order whose non-empty
/// schedule is not complete wins. The roster order is the user's rotation
/// priority and is never re-sorted.
///
/// An active character that is absent, untracked, or has no schedule for
/// `day` does not block the scan.
pub fn recommend(
    active: Option<&CharacterId>,
    roster: &[TrackedCharacter],
    day: DayName,
    catalog: &[Dungeon],
    progress: &ProgressBook,
) -> Recommendation {
    let active_character = active.and_then(|id| roster.iter().find(|c| &c.id == id));

    if let Some(character) = active_character
        && !evaluate(character, day, catalog, progress).is_complete
    {
        debug!(character_id = %character.id, "Active character has pending work");
        return Recommendation::undetermined();
    }

    for character in roster {
        if active.is_some_and(|id| id == &character.id) {
            continue;
        }

        let evaluation = evaluate(character, day, catalog, progress);
        if !evaluation.has_schedule() {
            continue;
        }
        if !evaluation.is_complete {
            debug!(character_id = %character.id, "Recommending next character");
            return Recommendation::switch_to(character.id.clone());
        }
    }

    Recommendation::all_done()
}
