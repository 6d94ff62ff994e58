//! Shared types for the raidtrack API

use raidtrack_util::{CharacterId, DayName, DungeonId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Cadence at which a dungeon's entry counter returns to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPeriod {
    Daily,
    Weekly,
}

/// Dungeon category tag. Informational only; no rule depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DungeonKind {
    Hero,
    #[serde(alias = "void_raid")]
    VoidRaid,
    Event,
    #[serde(alias = "another_world")]
    AnotherWorld,
    #[default]
    #[serde(other)]
    Other,
}

/// Dungeon record as served by the backend catalog endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDungeon {
    pub id: DungeonId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: DungeonKind,
    #[serde(default)]
    pub entry_limit: Option<i64>,
    #[serde(default)]
    pub entry_period: Option<EntryPeriod>,
    #[serde(default, deserialize_with = "deserialize_reset_day")]
    pub reset_day: Option<DayName>,
    #[serde(default)]
    pub accent_color: Option<String>,
}

/// Periodic entry allowance of a dungeon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub limit: u32,
    pub period: EntryPeriod,
}

/// Normalized catalog dungeon.
///
/// `quota` is `None` for untracked dungeons (unlimited entries). Such a
/// dungeon is never complete and never contributes to an ETC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dungeon {
    pub id: DungeonId,
    pub name: String,
    pub display_name: Option<String>,
    pub kind: DungeonKind,
    pub quota: Option<Quota>,
    pub reset_day: Option<DayName>,
    pub accent_color: Option<String>,
}

impl Dungeon {
    /// Untracked dungeon with no quota
    pub fn untracked(id: impl Into<DungeonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            kind: DungeonKind::Other,
            quota: None,
            reset_day: None,
            accent_color: None,
        }
    }

    /// Dungeon limited to `limit` entries per `period`
    pub fn with_quota(
        id: impl Into<DungeonId>,
        name: impl Into<String>,
        limit: u32,
        period: EntryPeriod,
    ) -> Self {
        Self {
            quota: Some(Quota { limit, period }),
            ..Self::untracked(id, name)
        }
    }

    /// Convert a catalog record, enforcing that limit and period come together.
    /// Records that violate this, or carry a negative limit, become untracked.
    pub fn from_catalog(raw: CatalogDungeon) -> Self {
        let quota = match (raw.entry_limit, raw.entry_period) {
            (Some(limit), Some(period)) => match u32::try_from(limit) {
                Ok(limit) => Some(Quota { limit, period }),
                Err(_) => {
                    warn!(dungeon_id = %raw.id, limit, "Negative entry limit, treating as untracked");
                    None
                }
            },
            (None, None) => None,
            (limit, period) => {
                warn!(
                    dungeon_id = %raw.id,
                    ?limit,
                    ?period,
                    "Entry limit and period must both be set, treating as untracked"
                );
                None
            }
        };

        Self {
            id: raw.id,
            name: raw.name,
            display_name: raw.display_name,
            kind: raw.kind,
            quota,
            reset_day: raw.reset_day,
            accent_color: raw.accent_color,
        }
    }

    /// Name to show to the player
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_tracked(&self) -> bool {
        self.quota.is_some()
    }
}

/// Normalize a full catalog response, preserving order
pub fn normalize_catalog(raw: Vec<CatalogDungeon>) -> Vec<Dungeon> {
    raw.into_iter().map(Dungeon::from_catalog).collect()
}

/// Reset day may arrive as a name ("Wednesday") or as a 0-based index with
/// Sunday = 0. Anything else is dropped rather than failing the catalog.
fn deserialize_reset_day<'de, D>(deserializer: D) -> Result<Option<DayName>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|i| DayName::ALL.get(i as usize).copied()),
        _ => None,
    })
}

/// Per-character, per-dungeon aggregate, already scoped to the dungeon's
/// current reset period by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAggregate {
    pub character_id: CharacterId,
    pub dungeon_id: DungeonId,
    #[serde(default, deserialize_with = "deserialize_entries_count")]
    pub entries_count: u32,
    #[serde(default)]
    pub avg_clear_seconds: Option<f64>,
}

/// Entry counts below zero are clamped to zero rather than failing the
/// whole progress response
fn deserialize_entries_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u32::try_from(count).unwrap_or_else(|_| {
        warn!(count, "Entry count out of range, clamping");
        if count < 0 { 0 } else { u32::MAX }
    }))
}

/// One completed run, as recorded by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub character_id: CharacterId,
    pub dungeon_id: DungeonId,
    pub duration_seconds: f64,
}

/// Day-of-week dungeon selection for one character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterSchedule(BTreeMap<DayName, Vec<DungeonId>>);

impl CharacterSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and config conversion
    pub fn with_day(mut self, day: DayName, dungeons: impl IntoIterator<Item = DungeonId>) -> Self {
        self.set_day(day, dungeons);
        self
    }

    pub fn set_day(&mut self, day: DayName, dungeons: impl IntoIterator<Item = DungeonId>) {
        self.0.insert(day, dungeons.into_iter().collect());
    }

    /// Dungeon ids assigned to `day`, in user order. May contain ids that are
    /// no longer in the catalog.
    pub fn dungeons_for(&self, day: DayName) -> &[DungeonId] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (DayName, &[DungeonId])> {
        self.0.iter().map(|(day, ids)| (*day, ids.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// A character the player tracks, with its schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedCharacter {
    pub id: CharacterId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schedule: CharacterSchedule,
}

impl TrackedCharacter {
    pub fn new(id: impl Into<CharacterId>, schedule: CharacterSchedule) -> Self {
        Self {
            id: id.into(),
            name: None,
            schedule,
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Which character to play next
///
/// `character_id == None && !is_all_done` means no pending character could
/// be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub character_id: Option<CharacterId>,
    pub is_all_done: bool,
}

impl Recommendation {
    pub fn switch_to(character_id: CharacterId) -> Self {
        Self {
            character_id: Some(character_id),
            is_all_done: false,
        }
    }

    pub fn undetermined() -> Self {
        Self {
            character_id: None,
            is_all_done: false,
        }
    }

    pub fn all_done() -> Self {
        Self {
            character_id: None,
            is_all_done: true,
        }
    }
}

/// Estimated time to clear the remaining quota-bound work
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcResult {
    pub total_seconds: f64,
    /// No dungeon had remaining quota-bound runs
    pub is_complete: bool,
    /// At least one pending dungeon had no usable clear-time average, so
    /// `total_seconds` is an under-estimate
    pub has_missing_data: bool,
}

impl EtcResult {
    /// ETC of no work at all
    pub const EMPTY: EtcResult = EtcResult {
        total_seconds: 0.0,
        is_complete: true,
        has_missing_data: false,
    };

    /// Combine two estimates, e.g. to build a whole-day figure across characters
    pub fn merge(self, other: EtcResult) -> EtcResult {
        EtcResult {
            total_seconds: self.total_seconds + other.total_seconds,
            is_complete: self.is_complete && other.is_complete,
            has_missing_data: self.has_missing_data || other.has_missing_data,
        }
    }
}

impl Default for EtcResult {
    fn default() -> Self {
        Self::EMPTY
    }
}
