//! Configuration validation
//!
//! Dungeon ids are not checked against any catalog here: the catalog belongs
//! to the backend and may change, and dangling schedule entries are dropped
//! at evaluation time.

use crate::schema::{RawCharacter, RawConfig};
use raidtrack_util::DayName;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Character '{character_id}': {message}")]
    CharacterError {
        character_id: String,
        message: String,
    },

    #[error("Duplicate character ID: {0}")]
    DuplicateCharacterId(String),

    #[error("Character ID cannot be empty")]
    EmptyCharacterId,

    #[error("Character '{character_id}': unknown day '{day}'")]
    UnknownDay { character_id: String, day: String },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    for character in &config.characters {
        let id = character.id.trim();
        if id.is_empty() {
            errors.push(ValidationError::EmptyCharacterId);
            continue;
        }
        if !seen_ids.insert(id) {
            errors.push(ValidationError::DuplicateCharacterId(id.to_string()));
        }
    }

    for character in &config.characters {
        errors.extend(validate_character(character));
    }

    errors
}

fn validate_character(character: &RawCharacter) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_days = HashSet::new();

    for (day_key, dungeons) in &character.schedule {
        match day_key.parse::<DayName>() {
            Ok(day) => {
                if !seen_days.insert(day) {
                    errors.push(ValidationError::CharacterError {
                        character_id: character.id.clone(),
                        message: format!("{} is scheduled more than once", day),
                    });
                }
            }
            Err(_) => errors.push(ValidationError::UnknownDay {
                character_id: character.id.clone(),
                day: day_key.clone(),
            }),
        }

        if dungeons.iter().any(|d| d.as_id_string().is_empty()) {
            errors.push(ValidationError::CharacterError {
                character_id: character.id.clone(),
                message: format!("empty dungeon id in '{}' schedule", day_key),
            });
        }
    }

    errors
}
