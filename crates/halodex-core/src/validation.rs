//! Boundary validation for character records.

use thiserror::Error;

use crate::model::{Character, NewCharacter, Stat, Stats, STAT_MAX, STAT_MIN};

/// Maximum length of a character name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length of any other free-text field.
pub const MAX_TEXT_LENGTH: usize = 4000;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty value where one is required.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Value too long.
    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Numeric attribute outside `STAT_MIN..=STAT_MAX`.
    #[error("{stat} must be between {} and {} (got {value})", STAT_MIN, STAT_MAX)]
    StatOutOfRange { stat: &'static str, value: u8 },

    /// Faction name not in the fixed set.
    #[error("unknown faction: {0}")]
    UnknownFaction(String),
}

impl NewCharacter {
    /// Check every field invariant before the record is persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;

        let text_fields = [
            ("species", &self.species),
            ("affiliation", &self.affiliation),
            ("role", &self.role),
            ("status", &self.status),
            ("equipment", &self.equipment),
            ("weapons", &self.weapons),
            ("abilities", &self.abilities),
            ("biography", &self.biography),
            ("imageUrl", &self.image_url),
            ("firstAppearance", &self.first_appearance),
        ];
        for (field, value) in text_fields {
            validate_text_length(field, value)?;
        }

        validate_stats(&self.stats)
    }
}

impl Character {
    /// Same checks as [`NewCharacter::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_new().validate()
    }
}

/// Validate a character name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Empty("name"));
    }

    let actual = name.chars().count();
    if actual > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name",
            max: MAX_NAME_LENGTH,
            actual,
        });
    }

    Ok(())
}

fn validate_text_length(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Validate that all seven attributes are in range.
pub fn validate_stats(stats: &Stats) -> Result<(), ValidationError> {
    for stat in Stat::ALL {
        let value = stats.get(stat);
        if !(STAT_MIN..=STAT_MAX).contains(&value) {
            return Err(ValidationError::StatOutOfRange {
                stat: stat.key(),
                value,
            });
        }
    }
    Ok(())
}
