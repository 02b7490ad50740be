//! Database row models.

use halodex_core::{Character, Faction, Stats, STAT_MAX, STAT_MIN};
use sqlx::FromRow;

use crate::error::DatabaseError;

/// Columns selected for a full character row.
pub(crate) const CHARACTER_COLUMNS: &str = "id, name, species, faction, affiliation, role, \
     status, equipment, weapons, abilities, biography, image_url, first_appearance, \
     threat_level, combat_skill, intelligence, leadership, strength, durability, technology";

/// A `characters` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CharacterRow {
    pub id: i64,
    pub name: String,
    pub species: String,
    /// Lowercase faction name.
    pub faction: String,
    pub affiliation: String,
    pub role: String,
    pub status: String,
    pub equipment: String,
    pub weapons: String,
    pub abilities: String,
    pub biography: String,
    pub image_url: String,
    pub first_appearance: String,
    pub threat_level: i64,
    pub combat_skill: i64,
    pub intelligence: i64,
    pub leadership: i64,
    pub strength: i64,
    pub durability: i64,
    pub technology: i64,
}

impl CharacterRow {
    fn corrupt(&self, reason: String) -> DatabaseError {
        DatabaseError::Corrupt {
            entity: "Character",
            id: self.id,
            reason,
        }
    }

    /// Decode a stat column, rejecting anything outside `STAT_MIN..=STAT_MAX`.
    fn stat(&self, name: &str, value: i64) -> Result<u8, DatabaseError> {
        match u8::try_from(value) {
            Ok(stat) if (STAT_MIN..=STAT_MAX).contains(&stat) => Ok(stat),
            _ => Err(self.corrupt(format!("{} out of range: {}", name, value))),
        }
    }
}

impl TryFrom<CharacterRow> for Character {
    type Error = DatabaseError;

    fn try_from(row: CharacterRow) -> Result<Self, Self::Error> {
        let faction: Faction = row
            .faction
            .parse()
            .map_err(|err| row.corrupt(format!("{}", err)))?;

        let stats = Stats {
            threat_level: row.stat("threat_level", row.threat_level)?,
            combat_skill: row.stat("combat_skill", row.combat_skill)?,
            intelligence: row.stat("intelligence", row.intelligence)?,
            leadership: row.stat("leadership", row.leadership)?,
            strength: row.stat("strength", row.strength)?,
            durability: row.stat("durability", row.durability)?,
            technology: row.stat("technology", row.technology)?,
        };

        Ok(Character {
            id: row.id,
            name: row.name,
            species: row.species,
            faction,
            affiliation: row.affiliation,
            role: row.role,
            status: row.status,
            equipment: row.equipment,
            weapons: row.weapons,
            abilities: row.abilities,
            biography: row.biography,
            image_url: row.image_url,
            first_appearance: row.first_appearance,
            stats,
        })
    }
}

/// Decode a batch of rows, failing on the first corrupt one.
pub(crate) fn decode_rows(rows: Vec<CharacterRow>) -> Result<Vec<Character>, DatabaseError> {
    rows.into_iter().map(Character::try_from).collect()
}
