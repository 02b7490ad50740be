//! Catalog record types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Lowest valid value for a numeric attribute.
pub const STAT_MIN: u8 = 1;

/// Highest valid value for a numeric attribute.
pub const STAT_MAX: u8 = 10;

/// Faction a character belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Unsc,
    Covenant,
    Forerunner,
    Banished,
    Flood,
    Other,
}

impl Faction {
    /// Every faction, in declaration order.
    pub const ALL: [Faction; 6] = [
        Faction::Unsc,
        Faction::Covenant,
        Faction::Forerunner,
        Faction::Banished,
        Faction::Flood,
        Faction::Other,
    ];

    /// Stored and serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsc => "unsc",
            Self::Covenant => "covenant",
            Self::Forerunner => "forerunner",
            Self::Banished => "banished",
            Self::Flood => "flood",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Faction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::ALL
            .into_iter()
            .find(|faction| faction.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownFaction(s.to_string()))
    }
}

/// One of the seven numeric attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    ThreatLevel,
    CombatSkill,
    Intelligence,
    Leadership,
    Strength,
    Durability,
    Technology,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::ThreatLevel,
        Stat::CombatSkill,
        Stat::Intelligence,
        Stat::Leadership,
        Stat::Strength,
        Stat::Durability,
        Stat::Technology,
    ];

    /// Serialized field name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ThreatLevel => "threatLevel",
            Self::CombatSkill => "combatSkill",
            Self::Intelligence => "intelligence",
            Self::Leadership => "leadership",
            Self::Strength => "strength",
            Self::Durability => "durability",
            Self::Technology => "technology",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ThreatLevel => "Threat Level",
            Self::CombatSkill => "Combat Skill",
            Self::Intelligence => "Intelligence",
            Self::Leadership => "Leadership",
            Self::Strength => "Strength",
            Self::Durability => "Durability",
            Self::Technology => "Technology",
        }
    }
}

/// Numeric attributes, each expected in `STAT_MIN..=STAT_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub threat_level: u8,
    pub combat_skill: u8,
    pub intelligence: u8,
    pub leadership: u8,
    pub strength: u8,
    pub durability: u8,
    pub technology: u8,
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(5)
    }
}

impl Stats {
    /// All seven attributes set to the same value.
    pub fn uniform(value: u8) -> Self {
        Self {
            threat_level: value,
            combat_skill: value,
            intelligence: value,
            leadership: value,
            strength: value,
            durability: value,
            technology: value,
        }
    }

    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::ThreatLevel => self.threat_level,
            Stat::CombatSkill => self.combat_skill,
            Stat::Intelligence => self.intelligence,
            Stat::Leadership => self.leadership,
            Stat::Strength => self.strength,
            Stat::Durability => self.durability,
            Stat::Technology => self.technology,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u8) {
        let slot = match stat {
            Stat::ThreatLevel => &mut self.threat_level,
            Stat::CombatSkill => &mut self.combat_skill,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Leadership => &mut self.leadership,
            Stat::Strength => &mut self.strength,
            Stat::Durability => &mut self.durability,
            Stat::Technology => &mut self.technology,
        };
        *slot = value;
    }

    /// Copy with every attribute forced into the valid range.
    pub fn clamped(&self) -> Self {
        let mut stats = *self;
        for stat in Stat::ALL {
            stats.set(stat, self.get(stat).clamp(STAT_MIN, STAT_MAX));
        }
        stats
    }
}

/// A character that has not been assigned a store id yet.
///
/// Any `id` present in JSON input is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub name: String,
    pub species: String,
    pub faction: Faction,
    pub affiliation: String,
    pub role: String,
    pub status: String,
    pub equipment: String,
    #[serde(default)]
    pub weapons: String,
    #[serde(default)]
    pub abilities: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub first_appearance: String,
    #[serde(flatten)]
    pub stats: Stats,
}

/// A stored character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Store-assigned identifier, immutable once assigned.
    pub id: i64,
    pub name: String,
    pub species: String,
    pub faction: Faction,
    pub affiliation: String,
    pub role: String,
    pub status: String,
    pub equipment: String,
    #[serde(default)]
    pub weapons: String,
    #[serde(default)]
    pub abilities: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub first_appearance: String,
    #[serde(flatten)]
    pub stats: Stats,
}

impl Character {
    /// Attach a store id to a new character.
    pub fn new(id: i64, character: NewCharacter) -> Self {
        Self {
            id,
            name: character.name,
            species: character.species,
            faction: character.faction,
            affiliation: character.affiliation,
            role: character.role,
            status: character.status,
            equipment: character.equipment,
            weapons: character.weapons,
            abilities: character.abilities,
            biography: character.biography,
            image_url: character.image_url,
            first_appearance: character.first_appearance,
            stats: character.stats,
        }
    }

    /// The record without its id.
    pub fn to_new(&self) -> NewCharacter {
        NewCharacter {
            name: self.name.clone(),
            species: self.species.clone(),
            faction: self.faction,
            affiliation: self.affiliation.clone(),
            role: self.role.clone(),
            status: self.status.clone(),
            equipment: self.equipment.clone(),
            weapons: self.weapons.clone(),
            abilities: self.abilities.clone(),
            biography: self.biography.clone(),
            image_url: self.image_url.clone(),
            first_appearance: self.first_appearance.clone(),
            stats: self.stats,
        }
    }

    pub fn threat_level(&self) -> u8 {
        self.stats.threat_level
    }

    pub fn combat_skill(&self) -> u8 {
        self.stats.combat_skill
    }
}
