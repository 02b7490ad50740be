//! Search, filter and sort pipeline over the in-memory collection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Character, Faction, STAT_MAX, STAT_MIN};
use crate::validation::ValidationError;

/// Simple category filter shown next to the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Favorites,
    Faction(Faction),
}

impl CategoryFilter {
    fn matches(&self, character: &Character, favorites: &[i64]) -> bool {
        match self {
            Self::All => true,
            Self::Favorites => favorites.contains(&character.id),
            Self::Faction(faction) => character.faction == *faction,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "favorites" => Ok(Self::Favorites),
            other => other.parse().map(Self::Faction),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Favorites => f.write_str("favorites"),
            Self::Faction(faction) => write!(f, "{}", faction),
        }
    }
}

/// Sort order of the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Name, ascending.
    #[default]
    Name,
    /// Threat level, descending.
    Threat,
    /// Faction, ascending.
    Faction,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "threat" => Ok(Self::Threat),
            "faction" => Ok(Self::Faction),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Multi-field filter. Unset options do not constrain the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedFilter {
    pub faction: Option<Faction>,
    /// Exact status match.
    pub status: Option<String>,
    /// Case-sensitive substring of the species.
    pub species: Option<String>,
    pub min_threat_level: u8,
    pub max_threat_level: u8,
    pub min_combat_skill: u8,
}

impl Default for AdvancedFilter {
    fn default() -> Self {
        Self {
            faction: None,
            status: None,
            species: None,
            min_threat_level: STAT_MIN,
            max_threat_level: STAT_MAX,
            min_combat_skill: STAT_MIN,
        }
    }
}

impl AdvancedFilter {
    /// Whether every clause is vacuous.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, character: &Character) -> bool {
        let threat = character.threat_level();

        self.faction.map_or(true, |faction| character.faction == faction)
            && self
                .status
                .as_deref()
                .map_or(true, |status| character.status == status)
            && self
                .species
                .as_deref()
                .map_or(true, |species| character.species.contains(species))
            && threat >= self.min_threat_level
            && threat <= self.max_threat_level
            && character.combat_skill() >= self.min_combat_skill
    }

    /// Labels for the clauses that differ from the defaults.
    pub fn active_labels(&self) -> Vec<String> {
        let defaults = Self::default();
        let mut labels = Vec::new();

        if let Some(faction) = self.faction {
            labels.push(format!("Faction: {}", faction));
        }
        if let Some(status) = &self.status {
            labels.push(format!("Status: {}", status));
        }
        if let Some(species) = &self.species {
            labels.push(format!("Species: {}", species));
        }
        if self.min_threat_level != defaults.min_threat_level {
            labels.push(format!("Min Threat: {}", self.min_threat_level));
        }
        if self.max_threat_level != defaults.max_threat_level {
            labels.push(format!("Max Threat: {}", self.max_threat_level));
        }
        if self.min_combat_skill != defaults.min_combat_skill {
            labels.push(format!("Min Combat: {}", self.min_combat_skill));
        }

        labels
    }
}

/// Everything that shapes the list view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewQuery {
    /// Case-insensitive substring of name, species or affiliation.
    pub search: String,
    pub category: CategoryFilter,
    pub advanced: AdvancedFilter,
    pub sort: SortKey,
}

fn matches_search(character: &Character, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    [&character.name, &character.species, &character.affiliation]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Case-insensitive ordering first, exact text as the tiebreak.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter and sort `records` for display.
///
/// A record is kept iff it matches the search text, the category and every
/// advanced clause. The sort is stable, so ties keep their input order.
pub fn filter_and_sort<'a>(
    records: &'a [Character],
    query: &ViewQuery,
    favorites: &[i64],
) -> Vec<&'a Character> {
    let needle = query.search.to_lowercase();

    let mut view: Vec<&Character> = records
        .iter()
        .filter(|character| {
            matches_search(character, &needle)
                && query.category.matches(character, favorites)
                && query.advanced.matches(character)
        })
        .collect();

    match query.sort {
        SortKey::Name => view.sort_by(|a, b| compare_text(&a.name, &b.name)),
        SortKey::Threat => view.sort_by(|a, b| b.threat_level().cmp(&a.threat_level())),
        SortKey::Faction => view.sort_by(|a, b| a.faction.as_str().cmp(b.faction.as_str())),
    }

    view
}
