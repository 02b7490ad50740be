//! Summary statistics over the full collection.

use serde::Serialize;

use crate::model::{Character, Faction, Stat};

/// Count and share of one faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactionShare {
    pub faction: Faction,
    pub count: usize,
    /// `round(count / total * 100)`, 0 for an empty collection.
    pub percentage: u32,
}

/// Per-faction counts, one entry for every faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactionBreakdown {
    pub total: usize,
    pub shares: Vec<FactionShare>,
}

impl FactionBreakdown {
    pub fn get(&self, faction: Faction) -> FactionShare {
        self.shares
            .iter()
            .copied()
            .find(|share| share.faction == faction)
            .unwrap_or(FactionShare {
                faction,
                count: 0,
                percentage: 0,
            })
    }

    /// Factions with at least one record.
    pub fn represented(&self) -> impl Iterator<Item = &FactionShare> {
        self.shares.iter().filter(|share| share.count > 0)
    }
}

/// Count records per faction.
pub fn count_by_faction(records: &[Character]) -> FactionBreakdown {
    let total = records.len();

    let shares = Faction::ALL
        .into_iter()
        .map(|faction| {
            let count = records.iter().filter(|c| c.faction == faction).count();
            let percentage = if total == 0 {
                0
            } else {
                (count as f64 / total as f64 * 100.0).round() as u32
            };
            FactionShare {
                faction,
                count,
                percentage,
            }
        })
        .collect();

    FactionBreakdown { total, shares }
}

/// Mean of each numeric attribute, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageStats {
    pub threat_level: f64,
    pub combat_skill: f64,
    pub intelligence: f64,
    pub leadership: f64,
    pub strength: f64,
    pub durability: f64,
    pub technology: f64,
}

impl AverageStats {
    pub fn get(&self, stat: Stat) -> f64 {
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
}

/// Average every attribute over `records`. All zero when empty.
pub fn average_stats(records: &[Character]) -> AverageStats {
    if records.is_empty() {
        return AverageStats::default();
    }

    let total = records.len() as f64;
    let mean = |stat: Stat| {
        let sum: u64 = records.iter().map(|c| u64::from(c.stats.get(stat))).sum();
        (sum as f64 / total * 10.0).round() / 10.0
    };

    AverageStats {
        threat_level: mean(Stat::ThreatLevel),
        combat_skill: mean(Stat::CombatSkill),
        intelligence: mean(Stat::Intelligence),
        leadership: mean(Stat::Leadership),
        strength: mean(Stat::Strength),
        durability: mean(Stat::Durability),
        technology: mean(Stat::Technology),
    }
}

/// The `n` most threatening records, highest first; ties keep input order.
pub fn top_threats(records: &[Character], n: usize) -> Vec<&Character> {
    let mut ranked: Vec<&Character> = records.iter().collect();
    ranked.sort_by(|a, b| b.threat_level().cmp(&a.threat_level()));
    ranked.truncate(n);
    ranked
}

/// Dashboard summary of the whole collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total: usize,
    pub factions: FactionBreakdown,
    pub averages: AverageStats,
    pub top_threats: Vec<Character>,
}

impl Dashboard {
    /// Number of top threats shown on the dashboard.
    pub const TOP_THREATS: usize = 3;

    pub fn build(records: &[Character]) -> Self {
        Self {
            total: records.len(),
            factions: count_by_faction(records),
            averages: average_stats(records),
            top_threats: top_threats(records, Self::TOP_THREATS)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCharacter, Stats};

    fn character(id: i64, faction: Faction, threat: u8) -> Character {
        let mut stats = Stats::uniform(4);
        stats.threat_level = threat;
        Character::new(
            id,
            NewCharacter {
                name: format!("Character {}", id),
                species: "Human".to_string(),
                faction,
                affiliation: String::new(),
                role: String::new(),
                status: "Unknown".to_string(),
                equipment: String::new(),
                weapons: String::new(),
                abilities: String::new(),
                biography: String::new(),
                image_url: String::new(),
                first_appearance: String::new(),
                stats,
            },
        )
    }

    fn five_records() -> Vec<Character> {
        vec![
            character(1, Faction::Unsc, 10),
            character(2, Faction::Covenant, 7),
            character(3, Faction::Unsc, 4),
            character(4, Faction::Flood, 9),
            character(5, Faction::Covenant, 7),
        ]
    }

    #[test]
    fn test_count_by_faction() {
        let breakdown = count_by_faction(&five_records());

        assert_eq!(breakdown.total, 5);
        assert_eq!(breakdown.get(Faction::Unsc).count, 2);
        assert_eq!(breakdown.get(Faction::Unsc).percentage, 40);
        assert_eq!(breakdown.get(Faction::Covenant).count, 2);
        assert_eq!(breakdown.get(Faction::Covenant).percentage, 40);
        assert_eq!(breakdown.get(Faction::Flood).count, 1);
        assert_eq!(breakdown.get(Faction::Flood).percentage, 20);
        assert_eq!(breakdown.get(Faction::Banished).count, 0);
        assert_eq!(breakdown.represented().count(), 3);

        let sum: u32 = breakdown.shares.iter().map(|s| s.percentage).sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn test_count_by_faction_rounding() {
        let records = vec![
            character(1, Faction::Unsc, 5),
            character(2, Faction::Covenant, 5),
            character(3, Faction::Flood, 5),
        ];
        let breakdown = count_by_faction(&records);
        let sum: u32 = breakdown.shares.iter().map(|s| s.percentage).sum();
        // 33 + 33 + 33
        assert!((98..=102).contains(&sum));
    }

    #[test]
    fn test_count_by_faction_empty() {
        let breakdown = count_by_faction(&[]);
        assert_eq!(breakdown.total, 0);
        assert_eq!(breakdown.shares.len(), Faction::ALL.len());
        assert!(breakdown
            .shares
            .iter()
            .all(|s| s.count == 0 && s.percentage == 0));
    }

    #[test]
    fn test_average_stats() {
        let averages = average_stats(&five_records());
        // (10 + 7 + 4 + 9 + 7) / 5 = 7.4
        assert_eq!(averages.threat_level, 7.4);
        assert_eq!(averages.get(Stat::Strength), 4.0);

        let records = vec![
            character(1, Faction::Unsc, 1),
            character(2, Faction::Unsc, 1),
            character(3, Faction::Unsc, 2),
        ];
        // 4 / 3 = 1.333...
        assert_eq!(average_stats(&records).threat_level, 1.3);
    }

    #[test]
    fn test_average_stats_empty() {
        assert_eq!(average_stats(&[]), AverageStats::default());
    }

    #[test]
    fn test_top_threats() {
        let records = five_records();
        let top = top_threats(&records, 3);
        let ids: Vec<i64> = top.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4, 2]);

        let all = top_threats(&records[..2], 3);
        assert_eq!(all.len(), 2);
        assert!(top_threats(&[], 3).is_empty());
    }

    #[test]
    fn test_dashboard() {
        let dashboard = Dashboard::build(&five_records());
        assert_eq!(dashboard.total, 5);
        assert_eq!(dashboard.top_threats.len(), Dashboard::TOP_THREATS);
        assert_eq!(dashboard.top_threats[0].id, 1);
    }
}
