//! Plain-text rendering of catalog data.

use std::cmp::Ordering;
use std::fmt::Write;

use catalog::Comparison;
use halodex_core::{Character, Dashboard, Stat};

const GRID_COLUMNS: usize = 3;
const GRID_CELL: usize = 26;

fn star(favorite: bool) -> &'static str {
    if favorite {
        "*"
    } else {
        " "
    }
}

/// One line of the list layout.
pub fn list_line(character: &Character, favorite: bool) -> String {
    format!(
        "{} #{:<4} {:<24} {:<11} {:<24} threat {:>2}",
        star(favorite),
        character.id,
        character.name,
        character.faction.as_str(),
        character.species,
        character.threat_level()
    )
}

/// Names laid out in fixed-width columns.
pub fn grid<'a, I>(cells: I) -> String
where
    I: IntoIterator<Item = (&'a Character, bool)>,
{
    let cells: Vec<String> = cells
        .into_iter()
        .map(|(character, favorite)| {
            format!("{}#{} {}", star(favorite), character.id, character.name)
        })
        .collect();

    cells
        .chunks(GRID_COLUMNS)
        .map(|row| {
            row.iter()
                .map(|cell| format!("{:<width$}", cell, width = GRID_CELL))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full record, as shown on the detail page.
pub fn details(character: &Character, favorite: bool, note: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{} (#{})",
        if favorite { "* " } else { "" },
        character.name,
        character.id
    );

    let fields = [
        ("Species", &character.species),
        ("Affiliation", &character.affiliation),
        ("Role", &character.role),
        ("Status", &character.status),
        ("Equipment", &character.equipment),
        ("Weapons", &character.weapons),
        ("Abilities", &character.abilities),
        ("First seen", &character.first_appearance),
    ];
    let _ = writeln!(out, "  {:<13}{}", "Faction", character.faction);
    for (label, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "  {:<13}{}", label, value);
        }
    }

    for stat in Stat::ALL {
        let value = character.stats.get(stat);
        let _ = writeln!(
            out,
            "  {:<13}{:>2} {}",
            stat.label(),
            value,
            "#".repeat(usize::from(value))
        );
    }

    if !character.biography.is_empty() {
        let _ = writeln!(out, "\n{}", character.biography);
    }
    if let Some(note) = note {
        let _ = writeln!(out, "\nNote: {}", note);
    }

    out.trim_end().to_string()
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total characters: {}", dashboard.total);

    let _ = writeln!(out, "\nFactions");
    for share in dashboard.factions.represented() {
        let _ = writeln!(
            out,
            "  {:<11}{:>3} ({}%)",
            share.faction.as_str(),
            share.count,
            share.percentage
        );
    }

    let _ = writeln!(out, "\nAverages");
    for stat in Stat::ALL {
        let _ = writeln!(
            out,
            "  {:<13}{:.1}",
            stat.label(),
            dashboard.averages.get(stat)
        );
    }

    let _ = writeln!(out, "\nTop threats");
    for (rank, character) in dashboard.top_threats.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({})",
            rank + 1,
            character.name,
            character.threat_level()
        );
    }

    out.trim_end().to_string()
}

pub fn comparison(comparison: &Comparison<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<13}{:>18}   {}",
        "",
        comparison.left.name,
        comparison.right.name
    );

    for row in &comparison.rows {
        let marker = match row.outcome() {
            Ordering::Greater => ">",
            Ordering::Less => "<",
            Ordering::Equal => "=",
        };
        let _ = writeln!(
            out,
            "{:<13}{:>18} {} {}",
            row.stat.label(),
            row.left,
            marker,
            row.right
        );
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use halodex_core::{Faction, NewCharacter, Stats};

    fn character(id: i64, name: &str, threat: u8) -> Character {
        let mut stats = Stats::uniform(5);
        stats.threat_level = threat;
        Character::new(
            id,
            NewCharacter {
                name: name.to_string(),
                species: "Sangheili".to_string(),
                faction: Faction::Covenant,
                affiliation: "Fleet of Particular Justice".to_string(),
                role: "Shipmaster".to_string(),
                status: "Active".to_string(),
                equipment: "Combat harness".to_string(),
                weapons: String::new(),
                abilities: String::new(),
                biography: String::new(),
                image_url: String::new(),
                first_appearance: "Halo 2".to_string(),
                stats,
            },
        )
    }

    #[test]
    fn test_list_line_marks_favorites() {
        let line = list_line(&character(3, "Rtas 'Vadum", 8), true);
        assert!(line.starts_with("* #3"));
        assert!(line.contains("covenant"));
        assert!(line.ends_with("threat  8"));
    }

    #[test]
    fn test_grid_wraps_rows() {
        let records: Vec<Character> = (1..=4).map(|id| character(id, "Elite", 5)).collect();
        let text = grid(records.iter().map(|c| (c, false)));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_details_skip_empty_fields() {
        let text = details(&character(3, "Rtas 'Vadum", 8), false, Some("Lost an eye"));
        assert!(text.contains("Shipmaster"));
        assert!(!text.contains("Weapons"));
        assert!(text.contains("Threat Level  8 ########"));
        assert!(text.ends_with("Note: Lost an eye"));
    }

    #[test]
    fn test_dashboard_lists_only_represented_factions() {
        let records = vec![character(1, "A", 9), character(2, "B", 3)];
        let text = dashboard(&Dashboard::build(&records));
        assert!(text.contains("Total characters: 2"));
        assert!(text.contains("covenant"));
        assert!(!text.contains("flood"));
        assert!(text.contains("1. A (9)"));
    }
}
