//! Built-in dataset loaded whenever the character table is created.

use halodex_core::{Faction, NewCharacter, Stats};
use sqlx::SqlitePool;
use tracing::info;

use crate::character;
use crate::error::{DatabaseError, Result};

const SEEDED_KEY: &str = "seeded_at";

struct Entry {
    name: &'static str,
    species: &'static str,
    faction: Faction,
    affiliation: &'static str,
    role: &'static str,
    status: &'static str,
    equipment: &'static str,
    weapons: &'static str,
    abilities: &'static str,
    biography: &'static str,
    first_appearance: &'static str,
    // threat, combat, intelligence, leadership, strength, durability, technology
    stats: [u8; 7],
}

impl Entry {
    fn build(&self) -> NewCharacter {
        let [
            threat_level,
            combat_skill,
            intelligence,
            leadership,
            strength,
            durability,
            technology,
        ] = self.stats;

        NewCharacter {
            name: self.name.to_string(),
            species: self.species.to_string(),
            faction: self.faction,
            affiliation: self.affiliation.to_string(),
            role: self.role.to_string(),
            status: self.status.to_string(),
            equipment: self.equipment.to_string(),
            weapons: self.weapons.to_string(),
            abilities: self.abilities.to_string(),
            biography: self.biography.to_string(),
            image_url: String::new(),
            first_appearance: self.first_appearance.to_string(),
            stats: Stats {
                threat_level,
                combat_skill,
                intelligence,
                leadership,
                strength,
                durability,
                technology,
            },
        }
    }
}

const ENTRIES: &[Entry] = &[
    Entry {
        name: "Master Chief",
        species: "Human (Spartan-II)",
        faction: Faction::Unsc,
        affiliation: "UNSC Navy",
        role: "Spartan Supersoldier",
        status: "Active",
        equipment: "MJOLNIR Powered Assault Armor",
        weapons: "MA5 Assault Rifle, M6 Magnum",
        abilities: "Enhanced reflexes, strategic improvisation",
        biography: "John-117, the Spartan-II who has repeatedly stood between humanity \
                    and extinction.",
        first_appearance: "Halo: Combat Evolved",
        stats: [10, 10, 8, 8, 9, 9, 7],
    },
    Entry {
        name: "Cortana",
        species: "Smart AI",
        faction: Faction::Unsc,
        affiliation: "UNSC Office of Naval Intelligence",
        role: "Artificial Intelligence",
        status: "Deceased",
        equipment: "Neural interface",
        weapons: "",
        abilities: "Electronic warfare, tactical analysis",
        biography: "Smart AI created from the cloned brain of Dr. Catherine Halsey.",
        first_appearance: "Halo: Combat Evolved",
        stats: [8, 2, 10, 7, 1, 3, 10],
    },
    Entry {
        name: "Sergeant Johnson",
        species: "Human",
        faction: Faction::Unsc,
        affiliation: "UNSC Marine Corps",
        role: "Marine Sergeant",
        status: "Deceased",
        equipment: "Marine battle dress uniform",
        weapons: "M90 Shotgun, Spartan Laser",
        abilities: "Leadership under fire",
        biography: "Avery Junior Johnson, veteran Marine and mentor to countless soldiers.",
        first_appearance: "Halo: Combat Evolved",
        stats: [6, 8, 6, 9, 6, 6, 5],
    },
    Entry {
        name: "Arbiter",
        species: "Sangheili",
        faction: Faction::Covenant,
        affiliation: "Swords of Sanghelios",
        role: "Arbiter",
        status: "Active",
        equipment: "Arbiter's Harness",
        weapons: "Energy Sword, Carbine",
        abilities: "Active camouflage, swordsmanship",
        biography: "Thel 'Vadam, former Supreme Commander who turned against the Prophets.",
        first_appearance: "Halo 2",
        stats: [9, 9, 8, 9, 8, 8, 6],
    },
    Entry {
        name: "Prophet of Truth",
        species: "San'Shyuum",
        faction: Faction::Covenant,
        affiliation: "High Council",
        role: "Hierarch",
        status: "Deceased",
        equipment: "Gravity throne",
        weapons: "",
        abilities: "Political manipulation",
        biography: "The Hierarch who drove the Covenant toward the Great Journey.",
        first_appearance: "Halo 2",
        stats: [8, 1, 9, 8, 1, 2, 7],
    },
    Entry {
        name: "Tartarus",
        species: "Jiralhanae",
        faction: Faction::Covenant,
        affiliation: "Covenant Jiralhanae",
        role: "Chieftain",
        status: "Deceased",
        equipment: "Chieftain armor",
        weapons: "Fist of Rukt",
        abilities: "Brute strength",
        biography: "Chieftain of the Brutes during the Great Schism.",
        first_appearance: "Halo 2",
        stats: [8, 8, 4, 7, 10, 8, 4],
    },
    Entry {
        name: "343 Guilty Spark",
        species: "Monitor",
        faction: Faction::Forerunner,
        affiliation: "Installation 04",
        role: "Monitor",
        status: "Unknown",
        equipment: "Monitor chassis",
        weapons: "Sentinel beam",
        abilities: "Installation control",
        biography: "Caretaker of Installation 04, devoted to protocol above all.",
        first_appearance: "Halo: Combat Evolved",
        stats: [7, 4, 10, 3, 2, 7, 10],
    },
    Entry {
        name: "Ur-Didact",
        species: "Forerunner",
        faction: Faction::Forerunner,
        affiliation: "Warrior-Servants",
        role: "Promethean Commander",
        status: "Contained",
        equipment: "Combat skin",
        weapons: "Composer",
        abilities: "Telekinesis, Promethean command",
        biography: "Forerunner military commander awakened on Requiem.",
        first_appearance: "Halo 4",
        stats: [10, 9, 9, 10, 9, 9, 10],
    },
    Entry {
        name: "Gravemind",
        species: "Flood",
        faction: Faction::Flood,
        affiliation: "The Flood",
        role: "Central Intelligence",
        status: "Unknown",
        equipment: "",
        weapons: "",
        abilities: "Hive mind, infestation",
        biography: "The central intelligence that directs the Flood.",
        first_appearance: "Halo 2",
        stats: [10, 5, 10, 10, 8, 9, 6],
    },
    Entry {
        name: "Atriox",
        species: "Jiralhanae",
        faction: Faction::Banished,
        affiliation: "The Banished",
        role: "Warmaster",
        status: "MIA",
        equipment: "Banished power armor",
        weapons: "Chaeron",
        abilities: "Strategic genius",
        biography: "Founder of the Banished and rebel against the Covenant.",
        first_appearance: "Halo Wars 2",
        stats: [10, 10, 8, 10, 10, 9, 7],
    },
    Entry {
        name: "Escharum",
        species: "Jiralhanae",
        faction: Faction::Banished,
        affiliation: "The Banished",
        role: "War Chief",
        status: "Deceased",
        equipment: "War Chief armor",
        weapons: "Hammer",
        abilities: "Battle-hardened leadership",
        biography: "Veteran war chief who led the Banished on Zeta Halo.",
        first_appearance: "Halo Infinite",
        stats: [9, 9, 7, 9, 9, 8, 5],
    },
    Entry {
        name: "The Weapon",
        species: "Smart AI",
        faction: Faction::Other,
        affiliation: "UNSC Infinity",
        role: "Artificial Intelligence",
        status: "Active",
        equipment: "",
        weapons: "",
        abilities: "Data analysis",
        biography: "AI created to capture and delete Cortana.",
        first_appearance: "Halo Infinite",
        stats: [5, 1, 9, 4, 1, 3, 9],
    },
];

/// The built-in dataset, in insertion order.
pub fn seed_characters() -> Vec<NewCharacter> {
    ENTRIES.iter().map(Entry::build).collect()
}

/// Seed the table once per database lifetime.
///
/// Returns the number of records inserted. The marker is written even when
/// `load_dataset` is false, so a table created empty stays empty.
pub(crate) async fn seed_once(pool: &SqlitePool, load_dataset: bool) -> Result<usize> {
    let mut tx = pool.begin().await?;

    let seeded = sqlx::query_scalar::<_, String>(
        r#"
        SELECT value FROM store_meta WHERE key = ?
        "#,
    )
    .bind(SEEDED_KEY)
    .fetch_optional(&mut *tx)
    .await?;

    if seeded.is_some() {
        return Ok(0);
    }

    let mut inserted = 0;
    if load_dataset {
        for record in seed_characters() {
            record.validate()?;
            character::insert(&mut *tx, &record).await?;
            inserted += 1;
        }
    }

    sqlx::query(
        r#"
        INSERT INTO store_meta (key, value)
        VALUES (?, datetime('now'))
        "#,
    )
    .bind(SEEDED_KEY)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::WriteFailed)?;

    tx.commit().await.map_err(DatabaseError::WriteFailed)?;

    info!(inserted, "Seeded character table");
    Ok(inserted)
}
