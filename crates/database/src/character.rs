//! Character CRUD operations.

use halodex_core::{Character, Faction, NewCharacter};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::{decode_rows, CharacterRow, CHARACTER_COLUMNS};

fn not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "Character",
        id: id.to_string(),
    }
}

/// Insert a validated record through any executor (pool or transaction).
pub(crate) async fn insert<'e, E>(executor: E, character: &NewCharacter) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO characters (
            name, species, faction, affiliation, role, status, equipment,
            weapons, abilities, biography, image_url, first_appearance,
            threat_level, combat_skill, intelligence, leadership,
            strength, durability, technology
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&character.name)
    .bind(&character.species)
    .bind(character.faction.as_str())
    .bind(&character.affiliation)
    .bind(&character.role)
    .bind(&character.status)
    .bind(&character.equipment)
    .bind(&character.weapons)
    .bind(&character.abilities)
    .bind(&character.biography)
    .bind(&character.image_url)
    .bind(&character.first_appearance)
    .bind(i64::from(character.stats.threat_level))
    .bind(i64::from(character.stats.combat_skill))
    .bind(i64::from(character.stats.intelligence))
    .bind(i64::from(character.stats.leadership))
    .bind(i64::from(character.stats.strength))
    .bind(i64::from(character.stats.durability))
    .bind(i64::from(character.stats.technology))
    .execute(executor)
    .await
    .map_err(DatabaseError::WriteFailed)?;

    Ok(result.last_insert_rowid())
}

/// Create a new character and return the id assigned by the store.
pub async fn add_character(pool: &SqlitePool, character: &NewCharacter) -> Result<i64> {
    character.validate()?;

    let id = insert(pool, character).await?;
    debug!(id, name = %character.name, "Added character");

    Ok(id)
}

/// Get a character by ID.
pub async fn get_character(pool: &SqlitePool, id: i64) -> Result<Character> {
    let row = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {} FROM characters WHERE id = ?",
        CHARACTER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))?;

    Character::try_from(row)
}

/// List all characters in store order (ascending id).
pub async fn list_characters(pool: &SqlitePool) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {} FROM characters ORDER BY id",
        CHARACTER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    decode_rows(rows)
}

/// Replace an existing character by ID.
///
/// Fails with `NotFound` when no record has that id; use
/// [`add_character`] to create records.
pub async fn update_character(pool: &SqlitePool, character: &Character) -> Result<()> {
    character.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE characters
        SET name = ?, species = ?, faction = ?, affiliation = ?, role = ?,
            status = ?, equipment = ?, weapons = ?, abilities = ?, biography = ?,
            image_url = ?, first_appearance = ?, threat_level = ?, combat_skill = ?,
            intelligence = ?, leadership = ?, strength = ?, durability = ?, technology = ?
        WHERE id = ?
        "#,
    )
    .bind(&character.name)
    .bind(&character.species)
    .bind(character.faction.as_str())
    .bind(&character.affiliation)
    .bind(&character.role)
    .bind(&character.status)
    .bind(&character.equipment)
    .bind(&character.weapons)
    .bind(&character.abilities)
    .bind(&character.biography)
    .bind(&character.image_url)
    .bind(&character.first_appearance)
    .bind(i64::from(character.stats.threat_level))
    .bind(i64::from(character.stats.combat_skill))
    .bind(i64::from(character.stats.intelligence))
    .bind(i64::from(character.stats.leadership))
    .bind(i64::from(character.stats.strength))
    .bind(i64::from(character.stats.durability))
    .bind(i64::from(character.stats.technology))
    .bind(character.id)
    .execute(pool)
    .await
    .map_err(DatabaseError::WriteFailed)?;

    if result.rows_affected() == 0 {
        return Err(not_found(character.id));
    }

    debug!(id = character.id, "Updated character");
    Ok(())
}

/// Delete a character by ID.
///
/// Deleting a missing id is not an error; the return value reports whether
/// a row was removed.
pub async fn delete_character(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM characters
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .map_err(DatabaseError::WriteFailed)?;

    let removed = result.rows_affected() > 0;
    debug!(id, removed, "Deleted character");
    Ok(removed)
}

/// All characters of one faction (served by the faction index).
pub async fn find_by_faction(pool: &SqlitePool, faction: Faction) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {} FROM characters WHERE faction = ? ORDER BY id",
        CHARACTER_COLUMNS
    ))
    .bind(faction.as_str())
    .fetch_all(pool)
    .await?;

    decode_rows(rows)
}

/// All characters with exactly this name (served by the name index).
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {} FROM characters WHERE name = ? ORDER BY id",
        CHARACTER_COLUMNS
    ))
    .bind(name)
    .fetch_all(pool)
    .await?;

    decode_rows(rows)
}

/// All characters with exactly this species (served by the species index).
pub async fn find_by_species(pool: &SqlitePool, species: &str) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {} FROM characters WHERE species = ? ORDER BY id",
        CHARACTER_COLUMNS
    ))
    .bind(species)
    .fetch_all(pool)
    .await?;

    decode_rows(rows)
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring search over name, species, affiliation and role.
///
/// Case folding is ASCII-only, matching SQLite's `lower()`; other characters
/// must match exactly.
pub async fn search_characters(pool: &SqlitePool, query: &str) -> Result<Vec<Character>> {
    let pattern = format!("%{}%", escape_like(&query.to_ascii_lowercase()));

    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        r#"
        SELECT {} FROM characters
        WHERE lower(name) LIKE ?1 ESCAPE '\'
           OR lower(species) LIKE ?1 ESCAPE '\'
           OR lower(affiliation) LIKE ?1 ESCAPE '\'
           OR lower(role) LIKE ?1 ESCAPE '\'
        ORDER BY id
        "#,
        CHARACTER_COLUMNS
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    decode_rows(rows)
}

/// Count stored characters.
pub async fn count_characters(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM characters
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halodex_core::{Stats, ValidationError};

    async fn test_pool() -> crate::Database {
        let mut db = crate::Database::new("sqlite::memory:").unwrap().without_seed();
        db.initialize().await.unwrap();
        db
    }

    fn spartan(name: &str) -> NewCharacter {
        NewCharacter {
            name: name.to_string(),
            species: "Human (Spartan-IV)".to_string(),
            faction: Faction::Unsc,
            affiliation: "Fireteam Osiris".to_string(),
            role: "Spartan".to_string(),
            status: "Active".to_string(),
            equipment: "MJOLNIR GEN2".to_string(),
            weapons: "BR55".to_string(),
            abilities: String::new(),
            biography: String::new(),
            image_url: String::new(),
            first_appearance: "Halo 5: Guardians".to_string(),
            stats: Stats::uniform(8),
        }
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let new = spartan("Jameson Locke");
        let id = add_character(pool, &new).await.unwrap();

        let fetched = get_character(pool, id).await.unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.to_new(), new);
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_not_reused() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let first = add_character(pool, &spartan("Locke")).await.unwrap();
        let second = add_character(pool, &spartan("Buck")).await.unwrap();
        assert_ne!(first, second);

        delete_character(pool, second).await.unwrap();
        let third = add_character(pool, &spartan("Vale")).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let id = add_character(pool, &spartan("Tanaka")).await.unwrap();
        assert!(delete_character(pool, id).await.unwrap());

        let result = get_character(pool, id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        // Idempotent
        assert!(!delete_character(pool, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let id = add_character(pool, &spartan("Buck")).await.unwrap();
        let mut character = get_character(pool, id).await.unwrap();
        character.status = "MIA".to_string();
        character.stats.threat_level = 9;

        update_character(pool, &character).await.unwrap();
        assert_eq!(get_character(pool, id).await.unwrap(), character);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let ghost = Character::new(999, spartan("Ghost"));
        let result = update_character(pool, &ghost).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        // No upsert
        assert_eq!(count_characters(pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_record_is_rejected() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let mut bad = spartan("Overcharged");
        bad.stats.strength = 11;
        let result = add_character(pool, &bad).await;
        assert!(matches!(
            result,
            Err(DatabaseError::Invalid(ValidationError::StatOutOfRange { .. }))
        ));

        let mut unnamed = spartan("");
        unnamed.name = "  ".to_string();
        assert!(add_character(pool, &unnamed).await.is_err());
        assert_eq!(count_characters(pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_secondary_lookups() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        add_character(pool, &spartan("Locke")).await.unwrap();
        let mut elite = spartan("Thel 'Vadam");
        elite.faction = Faction::Covenant;
        elite.species = "Sangheili".to_string();
        elite.affiliation = "Swords of Sanghelios".to_string();
        elite.role = "Arbiter".to_string();
        add_character(pool, &elite).await.unwrap();

        let covenant = find_by_faction(pool, Faction::Covenant).await.unwrap();
        assert_eq!(covenant.len(), 1);
        assert_eq!(covenant[0].name, "Thel 'Vadam");
        assert!(find_by_faction(pool, Faction::Flood).await.unwrap().is_empty());

        assert_eq!(find_by_name(pool, "Locke").await.unwrap().len(), 1);
        assert_eq!(find_by_species(pool, "Sangheili").await.unwrap().len(), 1);

        let found = search_characters(pool, "arbit").await.unwrap();
        assert_eq!(found.len(), 1);
        let found = search_characters(pool, "OSIRIS").await.unwrap();
        assert_eq!(found[0].name, "Locke");
        assert!(search_characters(pool, "100%").await.unwrap().is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("chief"), "chief");
    }

    #[tokio::test]
    async fn test_search_folds_ascii_only() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let mut elite = spartan("Élan 'Vadum");
        elite.species = "Sangheili".to_string();
        add_character(pool, &elite).await.unwrap();

        assert_eq!(search_characters(pool, "Élan").await.unwrap().len(), 1);
        assert_eq!(search_characters(pool, "ÉLAN").await.unwrap().len(), 1);
        assert_eq!(search_characters(pool, "vADUM").await.unwrap().len(), 1);
        // Non-ASCII letters are not case-folded
        assert!(search_characters(pool, "élan").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_row_is_corrupt() {
        let db = test_pool().await;
        let pool = db.pool().unwrap();

        let id = sqlx::query(
            r#"
            INSERT INTO characters (
                name, species, faction, threat_level, combat_skill, intelligence,
                leadership, strength, durability, technology
            )
            VALUES ('Glitched', 'Unknown', 'flood', 0, 11, 200, 5, 5, 5, 5)
            "#,
        )
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

        assert!(matches!(
            list_characters(pool).await,
            Err(DatabaseError::Corrupt { .. })
        ));
        assert!(matches!(
            get_character(pool, id).await,
            Err(DatabaseError::Corrupt { id: corrupt_id, .. }) if corrupt_id == id
        ));
        assert!(matches!(
            find_by_faction(pool, Faction::Flood).await,
            Err(DatabaseError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_writes_to_read_only_store_fail() {
        use sqlx::sqlite::SqliteConnectOptions;
        use std::str::FromStr;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let mut db = crate::Database::new(&format!("sqlite:{}?mode=rwc", path.display()))
            .unwrap()
            .without_seed();
        db.initialize().await.unwrap();
        let id = add_character(db.pool().unwrap(), &spartan("Palmer"))
            .await
            .unwrap();

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=ro", path.display())).unwrap();
        let read_only = SqlitePool::connect_with(options).await.unwrap();

        let existing = get_character(&read_only, id).await.unwrap();
        assert_eq!(existing.name, "Palmer");

        assert!(matches!(
            add_character(&read_only, &spartan("Vale")).await,
            Err(DatabaseError::WriteFailed(_))
        ));
        assert!(matches!(
            update_character(&read_only, &existing).await,
            Err(DatabaseError::WriteFailed(_))
        ));
        assert!(matches!(
            delete_character(&read_only, id).await,
            Err(DatabaseError::WriteFailed(_))
        ));

        read_only.close().await;
        db.close().await;
    }
}
