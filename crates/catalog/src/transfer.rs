//! JSON export and import of the character collection.
//!
//! The export format is a JSON array of records with camelCase field names,
//! ids included. Import accepts the same array and ignores the ids: every
//! element is added as a new record.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use halodex_core::{Character, NewCharacter};
use serde_json::Value;

use crate::error::{CatalogError, Result};

/// Result of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records added to the store.
    pub imported: usize,
}

/// File name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("halodex-export-{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the collection for export.
pub fn to_json(records: &[Character]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write an export of `records` into `dir`, named for `date`.
pub fn write_export(dir: &Path, date: NaiveDate, records: &[Character]) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date));
    let text = to_json(records)?;
    fs::write(&path, text).map_err(|source| CatalogError::Export {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Split an import payload into its elements.
///
/// Anything other than a JSON array is rejected before a single record is
/// touched.
pub fn parse_import(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| CatalogError::MalformedImport(format!("not valid JSON: {err}")))?;

    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(CatalogError::MalformedImport(format!(
            "expected an array of characters, got {}",
            kind(&other)
        ))),
    }
}

/// Decode one import element, dropping any id it carries.
pub fn decode_element(value: Value) -> Result<NewCharacter> {
    Ok(serde_json::from_value(value)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halodex_core::{Faction, Stats};

    fn record(id: i64, name: &str) -> Character {
        Character::new(
            id,
            NewCharacter {
                name: name.to_string(),
                species: "Human".to_string(),
                faction: Faction::Unsc,
                affiliation: "UNSC Navy".to_string(),
                role: "Spartan".to_string(),
                status: "Active".to_string(),
                equipment: "MJOLNIR".to_string(),
                weapons: String::new(),
                abilities: String::new(),
                biography: String::new(),
                image_url: String::new(),
                first_appearance: String::new(),
                stats: Stats::uniform(6),
            },
        )
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "halodex-export-2026-03-07.json");
    }

    #[test]
    fn test_export_keeps_ids_and_camel_case() {
        let text = to_json(&[record(9, "Kat")]).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["id"], 9);
        assert_eq!(value[0]["threatLevel"], 6);
        assert_eq!(value[0]["faction"], "unsc");
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        for text in ["{\"name\": \"Kat\"}", "42", "not json"] {
            assert!(matches!(
                parse_import(text),
                Err(CatalogError::MalformedImport(_))
            ));
        }
        assert!(parse_import("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_element_ignores_id() {
        let value = serde_json::to_value(record(77, "Kat")).unwrap();
        let decoded = decode_element(value).unwrap();
        assert_eq!(decoded.name, "Kat");

        let err = decode_element(serde_json::json!({ "name": "No faction" })).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidElement(_)));
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let path = write_export(dir.path(), date, &[record(1, "Kat")]).unwrap();

        assert_eq!(path, dir.path().join("halodex-export-2026-10-19.json"));
        let value: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);

        let missing = dir.path().join("missing");
        assert!(matches!(
            write_export(&missing, date, &[]),
            Err(CatalogError::Export { .. })
        ));
    }
}
