//! The in-memory character collection and the bookkeeping around it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use database::{character, Database};
use halodex_core::{
    compare, filter_and_sort, Character, Dashboard, Faction, NewCharacter, StatComparison,
    ViewQuery,
};
use preferences::{LocalStorage, MemoryBackend, Preference, PreferenceStore};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::keys::{
    ViewMode, ACTIVE_TAB_KEY, DEFAULT_ACTIVE_TAB, FAVORITES_KEY, NOTES_KEY, VIEW_MODE_KEY,
};
use crate::transfer::{self, ImportSummary};

/// Two characters side by side.
#[derive(Debug, Clone)]
pub struct Comparison<'a> {
    pub left: &'a Character,
    pub right: &'a Character,
    pub rows: Vec<StatComparison>,
}

/// The loaded collection plus favorites, notes and layout preferences.
///
/// Every mutation goes to the record store first; the in-memory collection
/// is only patched once the store write has completed, so a failed write
/// leaves it untouched.
#[derive(Debug)]
pub struct Catalog {
    db: Database,
    characters: Vec<Character>,
    favorites: Preference<Vec<i64>>,
    notes: Preference<BTreeMap<i64, String>>,
    view_mode: Preference<ViewMode>,
    active_tab: Preference<String>,
}

impl Catalog {
    /// Open the record store and preference storage named by `config`.
    pub async fn open(config: &CatalogConfig) -> Result<Self> {
        let storage = match &config.preferences_path {
            Some(path) => LocalStorage::open_file(path, Some(config.storage_quota_bytes))?,
            None => LocalStorage::new(MemoryBackend::with_quota(config.storage_quota_bytes)),
        };
        Self::open_with(config, storage.context()).await
    }

    /// Open the record store, attaching an existing preference context.
    pub async fn open_with(config: &CatalogConfig, preferences: PreferenceStore) -> Result<Self> {
        let mut db = Database::new(&config.database_url)?.with_pool_size(config.pool_size);
        if !config.seed {
            db = db.without_seed();
        }
        db.initialize().await?;

        let characters = character::list_characters(db.pool()?).await?;
        info!("Loaded {} characters", characters.len());

        Ok(Self {
            db,
            characters,
            favorites: preferences.held(FAVORITES_KEY, Vec::new()),
            notes: preferences.held(NOTES_KEY, BTreeMap::new()),
            view_mode: preferences.held(VIEW_MODE_KEY, ViewMode::default()),
            active_tab: preferences.held(ACTIVE_TAB_KEY, DEFAULT_ACTIVE_TAB.to_string()),
        })
    }

    /// Close the record store.
    pub async fn close(mut self) {
        self.db.close().await;
    }

    /// The underlying record store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Apply preference changes made by other contexts. Returns how many
    /// held values changed.
    pub fn sync_preferences(&mut self) -> usize {
        self.favorites.sync() + self.notes.sync() + self.view_mode.sync() + self.active_tab.sync()
    }

    // --- Records ---

    /// Every loaded character, in store order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    fn contains(&self, id: i64) -> bool {
        self.characters.iter().any(|c| c.id == id)
    }

    /// A loaded character by id.
    pub fn find(&self, id: i64) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Read a character straight from the store.
    pub async fn get(&self, id: i64) -> Result<Character> {
        Ok(character::get_character(self.db.pool()?, id).await?)
    }

    /// Characters of one faction, served by the store's faction index.
    pub async fn find_by_faction(&self, faction: Faction) -> Result<Vec<Character>> {
        Ok(character::find_by_faction(self.db.pool()?, faction).await?)
    }

    /// The filtered, sorted list view.
    pub fn view(&self, query: &ViewQuery) -> Vec<&Character> {
        filter_and_sort(&self.characters, query, &self.favorites())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(&self.characters)
    }

    /// Compare two loaded characters attribute by attribute.
    pub fn compare(&self, left: i64, right: i64) -> Result<Comparison<'_>> {
        let left = self.find(left).ok_or(CatalogError::UnknownCharacter(left))?;
        let right = self
            .find(right)
            .ok_or(CatalogError::UnknownCharacter(right))?;

        Ok(Comparison {
            left,
            right,
            rows: compare(left, right),
        })
    }

    /// Add a character and return it with its assigned id.
    pub async fn add(&mut self, new: &NewCharacter) -> Result<&Character> {
        let id = character::add_character(self.db.pool()?, new).await?;
        info!("Added character {} ({})", id, new.name);

        self.characters.push(Character::new(id, new.clone()));
        Ok(&self.characters[self.characters.len() - 1])
    }

    /// Replace a stored character.
    pub async fn update(&mut self, updated: &Character) -> Result<()> {
        character::update_character(self.db.pool()?, updated).await?;
        info!("Updated character {}", updated.id);

        match self.characters.iter_mut().find(|c| c.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => self.characters.push(updated.clone()),
        }
        Ok(())
    }

    /// Delete a character along with its favorite flag and note.
    ///
    /// Returns whether the store held the record.
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let removed = character::delete_character(self.db.pool()?, id).await?;
        if removed {
            info!("Deleted character {}", id);
        }

        self.characters.retain(|c| c.id != id);

        if self.favorites.value().contains(&id) {
            self.favorites.update(|ids| ids.retain(|fav| *fav != id));
        }
        if self.notes.value().contains_key(&id) {
            self.notes.update(|notes| {
                notes.remove(&id);
            });
        }

        Ok(removed)
    }

    /// Reload the collection from the store.
    pub async fn reload(&mut self) -> Result<()> {
        self.characters = character::list_characters(self.db.pool()?).await?;
        debug!("Reloaded {} characters", self.characters.len());
        Ok(())
    }

    /// Wipe the store back to the built-in dataset.
    pub async fn reset(&mut self) -> Result<()> {
        self.db.reset().await?;
        self.reload().await
    }

    // --- Favorites ---

    /// Favorite ids that still name a loaded character.
    pub fn favorites(&self) -> Vec<i64> {
        self.favorites
            .value()
            .iter()
            .copied()
            .filter(|id| self.contains(*id))
            .collect()
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.value().contains(&id) && self.contains(id)
    }

    /// Flip the favorite flag and return the new state.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        if !self.contains(id) {
            return Err(CatalogError::UnknownCharacter(id));
        }

        let now_favorite = !self.favorites.value().contains(&id);
        self.favorites.update(|ids| {
            if now_favorite {
                ids.push(id);
            } else {
                ids.retain(|fav| *fav != id);
            }
        });
        Ok(now_favorite)
    }

    // --- Notes ---

    pub fn note(&self, id: i64) -> Option<&str> {
        if !self.contains(id) {
            return None;
        }
        self.notes.value().get(&id).map(String::as_str)
    }

    /// Notes that still name a loaded character.
    pub fn notes(&self) -> Vec<(i64, &str)> {
        self.notes
            .value()
            .iter()
            .filter(|(id, _)| self.contains(**id))
            .map(|(id, text)| (*id, text.as_str()))
            .collect()
    }

    /// Save a note. Blank text removes the note instead.
    pub fn save_note(&mut self, id: i64, text: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(CatalogError::UnknownCharacter(id));
        }

        if text.trim().is_empty() {
            self.delete_note(id);
            return Ok(());
        }

        self.notes.update(|notes| {
            notes.insert(id, text.to_string());
        });
        Ok(())
    }

    /// Remove a note. Returns whether one existed.
    pub fn delete_note(&mut self, id: i64) -> bool {
        if !self.notes.value().contains_key(&id) {
            return false;
        }
        self.notes.update(|notes| {
            notes.remove(&id);
        });
        true
    }

    // --- Layout ---

    pub fn view_mode(&self) -> ViewMode {
        *self.view_mode.value()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode.set(mode);
    }

    pub fn active_tab(&self) -> &str {
        self.active_tab.value()
    }

    pub fn set_active_tab(&mut self, tab: &str) {
        self.active_tab.set(tab.to_string());
    }

    // --- Import / export ---

    /// The whole collection as a JSON array.
    pub fn export_json(&self) -> Result<String> {
        transfer::to_json(&self.characters)
    }

    /// Write today's export file into `dir` and return its path.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let today = chrono::Local::now().date_naive();
        let path = transfer::write_export(dir, today, &self.characters)?;
        info!("Exported {} characters to {}", self.characters.len(), path.display());
        Ok(path)
    }

    /// Add every record in a JSON array as a new character.
    ///
    /// Ids in the payload are ignored. The first element that fails stops
    /// the import; the records before it stay added. The collection is
    /// reloaded from the store either way.
    pub async fn import_json(&mut self, text: &str) -> Result<ImportSummary> {
        let elements = transfer::parse_import(text)?;
        let (imported, failure) = self.add_all(elements).await?;

        self.reload().await?;

        match failure {
            None => {
                info!("Imported {} characters", imported);
                Ok(ImportSummary { imported })
            }
            Some(source) => {
                warn!("Import stopped after {} characters: {}", imported, source);
                Err(CatalogError::ImportAborted {
                    imported,
                    source: Box::new(source),
                })
            }
        }
    }

    async fn add_all(&self, elements: Vec<Value>) -> Result<(usize, Option<CatalogError>)> {
        let pool = self.db.pool()?;
        let mut imported = 0;

        for element in elements {
            let added = match transfer::decode_element(element) {
                Ok(new) => character::add_character(pool, &new)
                    .await
                    .map_err(CatalogError::from),
                Err(err) => Err(err),
            };

            match added {
                Ok(_) => imported += 1,
                Err(err) => return Ok((imported, Some(err))),
            }
        }

        Ok((imported, None))
    }
}
