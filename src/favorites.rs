//! Favorited entities, keyed by entity id, persisted as a JSON file.

use crate::model::Entity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&Entity> for FavoriteRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            name: entity.name().to_string(),
            image_url: entity.image_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FavoriteStore {
    records: BTreeMap<u32, FavoriteRecord>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `entity` as a favorite, refreshing the stored name and image.
    pub fn add(&mut self, entity: &Entity) {
        self.records.insert(entity.id(), FavoriteRecord::from(entity));
    }

    /// Returns the removed record, if `id` was a favorite.
    pub fn remove(&mut self, id: u32) -> Option<FavoriteRecord> {
        self.records.remove(&id)
    }

    /// Flips the favorite flag of `entity`; returns true if it is now a favorite.
    pub fn toggle(&mut self, entity: &Entity) -> bool {
        if self.remove(entity.id()).is_some() {
            false
        } else {
            self.add(entity);
            true
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<&FavoriteRecord> {
        self.records.get(&id)
    }

    /// Favorite ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.records.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Loads favorites from `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read favorites from {}", path.display()))?;
        let records: Vec<FavoriteRecord> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse favorites in {}", path.display()))?;
        Ok(Self {
            records: records.into_iter().map(|r| (r.id, r)).collect(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create favorites directory {}", parent.display())
            })?;
        }
        let records: Vec<&FavoriteRecord> = self.records.values().collect();
        let content = serde_json::to_string_pretty(&records)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write favorites to {}", path.display()))?;
        Ok(())
    }
}

pub fn get_data_dir() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("co", "pokeapi", "pokedex-client")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(project_dirs.data_dir().to_path_buf())
}

pub fn default_favorites_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("favorites.json"))
}
