//! Favorites and search history, persisted as one JSON file

use crate::error::Result;
use crate::io::atomic_write;
use crate::paths::Paths;
use casefile_core::{DocKey, DocType, Favorite};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const MAX_SEARCH_HISTORY: usize = 100;

#[derive(Debug, Default, Deserialize)]
struct StoredState {
    #[serde(default)]
    search_history: Vec<String>,
    #[serde(default)]
    favorites: Vec<Value>,
}

#[derive(Serialize)]
struct SavedState<'a> {
    search_history: &'a [String],
    favorites: &'a [Favorite],
}

/// Bookmarked documents and recent queries.
///
/// Every mutation is written through immediately.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    history: Vec<String>,
    favorites: Vec<Favorite>,
}

impl FavoritesStore {
    /// Opens the store at `path`; a missing file is an empty store.
    /// Favorite entries that cannot be read are dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state: StoredState = if path.exists() {
            serde_json::from_slice(&std::fs::read(&path)?)?
        } else {
            StoredState::default()
        };

        let mut favorites = Vec::with_capacity(state.favorites.len());
        for entry in state.favorites {
            match serde_json::from_value::<Favorite>(entry) {
                Ok(fav) if !fav.id.is_empty() => favorites.push(fav),
                Ok(_) => tracing::warn!("dropping favorite without id"),
                Err(e) => tracing::warn!(error = %e, "dropping unreadable favorite"),
            }
        }

        let mut history = state.search_history;
        history.truncate(MAX_SEARCH_HISTORY);

        tracing::debug!(
            path = %path.display(),
            favorites = favorites.len(),
            history = history.len(),
            "opened favorites store"
        );
        Ok(Self {
            path,
            history,
            favorites,
        })
    }

    /// Opens the per-user store under [`Paths`].
    pub fn open_default() -> Result<Self> {
        Self::open(Paths::new()?.favorites_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bookmarks a document, or updates the saved query of an existing
    /// bookmark. Returns `true` when a new bookmark was created.
    pub fn add(&mut self, doc_type: DocType, id: &str, query: &str) -> Result<bool> {
        let created = match self
            .favorites
            .iter_mut()
            .find(|f| f.doc_type == doc_type && f.id == id)
        {
            Some(existing) => {
                existing.saved_query = query.to_string();
                false
            }
            None => {
                self.favorites.push(Favorite {
                    doc_type,
                    id: id.to_string(),
                    saved_query: query.to_string(),
                });
                true
            }
        };
        self.save()?;
        Ok(created)
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, doc_type: DocType, id: &str) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites
            .retain(|f| !(f.doc_type == doc_type && f.id == id));
        let removed = self.favorites.len() < before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Membership set for flagging search results
    pub fn keys(&self) -> HashSet<DocKey> {
        self.favorites.iter().map(Favorite::key).collect()
    }

    /// Most recent first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Records a query at the front of the history. Blank queries are ignored.
    pub fn push_history(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        if self.history.first().is_some_and(|q| q == query) {
            return Ok(());
        }
        self.history.retain(|q| q != query);
        self.history.insert(0, query.to_string());
        self.history.truncate(MAX_SEARCH_HISTORY);
        self.save()
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let state = SavedState {
            search_history: &self.history,
            favorites: &self.favorites,
        };
        let bytes = serde_json::to_vec_pretty(&state)?;
        atomic_write(&self.path, &bytes)?;
        Ok(())
    }
}
