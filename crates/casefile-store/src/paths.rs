//! Path resolution for casefile state files

use crate::error::{Result, StoreError};
use std::path::PathBuf;

const STATE_DIR: &str = ".casefile";
const FAVORITES_FILE: &str = "favorites.json";

/// Resolves where per-user state lives
#[derive(Debug, Clone)]
pub struct Paths {
    pub home_casefile: PathBuf,
}

impl Paths {
    /// `~/.casefile`, or `$CASEFILE_HOME` when set
    pub fn new() -> Result<Self> {
        if let Some(dir) = std::env::var_os("CASEFILE_HOME") {
            return Ok(Self::at(dir));
        }
        let home = dirs::home_dir().ok_or(StoreError::HomeNotFound)?;
        Ok(Self::at(home.join(STATE_DIR)))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            home_casefile: dir.into(),
        }
    }

    /// Favorites and search history
    pub fn favorites_file(&self) -> PathBuf {
        self.home_casefile.join(FAVORITES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_at() {
        let paths = Paths::at("/tmp/case");
        assert_eq!(paths.favorites_file(), PathBuf::from("/tmp/case/favorites.json"));
    }

    #[test]
    fn test_favorites_file_name() {
        let paths = Paths::at(PathBuf::from("state"));
        assert!(paths.favorites_file().ends_with("favorites.json"));
    }
}
