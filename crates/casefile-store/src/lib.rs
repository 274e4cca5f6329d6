//! Persistence for favorites and search history

mod error;
mod favorites;
mod io;
mod paths;

pub use error::{Result, StoreError};
pub use favorites::{FavoritesStore, MAX_SEARCH_HISTORY};
pub use io::atomic_write;
pub use paths::Paths;
