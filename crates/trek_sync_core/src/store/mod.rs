pub mod catalog;
pub mod detail;
pub mod favorites;
pub mod session;

pub use catalog::{CatalogState, CatalogStore};
pub use detail::{DetailState, DetailStore};
pub use favorites::{FavoriteSet, FavoritesState, FavoritesStore};
pub use session::{SessionState, SessionStore};
