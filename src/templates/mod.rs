//! Renderers for the interactive parts of the page.
//!
//! The full page is rendered by the server; these functions only own the
//! pieces whose state lives on the client.
//!
//! ## Module Structure
//!
//! - `heart` - favorite toggle buttons next to each result link
//! - `favorites` - the ordered favorites panel and its list model

pub mod favorites;
pub mod heart;

pub use favorites::{render_favorites_section, render_section_into, FavoriteEntry, FavoritesList};
pub use heart::{heart_states, render_all_from_store, update_all_heart_buttons, HeartState};
