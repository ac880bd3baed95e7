//! Collaborator interfaces
//!
//! Everything hardware- or transport-specific sits behind these traits:
//!
//! ```text
//!            KioskContext
//!                 │
//!   ┌────────┬────┴───┬──────────┬─────────────┐
//!   ▼        ▼        ▼          ▼             ▼
//! Display  Touch    Card      Network     Preferences
//! Surface  Source   Source    Transport   Store
//! ```

pub mod card;
pub mod display;
pub mod network;
pub mod storage;
pub mod touch;

pub use card::{CardSource, CARD_POLL_INTERVAL_MS};
pub use display::{draw_centered_text, Color, DisplaySurface};
pub use network::{HttpResponse, NetworkTransport, TransportError};
pub use storage::{PreferenceStore, PREF_SITE_ADDRESS, PREF_SITE_CITY};
pub use touch::{TouchSource, TOUCH_DEBOUNCE_MS};
