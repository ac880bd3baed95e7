//! In-memory collaborators for the host simulator and tests
//!
//! Each collaborator keeps a shared handle ([`DisplayLog`], [`RequestLog`])
//! so callers can inspect what happened after it has been boxed into the
//! kiosk context. Everything here is single-threaded.

mod card;
mod display;
mod network;
mod platform;
pub mod scenario;
mod storage;
mod touch;

pub use card::ScriptedCardReader;
pub use display::{DisplayLog, DrawOp, TerminalDisplay};
pub use network::{CannedTransport, RecordedRequest, RequestLog};
pub use platform::{FailPoint, SimPlatform};
pub use scenario::Scenario;
pub use storage::MemoryPreferences;
pub use touch::ScriptedTouch;
