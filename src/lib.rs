//! Kiosk Control Core
//!
//! Firmware logic for a help-request kiosk: a 320x240 touch panel, an NFC
//! reader and a Wi-Fi link to a reporting backend. Residents tap through a
//! short guided flow, pick what they need help with, identify themselves
//! with their card and send a report.
//!
//! ```text
//!              +--------------------------+
//!   Platform ->| InitializationSequencer  |-- collaborators --+
//!              +--------------------------+                   |
//!                                                             v
//!   touch ---> TouchEdgeDispatcher ---> ScreenRouter ---> active Screen
//!                                          |                 |
//!   card ----> CardFeed ------------------------------> CardCorrelator
//!                                                            |
//!   network <------------------ BackendSyncPolicy <----------+
//! ```
//!
//! All hardware sits behind the traits in [`hal`]. The [`sim`] module
//! provides scripted stand-ins so the whole kiosk runs on a desktop.

pub mod backend;
pub mod card;
pub mod config;
pub mod context;
pub mod error;
pub mod hal;
pub mod init;
pub mod kiosk;
pub mod sim;
pub mod touch;
pub mod ui;

pub use backend::{BackendSyncPolicy, ReportSubmission, SubmissionOutcome, WaitEstimate};
pub use card::{CardCorrelator, CardIdentity, ResidentProfile};
pub use config::KioskConfig;
pub use context::KioskContext;
pub use error::{BackendError, InitError, SubsystemError};
pub use init::{InitPhase, InitializationSequencer, Platform};
pub use kiosk::Kiosk;
pub use touch::{TouchEdgeDispatcher, TouchEvent, TouchPoint};
pub use ui::{Screen, ScreenRouter};
