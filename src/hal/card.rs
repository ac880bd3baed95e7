//! Proximity card reader contract

use crate::card::CardIdentity;

/// Polled NFC/RFID reader
///
/// Radio and bus handling stay behind this trait. The reader throttles its
/// own polling (about every [`CARD_POLL_INTERVAL_MS`]) inside `update`.
pub trait CardSource {
    /// Bring up the reader; `false` leaves the kiosk without card support
    fn initialize(&mut self) -> bool;

    /// Give the reader a chance to poll the antenna
    fn update(&mut self, _now_ms: u64) {}

    /// Whether a card is currently in the field
    fn is_present(&self) -> bool;

    /// Identity of the most recently read card
    fn last_card(&self) -> Option<CardIdentity>;

    /// Firmware version string, if the reader reports one
    fn firmware_version(&self) -> Option<String> {
        None
    }
}

/// Reader polling period
pub const CARD_POLL_INTERVAL_MS: u64 = 100;
