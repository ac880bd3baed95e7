//! One-shot resolution of presented cards

use super::{CardIdentity, ResidentLookup, ResidentRecord};

/// Who the kiosk believes is standing in front of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentProfile {
    pub name: String,
    pub phone: String,
    /// `None` for the anonymous placeholder
    pub apartment: Option<u16>,
}

impl ResidentProfile {
    /// Placeholder bound to cards the registry does not know
    pub fn anonymous() -> Self {
        Self {
            name: "Uzytkownik".to_string(),
            phone: "Brak telefonu".to_string(),
            apartment: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.apartment.is_none()
    }
}

impl From<&ResidentRecord> for ResidentProfile {
    fn from(record: &ResidentRecord) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            apartment: Some(record.apartment),
        }
    }
}

/// A card that has just been correlated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub card: CardIdentity,
    pub profile: ResidentProfile,
}

/// Remembers the last correlated card so a card left on the reader fires once
#[derive(Debug, Default)]
pub struct CardCorrelator {
    last: Option<CardIdentity>,
}

impl CardCorrelator {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Resolve `card` unless it is the one correlated last
    ///
    /// Every new card yields a profile; unknown or wrong-length UIDs get
    /// [`ResidentProfile::anonymous`].
    pub fn correlate(&mut self, card: &CardIdentity, lookup: &dyn ResidentLookup) -> Option<Correlation> {
        if card.is_empty() || self.last.as_ref() == Some(card) {
            return None;
        }
        self.last = Some(*card);

        let profile = match lookup.find_by_uid(card.uid()) {
            Some(record) => {
                log::info!("Card {} resolved to resident in apartment {}", card, record.apartment);
                ResidentProfile::from(record)
            }
            None => {
                log::info!("Card {} not in registry, using anonymous profile", card);
                ResidentProfile::anonymous()
            }
        };

        Some(Correlation {
            card: *card,
            profile,
        })
    }

    pub fn last_correlated(&self) -> Option<&CardIdentity> {
        self.last.as_ref()
    }

    /// Forget the last card so it may trigger again
    pub fn reset(&mut self) {
        self.last = None;
    }
}
