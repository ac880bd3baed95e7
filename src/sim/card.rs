//! Card reader replaying timed card taps

use crate::card::CardIdentity;
use crate::hal::{CardSource, CARD_POLL_INTERVAL_MS};

#[derive(Clone, Debug)]
struct Tap {
    start_ms: u64,
    end_ms: u64,
    uid: Vec<u8>,
}

/// Presents each scripted UID during its `[start, end)` window
///
/// Polls at most every [`CARD_POLL_INTERVAL_MS`], like the PN532 driver.
#[derive(Clone, Debug)]
pub struct ScriptedCardReader {
    taps: Vec<Tap>,
    init_ok: bool,
    initialized: bool,
    present: bool,
    last: Option<CardIdentity>,
    last_poll_ms: Option<u64>,
}

impl Default for ScriptedCardReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCardReader {
    pub fn new() -> Self {
        Self {
            taps: Vec::new(),
            init_ok: true,
            initialized: false,
            present: false,
            last: None,
            last_poll_ms: None,
        }
    }

    /// Reader that never answers its firmware query
    pub fn failing_init(mut self) -> Self {
        self.init_ok = false;
        self
    }

    pub fn tap(&mut self, start_ms: u64, end_ms: u64, uid: &[u8]) {
        self.taps.push(Tap {
            start_ms,
            end_ms,
            uid: uid.to_vec(),
        });
    }
}

impl CardSource for ScriptedCardReader {
    fn initialize(&mut self) -> bool {
        self.initialized = self.init_ok;
        self.initialized
    }

    fn update(&mut self, now_ms: u64) {
        if let Some(last) = self.last_poll_ms {
            if now_ms.saturating_sub(last) < CARD_POLL_INTERVAL_MS {
                return;
            }
        }
        self.last_poll_ms = Some(now_ms);

        let tap = self.taps.iter().find(|t| t.start_ms <= now_ms && now_ms < t.end_ms);
        match tap.and_then(|t| CardIdentity::new(&t.uid, now_ms)) {
            Some(card) => {
                if !self.present || self.last.as_ref() != Some(&card) {
                    log::debug!("Card detected: {}", card);
                }
                self.present = true;
                self.last = Some(card);
            }
            None => self.present = false,
        }
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn last_card(&self) -> Option<CardIdentity> {
        self.last
    }

    fn firmware_version(&self) -> Option<String> {
        self.initialized.then(|| "PN532 v1.6 (sim)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_follows_script_at_poll_rate() {
        let mut reader = ScriptedCardReader::new();
        reader.tap(150, 400, &[0x04, 0xA1, 0xB2, 0xC3]);
        assert!(reader.initialize());

        reader.update(0);
        assert!(!reader.is_present());
        reader.update(150);
        assert!(reader.is_present());
        assert_eq!(reader.last_card().unwrap().uid_string(), "04:A1:B2:C3");

        reader.update(420);
        assert!(!reader.is_present());
        assert!(reader.last_card().is_some());
    }

    #[test]
    fn test_poll_interval() {
        let mut reader = ScriptedCardReader::new();
        reader.tap(50, 1000, &[1, 2, 3, 4]);
        reader.update(0);
        reader.update(60);
        assert!(!reader.is_present());
        reader.update(100);
        assert!(reader.is_present());
    }

    #[test]
    fn test_failing_init() {
        let mut reader = ScriptedCardReader::new().failing_init();
        assert!(!reader.initialize());
        assert!(reader.firmware_version().is_none());
    }
}
