//! Proximity card identities and their consumers
//!
//! - [`CardIdentity`]: UID bytes read from the reader
//! - [`CardFeed`]: per-tick card presence fan-out to subscribed screens
//! - [`ResidentRegistry`]: UID → resident lookup table
//! - [`CardCorrelator`]: one-shot resolution of a newly presented card

mod correlator;
mod registry;

pub use correlator::{CardCorrelator, Correlation, ResidentProfile};
pub use registry::{
    ResidentEntry, ResidentLookup, ResidentRecord, ResidentRegistry, BUILTIN_RESIDENTS,
    MAX_RESIDENTS, RESIDENT_UID_LEN,
};

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// Longest UID an ISO14443A card reports
pub const MAX_UID_LEN: usize = 7;

/// UID of a detected card
///
/// Equality only looks at the UID bytes, never at the detection time.
#[derive(Clone, Copy, Debug)]
pub struct CardIdentity {
    uid: [u8; MAX_UID_LEN],
    len: u8,
    /// Tick time at which the reader saw the card
    pub detected_at_ms: u64,
}

impl CardIdentity {
    /// Returns `None` for an empty or over-long UID
    pub fn new(uid: &[u8], detected_at_ms: u64) -> Option<Self> {
        if uid.is_empty() || uid.len() > MAX_UID_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_UID_LEN];
        bytes[..uid.len()].copy_from_slice(uid);
        Some(Self {
            uid: bytes,
            len: uid.len() as u8,
            detected_at_ms,
        })
    }

    pub fn uid(&self) -> &[u8] {
        &self.uid[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upper-case, colon separated hex (`04:A1:B2:C3`)
    pub fn uid_string(&self) -> String {
        format_uid(self.uid())
    }
}

impl PartialEq for CardIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.uid() == other.uid()
    }
}

impl Eq for CardIdentity {}

impl fmt::Display for CardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uid_string())
    }
}

/// Format UID bytes as `AA:BB:CC`
pub fn format_uid(uid: &[u8]) -> String {
    uid.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parse `AA:BB:CC` (case-insensitive, `:` or `-` separated, or bare hex)
pub fn parse_uid(text: &str) -> Option<Vec<u8>> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

/// Card presence notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardEvent {
    /// A card is in the field this tick
    Present(CardIdentity),
    /// The card left the field
    Removed(CardIdentity),
}

/// Handle returned by [`CardFeed::subscribe`]
pub type SubscriptionId = u64;

/// Receiving end of a card feed registration
pub struct CardSubscription {
    id: SubscriptionId,
    rx: Receiver<CardEvent>,
}

impl CardSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Events published since the last drain, oldest first
    pub fn drain(&self) -> impl Iterator<Item = CardEvent> + '_ {
        self.rx.try_iter()
    }
}

/// Fan-out of card presence to whichever screens are listening
///
/// Screens subscribe on enter and unsubscribe on exit. While a card stays
/// in the field every tick publishes `Present`; its departure publishes one
/// `Removed`. Dedup is the consumer's job (see [`CardCorrelator`]).
#[derive(Default)]
pub struct CardFeed {
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, Sender<CardEvent>)>,
    present: Option<CardIdentity>,
}

impl CardFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> CardSubscription {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, tx));
        CardSubscription { id, rx }
    }

    /// Returns `false` if `id` was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Publish this tick's reader state
    pub fn publish(&mut self, current: Option<CardIdentity>) {
        match (current, self.present) {
            (Some(card), _) => self.send(CardEvent::Present(card)),
            (None, Some(gone)) => self.send(CardEvent::Removed(gone)),
            (None, None) => {}
        }
        self.present = current;
    }

    fn send(&mut self, event: CardEvent) {
        // Dropped receivers unregister themselves.
        self.listeners.retain(|(_, tx)| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality_ignores_timestamp() {
        let a = CardIdentity::new(&[0x04, 0xA1, 0xB2, 0xC3], 10).unwrap();
        let b = CardIdentity::new(&[0x04, 0xA1, 0xB2, 0xC3], 99).unwrap();
        let c = CardIdentity::new(&[0x04, 0xA1, 0xB2, 0xC3, 0x00], 10).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_identity_rejects_bad_lengths() {
        assert!(CardIdentity::new(&[], 0).is_none());
        assert!(CardIdentity::new(&[0; 8], 0).is_none());
        assert_eq!(CardIdentity::new(&[0; 7], 0).unwrap().len(), 7);
    }

    #[test]
    fn test_uid_format_and_parse() {
        let card = CardIdentity::new(&[0xC0, 0xF4, 0xE4, 0x5F], 0).unwrap();
        assert_eq!(card.uid_string(), "C0:F4:E4:5F");
        assert_eq!(parse_uid("c0:f4:e4:5f"), Some(vec![0xC0, 0xF4, 0xE4, 0x5F]));
        assert_eq!(parse_uid("C0F4E45F"), Some(vec![0xC0, 0xF4, 0xE4, 0x5F]));
        assert_eq!(parse_uid("C0:F"), None);
        assert_eq!(parse_uid("zz"), None);
    }

    #[test]
    fn test_feed_presence_and_removal() {
        let mut feed = CardFeed::new();
        let sub = feed.subscribe();
        let card = CardIdentity::new(&[1, 2, 3, 4], 0).unwrap();

        feed.publish(Some(card));
        feed.publish(Some(card));
        feed.publish(None);
        feed.publish(None);

        let events: Vec<_> = sub.drain().collect();
        assert_eq!(
            events,
            vec![
                CardEvent::Present(card),
                CardEvent::Present(card),
                CardEvent::Removed(card)
            ]
        );
    }

    #[test]
    fn test_unsubscribe_and_dropped_listeners() {
        let mut feed = CardFeed::new();
        let a = feed.subscribe();
        let b = feed.subscribe();
        assert_eq!(feed.listener_count(), 2);

        assert!(feed.unsubscribe(a.id()));
        assert!(!feed.unsubscribe(a.id()));
        drop(b);

        feed.publish(CardIdentity::new(&[9], 0));
        assert_eq!(feed.listener_count(), 0);
    }
}
