//! In-memory resident table keyed by card UID

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{format_uid, parse_uid};
use crate::error::RegistryError;

/// Residents carry fixed 4-byte UIDs
pub const RESIDENT_UID_LEN: usize = 4;

/// Capacity of the runtime table
pub const MAX_RESIDENTS: usize = 100;

/// A resident bound to a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentRecord {
    pub uid: [u8; RESIDENT_UID_LEN],
    pub name: String,
    pub phone: String,
    pub apartment: u16,
}

/// Resident as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentEntry {
    /// `AA:BB:CC:DD`
    pub uid: String,
    pub name: String,
    pub phone: String,
    pub apartment: u16,
}

impl TryFrom<&ResidentEntry> for ResidentRecord {
    type Error = RegistryError;

    fn try_from(entry: &ResidentEntry) -> Result<Self, Self::Error> {
        let bytes = parse_uid(&entry.uid).ok_or_else(|| RegistryError::InvalidUid(entry.uid.clone()))?;
        let uid: [u8; RESIDENT_UID_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| RegistryError::InvalidUid(entry.uid.clone()))?;
        Ok(Self {
            uid,
            name: entry.name.clone(),
            phone: entry.phone.clone(),
            apartment: entry.apartment,
        })
    }
}

impl From<&ResidentRecord> for ResidentEntry {
    fn from(record: &ResidentRecord) -> Self {
        Self {
            uid: format_uid(&record.uid),
            name: record.name.clone(),
            phone: record.phone.clone(),
            apartment: record.apartment,
        }
    }
}

/// Residents compiled into the firmware
pub static BUILTIN_RESIDENTS: Lazy<Vec<ResidentRecord>> = Lazy::new(|| {
    vec![
        ResidentRecord {
            uid: [0x04, 0xA1, 0xB2, 0xC3],
            name: "Jan Kowalski".to_string(),
            phone: "600000001".to_string(),
            apartment: 12,
        },
        ResidentRecord {
            uid: [0x04, 0xDE, 0xAD, 0xBE],
            name: "Anna Nowak".to_string(),
            phone: "600000002".to_string(),
            apartment: 34,
        },
    ]
});

/// UID → resident resolution
pub trait ResidentLookup {
    /// Only an exactly [`RESIDENT_UID_LEN`]-byte UID can match
    fn find_by_uid(&self, uid: &[u8]) -> Option<&ResidentRecord>;
}

/// Runtime resident table
#[derive(Debug, Default)]
pub struct ResidentRegistry {
    records: Vec<ResidentRecord>,
}

impl ResidentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in residents
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.seed_defaults();
        registry
    }

    pub fn add_record(&mut self, record: ResidentRecord) -> Result<(), RegistryError> {
        if self.records.len() >= MAX_RESIDENTS {
            return Err(RegistryError::Full {
                capacity: MAX_RESIDENTS,
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Add every configured entry, skipping invalid ones
    ///
    /// Returns the number of records added.
    pub fn extend_from_entries(&mut self, entries: &[ResidentEntry]) -> usize {
        let mut added = 0;
        for entry in entries {
            match ResidentRecord::try_from(entry).and_then(|r| self.add_record(r)) {
                Ok(()) => added += 1,
                Err(e) => log::warn!("ResidentRegistry: skipping {}: {}", entry.name, e),
            }
        }
        added
    }

    /// Drop everything and re-seed the built-in residents
    pub fn clear_and_seed(&mut self) {
        log::info!("ResidentRegistry: clearing runtime registry and re-seeding built-in records");
        self.records.clear();
        self.seed_defaults();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ResidentRecord] {
        &self.records
    }

    fn seed_defaults(&mut self) {
        for record in BUILTIN_RESIDENTS.iter().take(MAX_RESIDENTS - self.records.len()) {
            self.records.push(record.clone());
        }
    }
}

impl ResidentLookup for ResidentRegistry {
    fn find_by_uid(&self, uid: &[u8]) -> Option<&ResidentRecord> {
        if uid.len() != RESIDENT_UID_LEN {
            return None;
        }
        self.records.iter().find(|r| r.uid.as_slice() == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = ResidentRegistry::with_builtin();
        assert_eq!(registry.len(), 2);

        let rec = registry.find_by_uid(&[0x04, 0xDE, 0xAD, 0xBE]).unwrap();
        assert_eq!(rec.name, "Anna Nowak");
        assert_eq!(rec.apartment, 34);
    }

    #[test]
    fn test_lookup_requires_exact_length() {
        let registry = ResidentRegistry::with_builtin();
        assert!(registry.find_by_uid(&[0x04, 0xA1, 0xB2]).is_none());
        assert!(registry.find_by_uid(&[0x04, 0xA1, 0xB2, 0xC3, 0x00]).is_none());
        assert!(registry.find_by_uid(&[0x04, 0xA1, 0xB2, 0xC3]).is_some());
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut registry = ResidentRegistry::new();
        for i in 0..MAX_RESIDENTS {
            let record = ResidentRecord {
                uid: [0, 0, (i >> 8) as u8, i as u8],
                name: format!("R{}", i),
                phone: String::new(),
                apartment: i as u16,
            };
            registry.add_record(record).unwrap();
        }
        let extra = BUILTIN_RESIDENTS[0].clone();
        assert!(matches!(registry.add_record(extra), Err(RegistryError::Full { .. })));
    }

    #[test]
    fn test_entries_from_config() {
        let mut registry = ResidentRegistry::new();
        let entries = vec![
            ResidentEntry {
                uid: "aa:bb:cc:dd".to_string(),
                name: "Ewa".to_string(),
                phone: "600000003".to_string(),
                apartment: 7,
            },
            ResidentEntry {
                uid: "AA:BB".to_string(),
                name: "Short".to_string(),
                phone: String::new(),
                apartment: 0,
            },
        ];
        assert_eq!(registry.extend_from_entries(&entries), 1);
        assert_eq!(registry.find_by_uid(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap().name, "Ewa");
        assert_eq!(ResidentEntry::from(&registry.records()[0]).uid, "AA:BB:CC:DD");
    }

    #[test]
    fn test_clear_and_seed() {
        let mut registry = ResidentRegistry::new();
        registry
            .add_record(ResidentRecord {
                uid: [1, 2, 3, 4],
                name: "Temp".to_string(),
                phone: String::new(),
                apartment: 1,
            })
            .unwrap();
        registry.clear_and_seed();
        assert_eq!(registry.len(), BUILTIN_RESIDENTS.len());
        assert!(registry.find_by_uid(&[1, 2, 3, 4]).is_none());
    }
}
