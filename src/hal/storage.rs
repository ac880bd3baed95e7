//! Key-value preference storage contract

/// Persistent preferences (NVS namespace on the device)
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Option<String>;

    /// Returns `false` when the value could not be stored
    fn set_string(&mut self, key: &str, value: &str) -> bool;

    fn remove(&mut self, key: &str) -> bool;

    fn clear(&mut self) -> bool;

    fn contains(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }
}

/// Preference key overriding the configured building address
pub const PREF_SITE_ADDRESS: &str = "site.address";
/// Preference key overriding the configured city
pub const PREF_SITE_CITY: &str = "site.city";
