//! Platform handing out the in-memory collaborators

use serde::{Deserialize, Serialize};

use super::{
    CannedTransport, DisplayLog, MemoryPreferences, RequestLog, ScriptedCardReader, ScriptedTouch,
    TerminalDisplay,
};
use crate::error::SubsystemError;
use crate::hal::{CardSource, DisplaySurface, NetworkTransport, PreferenceStore, TouchSource};
use crate::init::{Opened, Platform, Readiness};

/// Collaborator the simulator should fail to construct
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailPoint {
    Preferences,
    Display,
    Touch,
    Card,
    Network,
}

impl FailPoint {
    /// Part name used in the failure message
    pub fn part(self) -> &'static str {
        match self {
            FailPoint::Preferences => "NVS",
            FailPoint::Display => "ILI9341",
            FailPoint::Touch => "XPT2046",
            FailPoint::Card => "PN532",
            FailPoint::Network => "WiFi",
        }
    }
}

/// Hands each collaborator out once
pub struct SimPlatform {
    failures: Vec<FailPoint>,
    network_not_ready: u32,
    preferences: Option<MemoryPreferences>,
    display: Option<TerminalDisplay>,
    touch: Option<ScriptedTouch>,
    card: Option<ScriptedCardReader>,
    network: Option<CannedTransport>,
    display_log: DisplayLog,
    request_log: RequestLog,
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPlatform {
    pub fn new() -> Self {
        let display = TerminalDisplay::new();
        let network = CannedTransport::new();
        Self {
            failures: Vec::new(),
            network_not_ready: 0,
            preferences: Some(MemoryPreferences::new()),
            display_log: display.log(),
            request_log: network.request_log(),
            display: Some(display),
            touch: Some(ScriptedTouch::new()),
            card: Some(ScriptedCardReader::new()),
            network: Some(network),
        }
    }

    pub fn failing(mut self, point: FailPoint) -> Self {
        self.failures.push(point);
        self
    }

    /// Answer "not ready" to the first `ticks` network requests
    pub fn network_ready_after(mut self, ticks: u32) -> Self {
        self.network_not_ready = ticks;
        self
    }

    pub fn with_preference(mut self, key: &str, value: &str) -> Self {
        let prefs = self.preferences.take().unwrap_or_default();
        self.preferences = Some(prefs.with(key, value));
        self
    }

    pub fn with_display(mut self, display: TerminalDisplay) -> Self {
        self.display_log = display.log();
        self.display = Some(display);
        self
    }

    pub fn with_touch(mut self, touch: ScriptedTouch) -> Self {
        self.touch = Some(touch);
        self
    }

    pub fn with_card_reader(mut self, reader: ScriptedCardReader) -> Self {
        self.card = Some(reader);
        self
    }

    pub fn with_network(mut self, network: CannedTransport) -> Self {
        self.request_log = network.request_log();
        self.network = Some(network);
        self
    }

    pub fn display_log(&self) -> DisplayLog {
        self.display_log.clone()
    }

    pub fn request_log(&self) -> RequestLog {
        self.request_log.clone()
    }

    fn open<T: ?Sized>(&self, point: FailPoint, slot: Option<Box<T>>) -> Opened<T> {
        if self.failures.contains(&point) {
            return Err(SubsystemError::NotDetected(point.part()));
        }
        slot.map(Readiness::Ready)
            .ok_or_else(|| SubsystemError::Other(format!("{} already handed out", point.part())))
    }
}

impl Platform for SimPlatform {
    fn open_preferences(&mut self) -> Opened<dyn PreferenceStore> {
        let slot = self.preferences.take().map(|p| Box::new(p) as Box<dyn PreferenceStore>);
        self.open(FailPoint::Preferences, slot)
    }

    fn open_display(&mut self) -> Opened<dyn DisplaySurface> {
        let slot = self.display.take().map(|d| Box::new(d) as Box<dyn DisplaySurface>);
        self.open(FailPoint::Display, slot)
    }

    fn open_touch(&mut self) -> Opened<dyn TouchSource> {
        let slot = self.touch.take().map(|t| Box::new(t) as Box<dyn TouchSource>);
        self.open(FailPoint::Touch, slot)
    }

    fn open_card_reader(&mut self) -> Opened<dyn CardSource> {
        let slot = self.card.take().map(|c| Box::new(c) as Box<dyn CardSource>);
        self.open(FailPoint::Card, slot)
    }

    fn open_network(&mut self) -> Opened<dyn NetworkTransport> {
        if self.network_not_ready > 0 && !self.failures.contains(&FailPoint::Network) {
            self.network_not_ready -= 1;
            log::debug!("WiFi still connecting");
            return Ok(Readiness::NotReady);
        }
        let slot = self.network.take().map(|n| Box::new(n) as Box<dyn NetworkTransport>);
        self.open(FailPoint::Network, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborators_handed_out_once() {
        let mut platform = SimPlatform::new();
        assert!(matches!(platform.open_display(), Ok(Readiness::Ready(_))));
        assert!(matches!(platform.open_display(), Err(SubsystemError::Other(_))));
    }

    #[test]
    fn test_fail_points() {
        let mut platform = SimPlatform::new().failing(FailPoint::Card);
        match platform.open_card_reader() {
            Err(e) => assert_eq!(e.to_string(), "PN532 not detected"),
            Ok(_) => panic!("card reader should fail"),
        }
        assert!(platform.open_touch().is_ok());
    }

    #[test]
    fn test_fail_point_names_in_toml() {
        #[derive(Deserialize)]
        struct Doc {
            fail: Vec<FailPoint>,
        }
        let doc: Doc = toml::from_str(r#"fail = ["card", "network"]"#).unwrap();
        assert_eq!(doc.fail, vec![FailPoint::Card, FailPoint::Network]);
    }
}
