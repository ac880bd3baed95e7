//! Shared kiosk state
//!
//! One `KioskContext` exists per process. It is built from the configuration,
//! filled in by the initialization phases, and handed by reference to the
//! router and every screen.

use crate::backend::BackendSyncPolicy;
use crate::card::{CardFeed, CardIdentity, ResidentRegistry};
use crate::config::{KioskConfig, SiteConfig};
use crate::hal::{CardSource, DisplaySurface, NetworkTransport, PreferenceStore, TouchSource};
use crate::init::InitReport;

pub struct KioskContext {
    pub config: KioskConfig,
    /// Site info after preference overrides
    pub site: SiteConfig,
    /// Time of the current tick
    pub now_ms: u64,

    pub preferences: Option<Box<dyn PreferenceStore>>,
    pub display: Option<Box<dyn DisplaySurface>>,
    pub touch: Option<Box<dyn TouchSource>>,
    pub card: Option<Box<dyn CardSource>>,
    pub network: Option<Box<dyn NetworkTransport>>,

    pub residents: ResidentRegistry,
    pub backend: BackendSyncPolicy,
    pub card_feed: CardFeed,
    pub init: InitReport,

    restart_requested: bool,
}

impl KioskContext {
    pub fn new(config: KioskConfig) -> Self {
        Self {
            site: config.site.clone(),
            backend: BackendSyncPolicy::new(&config),
            config,
            now_ms: 0,
            preferences: None,
            display: None,
            touch: None,
            card: None,
            network: None,
            residents: ResidentRegistry::new(),
            card_feed: CardFeed::new(),
            init: InitReport::default(),
            restart_requested: false,
        }
    }

    /// Card currently in the reader field
    pub fn current_card(&self) -> Option<CardIdentity> {
        let card = self.card.as_ref()?;
        if card.is_present() {
            card.last_card()
        } else {
            None
        }
    }

    pub fn has_network(&self) -> bool {
        self.network.as_ref().map_or(false, |n| n.is_connected())
    }

    /// Backend policy together with the connected transport, if any
    pub fn backend_with_network(&mut self) -> (&mut BackendSyncPolicy, Option<&mut dyn NetworkTransport>) {
        let net = self
            .network
            .as_mut()
            .filter(|n| n.is_connected())
            .map(|n| &mut **n as &mut dyn NetworkTransport);
        (&mut self.backend, net)
    }

    /// Ask the host to restart the process (service mode "save")
    pub fn request_restart(&mut self) {
        log::warn!("Restart requested");
        self.restart_requested = true;
    }

    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }
}
