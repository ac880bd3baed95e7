//! Phased, non-blocking startup
//!
//! One phase runs per tick, in a fixed order:
//!
//! ```text
//! NotStarted → Preferences → Display → Touch → Card → UI → Network → Completed
//!                  !            !        !              !
//!              (! = critical: failure freezes the sequence)
//! ```
//!
//! Card and Network failures are logged and skipped; the kiosk runs without
//! them. A critical failure is terminal until the process restarts.

mod platform;

pub use platform::{Opened, Platform, Readiness};

use std::fmt;

use crate::context::KioskContext;
use crate::error::{InitError, SubsystemError};
use crate::hal::{PREF_SITE_ADDRESS, PREF_SITE_CITY};
use crate::ui::ScreenRouter;

/// Startup phases in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitPhase {
    NotStarted,
    Preferences,
    Display,
    Touch,
    Card,
    Ui,
    Network,
    Completed,
}

impl InitPhase {
    pub const ALL: [InitPhase; 8] = [
        InitPhase::NotStarted,
        InitPhase::Preferences,
        InitPhase::Display,
        InitPhase::Touch,
        InitPhase::Card,
        InitPhase::Ui,
        InitPhase::Network,
        InitPhase::Completed,
    ];

    /// Phase that follows this one, `None` after `Completed`
    pub fn next(self) -> Option<InitPhase> {
        match self {
            InitPhase::NotStarted => Some(InitPhase::Preferences),
            InitPhase::Preferences => Some(InitPhase::Display),
            InitPhase::Display => Some(InitPhase::Touch),
            InitPhase::Touch => Some(InitPhase::Card),
            InitPhase::Card => Some(InitPhase::Ui),
            InitPhase::Ui => Some(InitPhase::Network),
            InitPhase::Network => Some(InitPhase::Completed),
            InitPhase::Completed => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InitPhase::NotStarted => "Not started",
            InitPhase::Preferences => "Preferences",
            InitPhase::Display => "Display",
            InitPhase::Touch => "Touch",
            InitPhase::Card => "NFC",
            InitPhase::Ui => "UI",
            InitPhase::Network => "Network",
            InitPhase::Completed => "Completed",
        }
    }

    /// Whether a failure in this phase halts startup
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            InitPhase::Preferences | InitPhase::Display | InitPhase::Touch | InitPhase::Ui
        )
    }
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the sequencer published into the context every tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitReport {
    pub phase: InitPhase,
    pub complete: bool,
    /// Human-readable reason of the fatal failure, if any
    pub failure: Option<String>,
}

impl InitReport {
    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl Default for InitReport {
    fn default() -> Self {
        Self {
            phase: InitPhase::NotStarted,
            complete: false,
            failure: None,
        }
    }
}

enum Step {
    Advance,
    Stay,
}

/// Runs the startup phases one tick at a time
pub struct InitializationSequencer {
    phase: InitPhase,
    failure: Option<InitError>,
    started_at_ms: Option<u64>,
}

impl Default for InitializationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl InitializationSequencer {
    pub const fn new() -> Self {
        Self {
            phase: InitPhase::NotStarted,
            failure: None,
            started_at_ms: None,
        }
    }

    pub fn current_phase(&self) -> InitPhase {
        self.phase
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == InitPhase::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&InitError> {
        self.failure.as_ref()
    }

    pub fn report(&self) -> InitReport {
        InitReport {
            phase: self.phase,
            complete: self.is_complete(),
            failure: self.failure.as_ref().map(|e| e.to_string()),
        }
    }

    /// Run one unit of work for the current phase
    ///
    /// Does nothing once completed or failed.
    pub fn tick(&mut self, ctx: &mut KioskContext, platform: &mut dyn Platform, router: &mut ScreenRouter) {
        if self.failure.is_none() && !self.is_complete() {
            let phase = self.phase;
            match self.run_phase(phase, ctx, platform, router) {
                Ok(Step::Advance) => self.advance(ctx.now_ms),
                Ok(Step::Stay) => {}
                Err(err) if phase.is_critical() => {
                    log::error!("{}", err);
                    self.failure = Some(err);
                }
                Err(err) => {
                    log::warn!("{} - continuing without it", err);
                    self.advance(ctx.now_ms);
                }
            }
        }
        ctx.init = self.report();
    }

    fn advance(&mut self, now_ms: u64) {
        if let Some(next) = self.phase.next() {
            self.phase = next;
            match next {
                InitPhase::Completed => {
                    let elapsed = now_ms.saturating_sub(self.started_at_ms.unwrap_or(now_ms));
                    log::info!("System initialization complete ({} ms)", elapsed);
                }
                _ => log::info!("Initializing {}...", next),
            }
        }
    }

    fn run_phase(
        &mut self,
        phase: InitPhase,
        ctx: &mut KioskContext,
        platform: &mut dyn Platform,
        router: &mut ScreenRouter,
    ) -> Result<Step, InitError> {
        let fail = |source: SubsystemError| InitError::Subsystem { phase, source };

        match phase {
            InitPhase::NotStarted => {
                log::info!("{} v{}", ctx.config.app_name, ctx.config.app_version);
                self.started_at_ms = Some(ctx.now_ms);
                Ok(Step::Advance)
            }
            InitPhase::Preferences => match platform.open_preferences().map_err(fail)? {
                Readiness::Ready(prefs) => {
                    if let Some(address) = prefs.get_string(PREF_SITE_ADDRESS) {
                        ctx.site.building_address = address;
                    }
                    if let Some(city) = prefs.get_string(PREF_SITE_CITY) {
                        ctx.site.city = city;
                    }
                    ctx.preferences = Some(prefs);

                    ctx.residents.clear_and_seed();
                    let added = ctx.residents.extend_from_entries(&ctx.config.residents);
                    log::info!(
                        "Resident registry ready ({} records, {} from config)",
                        ctx.residents.len(),
                        added
                    );
                    Ok(Step::Advance)
                }
                Readiness::NotReady => Ok(Step::Stay),
            },
            InitPhase::Display => match platform.open_display().map_err(fail)? {
                Readiness::Ready(mut display) => {
                    log::info!("Display ready ({}x{})", display.width(), display.height());
                    display.fill_screen(crate::hal::Color::BLACK);
                    ctx.display = Some(display);
                    Ok(Step::Advance)
                }
                Readiness::NotReady => Ok(Step::Stay),
            },
            InitPhase::Touch => match platform.open_touch().map_err(fail)? {
                Readiness::Ready(touch) => {
                    ctx.touch = Some(touch);
                    Ok(Step::Advance)
                }
                Readiness::NotReady => Ok(Step::Stay),
            },
            InitPhase::Card => match platform.open_card_reader().map_err(fail)? {
                Readiness::Ready(mut card) => {
                    if !card.initialize() {
                        return Err(fail(SubsystemError::InitFailed("PN532")));
                    }
                    match card.firmware_version() {
                        Some(version) => log::info!("Card reader ready (firmware {})", version),
                        None => log::info!("Card reader ready"),
                    }
                    ctx.card = Some(card);
                    Ok(Step::Advance)
                }
                Readiness::NotReady => Ok(Step::Stay),
            },
            InitPhase::Ui => {
                router.initialize(ctx)?;
                Ok(Step::Advance)
            }
            InitPhase::Network => match platform.open_network().map_err(fail)? {
                Readiness::Ready(net) => {
                    let now = ctx.now_ms;
                    ctx.network = Some(net);
                    let (backend, net) = ctx.backend_with_network();
                    match net {
                        Some(net) => backend.on_network_ready(net, now),
                        None => log::warn!("Network up but not connected; report types deferred"),
                    }
                    Ok(Step::Advance)
                }
                Readiness::NotReady => Ok(Step::Stay),
            },
            InitPhase::Completed => Ok(Step::Stay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;
    use crate::sim::{FailPoint, SimPlatform};

    fn run(platform: &mut SimPlatform, ticks: usize) -> (InitializationSequencer, KioskContext, Vec<InitPhase>) {
        let mut seq = InitializationSequencer::new();
        let mut ctx = KioskContext::new(KioskConfig::default());
        let mut router = ScreenRouter::new();
        let mut seen = vec![seq.current_phase()];
        for i in 0..ticks {
            ctx.now_ms = i as u64 * 10;
            seq.tick(&mut ctx, platform, &mut router);
            seen.push(seq.current_phase());
        }
        (seq, ctx, seen)
    }

    #[test]
    fn test_phase_order() {
        let mut phases = vec![InitPhase::NotStarted];
        while let Some(next) = phases.last().and_then(|p| p.next()) {
            phases.push(next);
        }
        assert_eq!(phases, InitPhase::ALL.to_vec());
        assert_eq!(InitPhase::Ui.to_string(), "UI");
    }

    #[test]
    fn test_happy_path_one_phase_per_tick() {
        let mut platform = SimPlatform::new();
        let (seq, ctx, seen) = run(&mut platform, 7);

        assert!(seq.is_complete());
        assert_eq!(seen, InitPhase::ALL.to_vec());
        assert!(ctx.init.complete);
        assert!(ctx.display.is_some() && ctx.touch.is_some());
        assert!(ctx.card.is_some() && ctx.network.is_some());
        assert_eq!(ctx.residents.len(), 2);
    }

    #[test]
    fn test_phases_never_regress() {
        for fail in [FailPoint::Display, FailPoint::Card, FailPoint::Network, FailPoint::Touch] {
            let mut platform = SimPlatform::new().failing(fail);
            let (_, _, seen) = run(&mut platform, 20);
            assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", fail);
        }
    }

    #[test]
    fn test_critical_failure_freezes() {
        let mut platform = SimPlatform::new().failing(FailPoint::Touch);
        let (seq, ctx, _) = run(&mut platform, 20);

        assert!(seq.is_failed());
        assert_eq!(seq.current_phase(), InitPhase::Touch);
        assert_eq!(seq.failure().map(|e| e.phase()), Some(InitPhase::Touch));
        assert!(ctx.init.failure.as_deref().unwrap().starts_with("Touch initialization failed"));
        assert!(!ctx.init.complete);
    }

    #[test]
    fn test_optional_failures_degrade() {
        let mut platform = SimPlatform::new().failing(FailPoint::Card).failing(FailPoint::Network);
        let (seq, ctx, _) = run(&mut platform, 10);

        assert!(seq.is_complete());
        assert!(!seq.is_failed());
        assert!(ctx.card.is_none());
        assert!(ctx.network.is_none());
    }

    #[test]
    fn test_not_ready_repeats_phase() {
        let mut platform = SimPlatform::new().network_ready_after(3);
        let (seq, _, seen) = run(&mut platform, 7);

        assert_eq!(seq.current_phase(), InitPhase::Network);
        assert_eq!(seen.iter().filter(|p| **p == InitPhase::Network).count(), 2);

        let (seq, _, _) = run(&mut SimPlatform::new().network_ready_after(3), 10);
        assert!(seq.is_complete());
    }

    #[test]
    fn test_preferences_override_site() {
        let mut platform = SimPlatform::new().with_preference(PREF_SITE_CITY, "Gdansk");
        let (_, ctx, _) = run(&mut platform, 3);
        assert_eq!(ctx.site.city, "Gdansk");
        assert_eq!(ctx.site.building_address, KioskConfig::default().site.building_address);
    }
}
