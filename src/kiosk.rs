//! The kiosk main loop
//!
//! One [`Kiosk::tick`] is one pass of the firmware loop: advance startup,
//! poll the card reader and network, then let the router drive the active
//! screen. Time is supplied by the caller so the simulator can run on
//! virtual milliseconds.

use crate::config::KioskConfig;
use crate::context::KioskContext;
use crate::init::{InitializationSequencer, Platform};
use crate::ui::ScreenRouter;

pub struct Kiosk {
    ctx: KioskContext,
    router: ScreenRouter,
    sequencer: InitializationSequencer,
    platform: Box<dyn Platform>,
}

impl Kiosk {
    pub fn new(config: KioskConfig, platform: Box<dyn Platform>) -> Self {
        Self {
            ctx: KioskContext::new(config),
            router: ScreenRouter::new(),
            sequencer: InitializationSequencer::new(),
            platform,
        }
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.ctx.now_ms = now_ms;

        self.sequencer
            .tick(&mut self.ctx, self.platform.as_mut(), &mut self.router);
        if self.sequencer.is_failed() && !self.router.is_initialized() && self.ctx.display.is_some() {
            self.router.initialize_degraded();
        }

        if let Some(card) = self.ctx.card.as_mut() {
            card.update(now_ms);
        }
        let current = self.ctx.current_card();
        self.ctx.card_feed.publish(current);

        if let Some(net) = self.ctx.network.as_mut() {
            net.update(now_ms);
        }
        let (backend, net) = self.ctx.backend_with_network();
        backend.poll(net, now_ms);

        if self.router.is_initialized() {
            self.router.tick(&mut self.ctx);
        }
    }

    pub fn context(&self) -> &KioskContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut KioskContext {
        &mut self.ctx
    }

    pub fn router(&self) -> &ScreenRouter {
        &self.router
    }

    pub fn sequencer(&self) -> &InitializationSequencer {
        &self.sequencer
    }

    pub fn active_screen(&self) -> Option<&str> {
        self.router.active_name()
    }

    /// Set by the configuration screen's save button
    pub fn restart_requested(&self) -> bool {
        self.ctx.restart_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::InitPhase;
    use crate::sim::{FailPoint, ScriptedCardReader, ScriptedTouch, SimPlatform};
    use crate::ui::screens::{CONFIGURATION_SCREEN, ERROR_SCREEN, FLOW_SCREEN, SPLASH_SCREEN};

    fn run(kiosk: &mut Kiosk, from: u64, to: u64) {
        let mut now = from;
        while now <= to {
            kiosk.tick(now);
            now += 10;
        }
    }

    #[test]
    fn test_boot_to_flow_after_splash() {
        let platform = SimPlatform::new();
        let display = platform.display_log();
        let mut kiosk = Kiosk::new(KioskConfig::default(), Box::new(platform));

        run(&mut kiosk, 0, 1000);
        assert_eq!(kiosk.sequencer().current_phase(), InitPhase::Completed);
        assert_eq!(kiosk.active_screen(), Some(SPLASH_SCREEN));
        assert!(display.contains_text("Initializing: Completed"));

        run(&mut kiosk, 1010, 6000);
        assert_eq!(kiosk.active_screen(), Some(FLOW_SCREEN));
        assert!(!kiosk.restart_requested());
    }

    #[test]
    fn test_display_failure_leaves_router_down() {
        let platform = SimPlatform::new().failing(FailPoint::Display);
        let mut kiosk = Kiosk::new(KioskConfig::default(), Box::new(platform));

        run(&mut kiosk, 0, 500);
        assert!(kiosk.sequencer().is_failed());
        assert_eq!(kiosk.sequencer().current_phase(), InitPhase::Display);
        assert!(!kiosk.router().is_initialized());
        assert_eq!(
            kiosk.context().init.failure.as_deref(),
            Some("Display initialization failed: ILI9341 not detected")
        );
    }

    #[test]
    fn test_touch_failure_shows_error_screen() {
        let platform = SimPlatform::new().failing(FailPoint::Touch);
        let display = platform.display_log();
        let mut kiosk = Kiosk::new(KioskConfig::default(), Box::new(platform));

        run(&mut kiosk, 0, 200);
        assert_eq!(kiosk.active_screen(), Some(ERROR_SCREEN));
        assert!(display.contains_text("Initialization Error"));
    }

    #[test]
    fn test_card_reader_is_optional() {
        let platform = SimPlatform::new().with_card_reader(ScriptedCardReader::new().failing_init());
        let mut kiosk = Kiosk::new(KioskConfig::default(), Box::new(platform));

        run(&mut kiosk, 0, 6000);
        assert!(kiosk.sequencer().is_complete());
        assert!(kiosk.context().card.is_none());
        assert_eq!(kiosk.active_screen(), Some(FLOW_SCREEN));
    }

    #[test]
    fn test_admin_card_opens_configuration_and_save_requests_restart() {
        let mut reader = ScriptedCardReader::new();
        reader.tap(1000, 1500, &[0xC0, 0xF4, 0xE4, 0x5F]);
        let mut touch = ScriptedTouch::new();
        touch.tap(3000, 160, 205);
        let platform = SimPlatform::new().with_card_reader(reader).with_touch(touch);
        let mut kiosk = Kiosk::new(KioskConfig::default(), Box::new(platform));

        run(&mut kiosk, 0, 2000);
        assert_eq!(kiosk.active_screen(), Some(CONFIGURATION_SCREEN));

        run(&mut kiosk, 2010, 3500);
        assert!(kiosk.restart_requested());
        assert_eq!(kiosk.active_screen(), Some(CONFIGURATION_SCREEN));
    }
}
