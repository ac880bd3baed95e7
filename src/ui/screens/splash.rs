//! Boot splash with startup progress and the service-card override

use super::{CONFIGURATION_SCREEN, ERROR_SCREEN, FLOW_SCREEN, SPLASH_SCREEN};
use crate::card::RESIDENT_UID_LEN;
use crate::config::KioskConfig;
use crate::context::KioskContext;
use crate::hal::{Color, DisplaySurface};
use crate::ui::{Screen, ScreenContext, ScreenState};

pub struct SplashScreen {
    state: ScreenState,
    min_display_ms: u64,
    admin_uid: Option<Vec<u8>>,
    entered_at_ms: u64,
    last_phase: Option<&'static str>,
    transitioned: bool,
}

impl SplashScreen {
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            state: ScreenState::new(),
            min_display_ms: config.timing.splash_min_display_ms,
            admin_uid: config.admin_uid(),
            entered_at_ms: 0,
            last_phase: None,
            transitioned: false,
        }
    }

    fn min_time_elapsed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.entered_at_ms) >= self.min_display_ms
    }

    /// Service card held on the reader while the splash is up
    fn admin_card_present(&self, kiosk: &KioskContext) -> bool {
        let (Some(admin), Some(card)) = (self.admin_uid.as_deref(), kiosk.current_card()) else {
            return false;
        };
        card.len() == RESIDENT_UID_LEN && card.uid() == admin
    }
}

impl Screen for SplashScreen {
    fn name(&self) -> &str {
        SPLASH_SCREEN
    }

    fn state(&self) -> &ScreenState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ScreenState {
        &mut self.state
    }

    fn on_enter(&mut self, ctx: &mut ScreenContext<'_>) {
        self.entered_at_ms = ctx.now_ms();
        self.last_phase = None;
        self.transitioned = false;
    }

    fn on_update(&mut self, ctx: &mut ScreenContext<'_>) {
        let phase = ctx.kiosk.init.phase_name();
        if self.last_phase != Some(phase) {
            self.last_phase = Some(phase);
            self.mark_dirty();
        }

        if self.transitioned {
            return;
        }

        let now = ctx.now_ms();
        if !self.min_time_elapsed(now) {
            if self.admin_card_present(ctx.kiosk) {
                log::info!("Service card detected, entering configuration mode");
                self.transitioned = ctx.set_active(CONFIGURATION_SCREEN);
            }
            return;
        }

        let target = if ctx.kiosk.init.is_failed() {
            ERROR_SCREEN
        } else if ctx.kiosk.init.complete {
            FLOW_SCREEN
        } else {
            return;
        };
        self.transitioned = ctx.set_active(target);
        self.mark_dirty();
    }

    fn on_draw(&mut self, display: &mut dyn DisplaySurface, kiosk: &KioskContext) {
        display.fill_screen(Color::WHITE);

        display.set_text_size(3);
        display.set_text_color(Color::BLACK);
        display.set_cursor(45, 90);
        display.print_text(&kiosk.config.app_name);

        display.set_text_size(1);
        display.set_cursor(45, 117);
        display.print_text(&format!("v{}", kiosk.config.app_version));

        if !self.transitioned {
            display.set_text_size(2);
            display.set_text_color(Color::DARK_CYAN);
            display.set_cursor(10, 180);
            display.print_text(&format!("Initializing: {}", self.last_phase.unwrap_or("...")));
        }
    }
}
