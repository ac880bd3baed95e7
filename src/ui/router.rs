//! Screen registry and per-tick dispatch

use super::screens::{self, ERROR_SCREEN, SPLASH_SCREEN};
use super::{Navigator, Screen, ScreenContext};
use crate::context::KioskContext;
use crate::error::InitError;
use crate::touch::{TouchEdgeDispatcher, TouchEvent};

/// Owns every registered screen and drives the active one
pub struct ScreenRouter {
    screens: Vec<Box<dyn Screen>>,
    nav: Navigator,
    dispatcher: TouchEdgeDispatcher,
    initialized: bool,
}

impl Default for ScreenRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRouter {
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            nav: Navigator::new(),
            dispatcher: TouchEdgeDispatcher::new(),
            initialized: false,
        }
    }

    /// Register the kiosk screens and queue the splash
    ///
    /// Requires the display and touch collaborators.
    pub fn initialize(&mut self, ctx: &KioskContext) -> Result<(), InitError> {
        if ctx.display.is_none() || ctx.touch.is_none() {
            return Err(InitError::UiPrerequisites);
        }
        if self.initialized {
            return Ok(());
        }
        for screen in screens::kiosk_screens(&ctx.config) {
            self.register(screen);
        }
        self.set_active(SPLASH_SCREEN);
        self.initialized = true;
        Ok(())
    }

    /// Bring up only the error screen after a fatal startup failure
    pub fn initialize_degraded(&mut self) {
        if self.initialized {
            self.set_active(ERROR_SCREEN);
            return;
        }
        log::warn!("Starting UI in degraded mode");
        self.register(Box::new(screens::ErrorScreen::new()));
        self.set_active(ERROR_SCREEN);
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Add a screen; duplicate names are allowed, lookup uses the first
    pub fn register(&mut self, screen: Box<dyn Screen>) {
        log::debug!("Registered screen '{}'", screen.name());
        self.nav.register(screen.name());
        self.screens.push(screen);
    }

    pub fn set_active(&mut self, name: &str) -> bool {
        self.nav.set_active(name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.nav.active_name()
    }

    pub fn pending_name(&self) -> Option<&str> {
        self.nav.pending_name()
    }

    pub fn screen(&self, name: &str) -> Option<&dyn Screen> {
        self.nav.index_of(name).map(|i| self.screens[i].as_ref())
    }

    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Transition, update, one touch edge, then redraw if dirty
    pub fn tick(&mut self, kiosk: &mut KioskContext) {
        if let Some(next) = self.nav.take_pending() {
            if let Some(prev) = self.nav.active_index() {
                let screen = &mut self.screens[prev];
                screen.on_exit(&mut ScreenContext {
                    kiosk: &mut *kiosk,
                    nav: &mut self.nav,
                });
                screen.state_mut().set_active(false);
            }

            self.nav.activate(next);
            let screen = &mut self.screens[next];
            log::info!("Active screen: {}", screen.name());
            screen.state_mut().set_active(true);
            screen.on_enter(&mut ScreenContext {
                kiosk: &mut *kiosk,
                nav: &mut self.nav,
            });
            screen.mark_dirty();
        }

        let Some(index) = self.nav.active_index() else {
            return;
        };
        let screen = &mut self.screens[index];

        screen.on_update(&mut ScreenContext {
            kiosk: &mut *kiosk,
            nav: &mut self.nav,
        });

        let now = kiosk.now_ms;
        let event = kiosk
            .touch
            .as_mut()
            .and_then(|touch| self.dispatcher.process(touch.sample(now)));
        if let Some(event) = event {
            let mut sc = ScreenContext {
                kiosk: &mut *kiosk,
                nav: &mut self.nav,
            };
            match event {
                TouchEvent::Down(p) => screen.on_touch_down(p, &mut sc),
                TouchEvent::Up(p) => screen.on_touch_up(p, &mut sc),
                TouchEvent::Move(p) => screen.on_touch_move(p, &mut sc),
            }
        }

        if screen.is_dirty() {
            if let Some(mut display) = kiosk.display.take() {
                screen.on_draw(display.as_mut(), kiosk);
                kiosk.display = Some(display);
                screen.state_mut().clear_dirty();
            }
        }
    }
}
