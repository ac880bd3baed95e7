//! Screen contract, routing and the kiosk screens
//!
//! ```text
//!   ScreenRouter ── owns ──▶ [Box<dyn Screen>]  (never removed)
//!        │
//!        │ tick: transition → on_update → one touch edge → on_draw (if dirty)
//!        ▼
//!   ScreenContext { kiosk, nav }  ◀── screens request transitions via nav
//! ```

mod router;
pub mod screens;
pub mod widgets;

pub use router::ScreenRouter;

use crate::context::KioskContext;
use crate::hal::DisplaySurface;
use crate::touch::TouchPoint;

/// Lifecycle flags every screen carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenState {
    active: bool,
    dirty: bool,
}

impl ScreenState {
    pub const fn new() -> Self {
        Self {
            active: false,
            dirty: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Active screen bookkeeping plus the one-slot pending transition
#[derive(Debug, Default)]
pub struct Navigator {
    names: Vec<String>,
    active: Option<usize>,
    pending: Option<usize>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// First registered screen with this name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Queue a transition to `name`
    ///
    /// A request for the already-active screen is ignored; otherwise it
    /// replaces any earlier request not yet consumed. Returns `false` for an
    /// unknown name.
    pub fn set_active(&mut self, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            log::warn!("No screen named '{}'", name);
            return false;
        };
        if self.active == Some(index) {
            return true;
        }
        if let Some(prev) = self.pending.replace(index) {
            if prev != index {
                log::debug!("Pending transition to '{}' replaced by '{}'", self.names[prev], name);
            }
        }
        true
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.names[i].as_str())
    }

    pub fn pending_name(&self) -> Option<&str> {
        self.pending.map(|i| self.names[i].as_str())
    }

    fn register(&mut self, name: &str) -> usize {
        self.names.push(name.to_string());
        self.names.len() - 1
    }

    fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn take_pending(&mut self) -> Option<usize> {
        self.pending.take()
    }

    fn activate(&mut self, index: usize) {
        self.active = Some(index);
    }
}

/// What a screen sees during a callback
pub struct ScreenContext<'a> {
    pub kiosk: &'a mut KioskContext,
    pub nav: &'a mut Navigator,
}

impl ScreenContext<'_> {
    pub fn now_ms(&self) -> u64 {
        self.kiosk.now_ms
    }

    /// Request a transition on the next router tick
    pub fn set_active(&mut self, name: &str) -> bool {
        self.nav.set_active(name)
    }

    pub fn display(&mut self) -> Option<&mut dyn DisplaySurface> {
        self.kiosk
            .display
            .as_mut()
            .map(|d| &mut **d as &mut dyn DisplaySurface)
    }
}

/// Lifecycle contract of a screen
///
/// The router calls `on_enter`/`on_exit` around transitions, `on_update`
/// every tick, at most one touch callback per tick, and `on_draw` only when
/// the dirty flag is set.
pub trait Screen {
    fn name(&self) -> &str;

    fn state(&self) -> &ScreenState;

    fn state_mut(&mut self) -> &mut ScreenState;

    fn on_enter(&mut self, _ctx: &mut ScreenContext<'_>) {}

    fn on_exit(&mut self, _ctx: &mut ScreenContext<'_>) {}

    fn on_update(&mut self, _ctx: &mut ScreenContext<'_>) {}

    /// Repaint the whole screen
    fn on_draw(&mut self, display: &mut dyn DisplaySurface, kiosk: &KioskContext);

    fn on_touch_down(&mut self, _point: TouchPoint, _ctx: &mut ScreenContext<'_>) {}

    fn on_touch_up(&mut self, _point: TouchPoint, _ctx: &mut ScreenContext<'_>) {}

    fn on_touch_move(&mut self, _point: TouchPoint, _ctx: &mut ScreenContext<'_>) {}

    fn mark_dirty(&mut self) {
        self.state_mut().mark_dirty();
    }

    fn is_dirty(&self) -> bool {
        self.state().is_dirty()
    }

    fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigator_pending_slot() {
        let mut nav = Navigator::new();
        nav.register("a");
        nav.register("b");
        nav.register("a");

        assert_eq!(nav.index_of("a"), Some(0));
        assert!(!nav.set_active("missing"));
        assert!(nav.pending_name().is_none());

        assert!(nav.set_active("a"));
        assert!(nav.set_active("b"));
        assert_eq!(nav.pending_name(), Some("b"));

        let next = nav.take_pending().unwrap();
        nav.activate(next);
        assert!(nav.set_active("b"));
        assert!(nav.pending_name().is_none());
        assert_eq!(nav.active_name(), Some("b"));
    }
}
