//! Terminal screen shown after a fatal startup failure

use super::ERROR_SCREEN;
use crate::context::KioskContext;
use crate::hal::{draw_centered_text, Color, DisplaySurface};
use crate::ui::widgets::wrap_text;
use crate::ui::{Screen, ScreenState};

const TITLE: &str = "Initialization Error";
const LINE_CHARS: usize = 25;

#[derive(Default)]
pub struct ErrorScreen {
    state: ScreenState,
}

impl ErrorScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Screen for ErrorScreen {
    fn name(&self) -> &str {
        ERROR_SCREEN
    }

    fn state(&self) -> &ScreenState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ScreenState {
        &mut self.state
    }

    fn on_draw(&mut self, display: &mut dyn DisplaySurface, kiosk: &KioskContext) {
        display.fill_screen(Color::RED);
        draw_centered_text(display, TITLE, 20, 2, Color::WHITE);

        let reason = kiosk.init.failure.as_deref().unwrap_or("Unknown error");
        let mut y = 70;
        for line in wrap_text(reason, LINE_CHARS) {
            draw_centered_text(display, &line, y, 2, Color::WHITE);
            y += 22;
        }
        draw_centered_text(display, "Uruchom ponownie urzadzenie", 210, 1, Color::YELLOW);
    }
}
