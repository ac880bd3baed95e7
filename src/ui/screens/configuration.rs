//! Service mode, entered with the admin card from the splash

use super::CONFIGURATION_SCREEN;
use crate::context::KioskContext;
use crate::hal::{Color, DisplaySurface};
use crate::touch::TouchPoint;
use crate::ui::widgets::{Button, ButtonResponse};
use crate::ui::{Screen, ScreenContext, ScreenState};

const MESSAGE: &str = "Otworz skrypt GenLink Kiosk Manager\n\
na komputerze i polacz\n\
sie z urzadzeniem wybierajac\n\
odpowiedni port urzadzenia.";

pub struct ConfigurationScreen {
    state: ScreenState,
    save_button: Button,
}

impl Default for ConfigurationScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationScreen {
    pub fn new() -> Self {
        Self {
            state: ScreenState::new(),
            save_button: Button::new(60, 180, 200, 50, "Zapisz"),
        }
    }
}

impl Screen for ConfigurationScreen {
    fn name(&self) -> &str {
        CONFIGURATION_SCREEN
    }

    fn state(&self) -> &ScreenState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ScreenState {
        &mut self.state
    }

    fn on_exit(&mut self, _ctx: &mut ScreenContext<'_>) {
        self.save_button.reset();
    }

    fn on_draw(&mut self, display: &mut dyn DisplaySurface, _kiosk: &KioskContext) {
        display.fill_screen(Color::BLACK);
        display.set_text_color(Color::YELLOW);
        display.set_text_size(3);
        display.set_cursor(35, 20);
        display.print_text("Tryb serwisowy");

        display.set_text_size(1);
        display.set_text_color(Color::WHITE);
        for (i, line) in MESSAGE.lines().enumerate() {
            display.set_cursor(40, 85 + 18 * i as i16);
            display.print_text(line);
        }

        self.save_button.draw(display);
    }

    fn on_touch_down(&mut self, point: TouchPoint, ctx: &mut ScreenContext<'_>) {
        if self.save_button.on_touch_down(point).needs_redraw() {
            if let Some(display) = ctx.display() {
                self.save_button.draw(display);
            }
        }
    }

    fn on_touch_up(&mut self, point: TouchPoint, ctx: &mut ScreenContext<'_>) {
        let response = self.save_button.on_touch_up(point);
        if response.needs_redraw() {
            if let Some(display) = ctx.display() {
                self.save_button.draw(display);
            }
        }
        if response == ButtonResponse::Clicked {
            ctx.kiosk.request_restart();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;
    use crate::ui::Navigator;

    #[test]
    fn test_save_requests_restart() {
        let mut kiosk = KioskContext::new(KioskConfig::default());
        let mut nav = Navigator::new();
        let mut screen = ConfigurationScreen::new();
        let mut ctx = ScreenContext {
            kiosk: &mut kiosk,
            nav: &mut nav,
        };

        screen.on_touch_down(TouchPoint::at(100, 200), &mut ctx);
        screen.on_touch_up(TouchPoint::at(5, 5), &mut ctx);
        assert!(!ctx.kiosk.restart_requested());

        screen.on_touch_down(TouchPoint::at(100, 200), &mut ctx);
        screen.on_touch_up(TouchPoint::at(110, 205), &mut ctx);
        assert!(ctx.kiosk.restart_requested());
    }
}
