//! Push button

use super::Rect;
use crate::hal::{Color, DisplaySurface};
use crate::touch::TouchPoint;

const CORNER_RADIUS: u16 = 6;
const LABEL_SIZE: u8 = 2;

/// What a touch did to a button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonResponse {
    /// Touch was not for this button
    Ignored,
    /// Pressed (touch down inside)
    Pressed,
    /// Released outside its bounds
    Released,
    /// Released inside after being pressed
    Clicked,
}

impl ButtonResponse {
    /// Whether the button's look changed
    pub fn needs_redraw(self) -> bool {
        self != ButtonResponse::Ignored
    }
}

/// Labelled button that clicks on release
#[derive(Clone, Debug)]
pub struct Button {
    bounds: Rect,
    label: String,
    pressed: bool,
    pub text_color: Color,
    pub bg_color: Color,
}

impl Button {
    pub fn new(x: i16, y: i16, w: u16, h: u16, label: &str) -> Self {
        Self {
            bounds: Rect::new(x, y, w, h),
            label: label.to_string(),
            pressed: false,
            text_color: Color::WHITE,
            bg_color: Color::BLUE,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn contains(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.x, point.y)
    }

    pub fn on_touch_down(&mut self, point: TouchPoint) -> ButtonResponse {
        if !self.contains(point) {
            return ButtonResponse::Ignored;
        }
        self.pressed = true;
        ButtonResponse::Pressed
    }

    pub fn on_touch_up(&mut self, point: TouchPoint) -> ButtonResponse {
        if !self.pressed {
            return ButtonResponse::Ignored;
        }
        self.pressed = false;
        if self.contains(point) {
            ButtonResponse::Clicked
        } else {
            ButtonResponse::Released
        }
    }

    /// Drop a press without clicking (screen left mid-touch)
    pub fn reset(&mut self) {
        self.pressed = false;
    }

    pub fn draw(&self, display: &mut dyn DisplaySurface) {
        let Rect { x, y, w, h } = self.bounds;
        let bg = if self.pressed { Color::BUTTON_PRESSED } else { self.bg_color };

        display.fill_round_rect(x, y, w, h, CORNER_RADIUS, bg);
        display.draw_round_rect(x, y, w, h, CORNER_RADIUS, Color::BUTTON_OUTLINE);

        let (tw, th) = display.text_bounds(&self.label, LABEL_SIZE);
        let tx = x as i32 + (w as i32 - tw as i32) / 2;
        let ty = y as i32 + (h as i32 - th as i32) / 2;
        display.set_text_size(LABEL_SIZE);
        display.set_text_color(self.text_color);
        display.set_cursor(tx as i16, ty as i16);
        display.print_text(&self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_needs_press_and_release_inside() {
        let mut b = Button::new(70, 170, 180, 60, "Rozpocznij");

        assert_eq!(b.on_touch_up(TouchPoint::at(100, 200)), ButtonResponse::Ignored);
        assert_eq!(b.on_touch_down(TouchPoint::at(10, 10)), ButtonResponse::Ignored);

        assert_eq!(b.on_touch_down(TouchPoint::at(100, 200)), ButtonResponse::Pressed);
        assert!(b.is_pressed());
        assert_eq!(b.on_touch_up(TouchPoint::at(110, 210)), ButtonResponse::Clicked);
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_release_outside_cancels() {
        let mut b = Button::new(20, 170, 120, 45, "Anuluj");
        b.on_touch_down(TouchPoint::at(30, 180));
        assert_eq!(b.on_touch_up(TouchPoint::at(300, 10)), ButtonResponse::Released);
        assert!(ButtonResponse::Released.needs_redraw());
        assert!(!ButtonResponse::Ignored.needs_redraw());
    }
}
