//! Tap-to-select option list with partial row redraw

use super::Rect;
use crate::hal::{Color, DisplaySurface};
use crate::touch::TouchPoint;

/// Menu styling options
#[derive(Clone, Copy, Debug)]
pub struct MenuStyle {
    /// Frame background color
    pub bg_color: Color,
    /// Frame outline color
    pub frame_color: Color,
    pub text_color: Color,
    /// Background of the selected row
    pub highlight_bg: Color,
    pub text_size: u8,
    /// Row pitch in pixels
    pub item_height: u16,
    pub padding_left: u16,
    pub padding_top: u16,
    pub padding_bottom: u16,
    pub corner_radius: u16,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self::kiosk()
    }
}

impl MenuStyle {
    pub const fn kiosk() -> Self {
        Self {
            bg_color: Color::DARK_GREY,
            frame_color: Color::WHITE,
            text_color: Color::WHITE,
            highlight_bg: Color::BLUE,
            text_size: 2,
            item_height: 26,
            padding_left: 12,
            padding_top: 12,
            padding_bottom: 4,
            corner_radius: 6,
        }
    }

    /// Height of the filled row band
    pub const fn row_height(&self) -> u16 {
        self.item_height - 4
    }
}

/// Vertical list of labels; one may be selected
///
/// Selecting a row only repaints the old and new rows; the frame and the
/// full list are repainted after [`SelectionMenu::set_items`] or
/// [`SelectionMenu::force_redraw`].
#[derive(Clone, Debug)]
pub struct SelectionMenu {
    bounds: Rect,
    style: MenuStyle,
    items: Vec<String>,
    selected: Option<usize>,
    frame_dirty: bool,
    options_dirty: bool,
    dirty_rows: Vec<usize>,
}

impl SelectionMenu {
    pub fn new(x: i16, y: i16, w: u16, h: u16) -> Self {
        Self {
            bounds: Rect::new(x, y, w, h),
            style: MenuStyle::kiosk(),
            items: Vec::new(),
            selected: None,
            frame_dirty: true,
            options_dirty: true,
            dirty_rows: Vec::new(),
        }
    }

    /// Replace the options; clears the selection
    pub fn set_items<S: AsRef<str>>(&mut self, items: &[S]) {
        self.items = items.iter().map(|s| s.as_ref().to_string()).collect();
        self.selected = None;
        self.force_redraw();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected.and_then(|i| self.items.get(i)).map(String::as_str)
    }

    pub fn has_selection(&self) -> bool {
        self.selected_label().is_some()
    }

    /// Select row `index`; `false` if out of bounds
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if self.selected != Some(index) {
            if let Some(prev) = self.selected.replace(index) {
                self.mark_row_dirty(prev);
            }
            self.mark_row_dirty(index);
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.options_dirty = true;
        self.dirty_rows.clear();
    }

    pub fn force_redraw(&mut self) {
        self.frame_dirty = true;
        self.options_dirty = true;
        self.dirty_rows.clear();
    }

    pub fn needs_redraw(&self) -> bool {
        self.frame_dirty || self.options_dirty || !self.dirty_rows.is_empty()
    }

    /// Row under `point`, if it is a visible row
    pub fn row_at(&self, point: TouchPoint) -> Option<usize> {
        if !self.bounds.contains(point.x, point.y) {
            return None;
        }
        let offset = point.y as i32 - self.first_row_y();
        if offset < 0 {
            return None;
        }
        let index = (offset / self.style.item_height as i32) as usize;
        (index < self.items.len() && self.is_row_visible(index)).then_some(index)
    }

    /// Select the tapped row; returns the row hit, if any
    pub fn on_touch_down(&mut self, point: TouchPoint) -> Option<usize> {
        let index = self.row_at(point)?;
        self.select(index);
        Some(index)
    }

    /// Paint whatever is outstanding
    pub fn draw(&mut self, display: &mut dyn DisplaySurface) {
        let Rect { x, y, w, h } = self.bounds;
        let s = self.style;

        if self.frame_dirty {
            display.fill_round_rect(x, y, w, h, s.corner_radius, s.bg_color);
            display.draw_round_rect(x, y, w, h, s.corner_radius, s.frame_color);
            self.frame_dirty = false;
            self.options_dirty = true;
        }

        if self.options_dirty {
            display.fill_round_rect(
                x + 2,
                y + 2,
                w.saturating_sub(4),
                h.saturating_sub(4),
                s.corner_radius.saturating_sub(2),
                s.bg_color,
            );
            for i in (0..self.items.len()).take_while(|i| self.is_row_visible(*i)) {
                self.draw_row(display, i);
            }
            self.options_dirty = false;
            self.dirty_rows.clear();
            return;
        }

        for i in std::mem::take(&mut self.dirty_rows) {
            self.draw_row(display, i);
        }
    }

    fn draw_row(&self, display: &mut dyn DisplaySurface, index: usize) {
        let Some(label) = self.items.get(index) else {
            return;
        };
        if !self.is_row_visible(index) {
            return;
        }
        let s = &self.style;
        let row_y = self.row_y(index) as i16;
        let bg = if self.selected == Some(index) { s.highlight_bg } else { s.bg_color };

        display.fill_round_rect(
            self.bounds.x + 4,
            row_y - 4,
            self.bounds.w.saturating_sub(8),
            s.row_height(),
            4,
            bg,
        );
        display.set_cursor(self.bounds.x + s.padding_left as i16, row_y);
        display.set_text_color(s.text_color);
        display.set_text_size(s.text_size);
        display.print_text(label);
    }

    fn first_row_y(&self) -> i32 {
        self.bounds.y as i32 + self.style.padding_top as i32
    }

    fn row_y(&self, index: usize) -> i32 {
        self.first_row_y() + index as i32 * self.style.item_height as i32
    }

    fn is_row_visible(&self, index: usize) -> bool {
        let bottom = self.bounds.y as i32 + self.bounds.h as i32 - self.style.padding_bottom as i32;
        index < self.items.len() && self.row_y(index) + self.style.row_height() as i32 <= bottom
    }

    fn mark_row_dirty(&mut self, index: usize) {
        if index < self.items.len() && !self.dirty_rows.contains(&index) {
            self.dirty_rows.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DEFAULT_REPORT_TYPES;
    use crate::sim::TerminalDisplay;

    fn menu() -> SelectionMenu {
        let mut m = SelectionMenu::new(20, 30, 280, 170);
        m.set_items(DEFAULT_REPORT_TYPES);
        m
    }

    #[test]
    fn test_starts_without_selection() {
        let m = menu();
        assert_eq!(m.item_count(), 5);
        assert!(!m.has_selection());
        assert_eq!(m.selected_label(), None);
    }

    #[test]
    fn test_row_hit_testing() {
        let mut m = menu();
        // rows start at y = 42 with a 26px pitch
        assert_eq!(m.row_at(TouchPoint::at(100, 41)), None);
        assert_eq!(m.row_at(TouchPoint::at(100, 42)), Some(0));
        assert_eq!(m.row_at(TouchPoint::at(100, 42 + 2 * 26 + 5)), Some(2));
        assert_eq!(m.row_at(TouchPoint::at(10, 100)), None);
        assert_eq!(m.row_at(TouchPoint::at(100, 42 + 5 * 26)), None);

        assert_eq!(m.on_touch_down(TouchPoint::at(100, 100)), Some(2));
        assert_eq!(m.selected_label(), Some("E-recepta"));
        assert!(!m.select(5));
    }

    #[test]
    fn test_selection_change_repaints_two_rows() {
        let mut m = menu();
        let mut display = TerminalDisplay::new();
        m.draw(&mut display);
        assert!(!m.needs_redraw());

        m.select(1);
        m.select(3);
        assert!(m.needs_redraw());
        display.clear_log();
        m.draw(&mut display);
        assert_eq!(display.texts(), vec!["Bank", "Aplikacje"]);
        assert!(!m.needs_redraw());
    }

    #[test]
    fn test_rows_clipped_to_frame() {
        let mut m = SelectionMenu::new(0, 0, 100, 60);
        m.set_items(&["a", "b", "c"]);
        // 12 + 26 + 22 = 60 > 56, only row 0 fits
        assert_eq!(m.row_at(TouchPoint::at(10, 40)), None);
        assert_eq!(m.row_at(TouchPoint::at(10, 20)), Some(0));
    }
}
