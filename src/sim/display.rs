//! Display that records draw calls and optionally echoes text to the terminal

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use colored::Colorize;

use crate::hal::{Color, DisplaySurface};

/// One recorded drawing call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOp {
    FillScreen(Color),
    FillRect { x: i16, y: i16, w: u16, h: u16, color: Color },
    DrawRect { x: i16, y: i16, w: u16, h: u16, color: Color },
    Text { x: i16, y: i16, size: u8, color: Color, text: String },
}

/// Shared view of everything a [`TerminalDisplay`] drew
#[derive(Clone, Debug, Default)]
pub struct DisplayLog(Rc<RefCell<Vec<DrawOp>>>);

impl DisplayLog {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.0.borrow().clone()
    }

    /// Printed strings, in order
    pub fn texts(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Number of full-screen clears, i.e. full repaints
    pub fn frame_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|op| matches!(op, DrawOp::FillScreen(_)))
            .count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, op: DrawOp) {
        self.0.borrow_mut().push(op);
    }
}

/// 320x240 recording surface
pub struct TerminalDisplay {
    width: u16,
    height: u16,
    cursor: (i16, i16),
    text_size: u8,
    text_color: Color,
    log: DisplayLog,
    echo: bool,
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::with_size(320, 240)
    }

    pub fn with_size(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cursor: (0, 0),
            text_size: 1,
            text_color: Color::WHITE,
            log: DisplayLog::default(),
            echo: false,
        }
    }

    /// Print frames and text to stdout as they are drawn
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn log(&self) -> DisplayLog {
        self.log.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.log.texts()
    }

    pub fn clear_log(&self) {
        self.log.clear();
    }
}

impl DisplaySurface for TerminalDisplay {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn fill_screen(&mut self, color: Color) {
        if self.echo {
            println!(
                "{} {}",
                Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                "─".repeat(40).truecolor(color.r, color.g, color.b)
            );
        }
        self.log.push(DrawOp::FillScreen(color));
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: u16, h: u16, color: Color) {
        self.log.push(DrawOp::FillRect { x, y, w, h, color });
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: u16, h: u16, color: Color) {
        self.log.push(DrawOp::DrawRect { x, y, w, h, color });
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor = (x, y);
    }

    fn set_text_size(&mut self, size: u8) {
        self.text_size = size.max(1);
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn print_text(&mut self, text: &str) {
        let (x, y) = self.cursor;
        if self.echo {
            let line = format!("  [{:>3},{:>3}] {}", x, y, text);
            if self.text_size >= 3 {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
        self.log.push(DrawOp::Text {
            x,
            y,
            size: self.text_size,
            color: self.text_color,
            text: text.to_string(),
        });
        let (w, _) = self.text_bounds(text, self.text_size);
        self.cursor.0 = x.saturating_add(w as i16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::draw_centered_text;

    #[test]
    fn test_records_text_and_frames() {
        let mut display = TerminalDisplay::new();
        let log = display.log();

        display.fill_screen(Color::NAVY);
        draw_centered_text(&mut display, "Dalej", 100, 2, Color::WHITE);

        assert_eq!(log.frame_count(), 1);
        assert_eq!(
            log.ops()[1],
            DrawOp::Text {
                x: 130,
                y: 100,
                size: 2,
                color: Color::WHITE,
                text: "Dalej".to_string()
            }
        );
        assert!(log.contains_text("Dal"));

        log.clear();
        assert!(display.texts().is_empty());
    }
}
