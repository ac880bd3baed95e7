//! Touch widgets drawn by the kiosk screens

mod button;
mod selection_menu;

pub use button::{Button, ButtonResponse};
pub use selection_menu::{MenuStyle, SelectionMenu};

/// Axis-aligned widget bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive of the top-left edge, exclusive of the bottom-right
    pub fn contains(&self, x: i16, y: i16) -> bool {
        let (x, y) = (x as i32, y as i32);
        let (left, top) = (self.x as i32, self.y as i32);
        x >= left && x < left + self.w as i32 && y >= top && y < top + self.h as i32
    }
}

/// Split `text` into lines of at most `max_chars`, breaking on spaces
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(70, 170, 180, 60);
        assert!(r.contains(70, 170));
        assert!(r.contains(249, 229));
        assert!(!r.contains(250, 200));
        assert!(!r.contains(100, 230));
        assert!(!r.contains(69, 200));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("Display initialization failed: ILI9341 not detected", 20),
            vec!["Display", "initialization", "failed: ILI9341 not", "detected"]
        );
        assert_eq!(wrap_text("a\nb c", 10), vec!["a", "b c"]);
    }
}
