//! Display surface contract
//!
//! The core never touches pixels itself. Screens and widgets draw through
//! this trait, which a board crate implements on top of its panel driver
//! (ILI9341 over SPI on the kiosk) and the simulator implements on a
//! terminal.

/// Unified color type that can convert between RGB565 and ARGB
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to RGB565 (16-bit, for SPI panels)
    #[inline]
    pub const fn to_rgb565(&self) -> u16 {
        let r5 = (self.r >> 3) as u16;
        let g6 = (self.g >> 2) as u16;
        let b5 = (self.b >> 3) as u16;
        (r5 << 11) | (g6 << 5) | b5
    }

    /// Create from RGB565
    pub const fn from_rgb565(rgb565: u16) -> Self {
        let r = ((rgb565 >> 11) & 0x1F) as u8;
        let g = ((rgb565 >> 5) & 0x3F) as u8;
        let b = (rgb565 & 0x1F) as u8;
        Self {
            r: (r << 3) | (r >> 2),
            g: (g << 2) | (g >> 4),
            b: (b << 3) | (b >> 2),
        }
    }

    // Palette used by the kiosk screens (ILI9341 named colors)
    pub const BLACK: Color = Color::from_rgb565(0x0000);
    pub const WHITE: Color = Color::from_rgb565(0xFFFF);
    pub const NAVY: Color = Color::from_rgb565(0x000F);
    pub const BLUE: Color = Color::from_rgb565(0x001F);
    pub const RED: Color = Color::from_rgb565(0xF800);
    pub const CYAN: Color = Color::from_rgb565(0x07FF);
    pub const YELLOW: Color = Color::from_rgb565(0xFFE0);
    pub const DARK_CYAN: Color = Color::from_rgb565(0x03EF);
    pub const DARK_GREEN: Color = Color::from_rgb565(0x03E0);
    pub const DARK_GREY: Color = Color::from_rgb565(0x7BEF);
    pub const BUTTON_PRESSED: Color = Color::rgb(30, 30, 30);
    pub const BUTTON_OUTLINE: Color = Color::rgb(40, 40, 40);
}

/// Drawing primitives exposed by the panel
///
/// All calls are synchronous and infallible from the core's point of view.
/// Coordinates are signed so that partially off-screen shapes can be
/// expressed; implementations clip.
pub trait DisplaySurface {
    /// Display width in pixels
    fn width(&self) -> u16;

    /// Display height in pixels
    fn height(&self) -> u16;

    /// Fill the entire surface
    fn fill_screen(&mut self, color: Color);

    /// Fill a rectangle
    fn fill_rect(&mut self, x: i16, y: i16, w: u16, h: u16, color: Color);

    /// Draw a rectangle outline
    fn draw_rect(&mut self, x: i16, y: i16, w: u16, h: u16, color: Color);

    /// Fill a rectangle with rounded corners
    fn fill_round_rect(&mut self, x: i16, y: i16, w: u16, h: u16, _radius: u16, color: Color) {
        self.fill_rect(x, y, w, h, color);
    }

    /// Outline a rectangle with rounded corners
    fn draw_round_rect(&mut self, x: i16, y: i16, w: u16, h: u16, _radius: u16, color: Color) {
        self.draw_rect(x, y, w, h, color);
    }

    /// Move the text cursor
    fn set_cursor(&mut self, x: i16, y: i16);

    /// Set the text scale factor (1 = 6x8 glyph cell)
    fn set_text_size(&mut self, size: u8);

    /// Set the text foreground color
    fn set_text_color(&mut self, color: Color);

    /// Print text at the cursor, advancing it
    fn print_text(&mut self, text: &str);

    /// Bounding box of `text` at the given scale
    ///
    /// The default matches the classic 6x8 fixed font.
    fn text_bounds(&self, text: &str, size: u8) -> (u16, u16) {
        let size = size.max(1) as u16;
        let chars = text.chars().count() as u16;
        (chars.saturating_mul(6 * size), 8 * size)
    }
}

/// Print `text` horizontally centered at row `y`
pub fn draw_centered_text(display: &mut dyn DisplaySurface, text: &str, y: i16, size: u8, color: Color) {
    let (w, _) = display.text_bounds(text, size);
    let width = match display.width() {
        0 => 320,
        w => w,
    };
    let x = ((width as i32 - w as i32) / 2).max(0) as i16;
    display.set_text_size(size);
    display.set_text_color(color);
    display.set_cursor(x, y);
    display.print_text(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_roundtrip_of_palette() {
        assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
        assert_eq!(Color::BLACK.to_rgb565(), 0x0000);
        assert_eq!(Color::NAVY.to_rgb565(), 0x000F);
    }

    #[test]
    fn test_default_text_bounds() {
        struct Dummy;
        impl DisplaySurface for Dummy {
            fn width(&self) -> u16 { 320 }
            fn height(&self) -> u16 { 240 }
            fn fill_screen(&mut self, _: Color) {}
            fn fill_rect(&mut self, _: i16, _: i16, _: u16, _: u16, _: Color) {}
            fn draw_rect(&mut self, _: i16, _: i16, _: u16, _: u16, _: Color) {}
            fn set_cursor(&mut self, _: i16, _: i16) {}
            fn set_text_size(&mut self, _: u8) {}
            fn set_text_color(&mut self, _: Color) {}
            fn print_text(&mut self, _: &str) {}
        }

        assert_eq!(Dummy.text_bounds("Dalej", 2), (60, 16));
        assert_eq!(Dummy.text_bounds("", 0), (0, 8));
    }
}
