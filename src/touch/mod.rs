//! Touch input types
//!
//! Provides the per-tick touch sample produced by a [`TouchSource`] and the
//! discrete events the router hands to screens.
//!
//! [`TouchSource`]: crate::hal::TouchSource

mod dispatcher;

pub use dispatcher::TouchEdgeDispatcher;

/// Calibrated screen coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchPoint {
    /// X coordinate (0-319)
    pub x: i16,
    /// Y coordinate (0-239)
    pub y: i16,
}

impl TouchPoint {
    /// Create a touch point
    pub const fn at(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// One polled touch reading
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchSample {
    pub x: i16,
    pub y: i16,
    /// Uncalibrated ADC values
    pub raw_x: i16,
    pub raw_y: i16,
    pub pressed: bool,
}

impl TouchSample {
    /// A pressed sample at a calibrated point
    pub const fn pressed_at(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            raw_x: 0,
            raw_y: 0,
            pressed: true,
        }
    }

    /// A released sample; coordinates carry no meaning
    pub const fn released() -> Self {
        Self {
            x: 0,
            y: 0,
            raw_x: 0,
            raw_y: 0,
            pressed: false,
        }
    }

    pub const fn point(&self) -> TouchPoint {
        TouchPoint::at(self.x, self.y)
    }
}

/// Touch event types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    /// Finger touched the screen
    Down(TouchPoint),
    /// Finger moved while touching
    Move(TouchPoint),
    /// Finger lifted; carries the last pressed point
    Up(TouchPoint),
}
