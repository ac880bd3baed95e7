//! Edge detection over polled touch samples

use super::{TouchEvent, TouchPoint, TouchSample};

/// Turns level samples into down/move/up edges
///
/// Holds the previous pressed state and the last pressed point. At most one
/// event comes out per sample. No debouncing happens here; the touch source
/// already spaces its accepted samples.
#[derive(Debug, Default)]
pub struct TouchEdgeDispatcher {
    was_pressed: bool,
    last_point: TouchPoint,
}

impl TouchEdgeDispatcher {
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            last_point: TouchPoint::at(0, 0),
        }
    }

    /// Classify `sample` against the previous one
    pub fn process(&mut self, sample: TouchSample) -> Option<TouchEvent> {
        let point = sample.point();

        let event = match (self.was_pressed, sample.pressed) {
            (false, true) => Some(TouchEvent::Down(point)),
            (true, false) => Some(TouchEvent::Up(self.last_point)),
            (true, true) if point != self.last_point => Some(TouchEvent::Move(point)),
            _ => None,
        };

        self.was_pressed = sample.pressed;
        if sample.pressed {
            self.last_point = point;
        }
        event
    }

    /// Whether the last processed sample was pressed
    pub fn is_pressed(&self) -> bool {
        self.was_pressed
    }

    /// Forget any in-progress touch
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_emits_single_down_at_point() {
        let mut d = TouchEdgeDispatcher::new();
        assert_eq!(d.process(TouchSample::released()), None);
        assert_eq!(
            d.process(TouchSample::pressed_at(100, 50)),
            Some(TouchEvent::Down(TouchPoint::at(100, 50)))
        );
        assert_eq!(d.process(TouchSample::pressed_at(100, 50)), None);
    }

    #[test]
    fn test_release_uses_last_pressed_point() {
        let mut d = TouchEdgeDispatcher::new();
        d.process(TouchSample::pressed_at(10, 10));
        d.process(TouchSample::pressed_at(12, 14));

        let mut release = TouchSample::released();
        release.x = 300;
        release.y = 200;
        assert_eq!(d.process(release), Some(TouchEvent::Up(TouchPoint::at(12, 14))));
        assert_eq!(d.process(TouchSample::released()), None);
    }

    #[test]
    fn test_move_only_when_position_changes() {
        let mut d = TouchEdgeDispatcher::new();
        d.process(TouchSample::pressed_at(10, 10));
        assert_eq!(
            d.process(TouchSample::pressed_at(11, 10)),
            Some(TouchEvent::Move(TouchPoint::at(11, 10)))
        );
        assert_eq!(d.process(TouchSample::pressed_at(11, 10)), None);
    }

    #[test]
    fn test_raw_values_do_not_affect_edges() {
        let mut d = TouchEdgeDispatcher::new();
        let mut s = TouchSample::pressed_at(5, 5);
        d.process(s);
        s.raw_x = 1234;
        assert_eq!(d.process(s), None);
    }
}
