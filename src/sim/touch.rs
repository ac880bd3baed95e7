//! Touch panel replaying timed presses

use crate::hal::TouchSource;
use crate::touch::TouchSample;

#[derive(Clone, Copy, Debug)]
struct Press {
    start_ms: u64,
    end_ms: u64,
    x: i16,
    y: i16,
}

/// Reports a press at `(x, y)` during each scripted `[start, end)` window
#[derive(Clone, Debug, Default)]
pub struct ScriptedTouch {
    presses: Vec<Press>,
    debounce_ms: u64,
    last_accepted_ms: Option<u64>,
    last: TouchSample,
}

impl ScriptedTouch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold samples for `ms` after each accepted one, as the panel driver does
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn press(&mut self, start_ms: u64, end_ms: u64, x: i16, y: i16) {
        self.presses.push(Press { start_ms, end_ms, x, y });
    }

    /// A short tap starting at `at_ms`
    pub fn tap(&mut self, at_ms: u64, x: i16, y: i16) {
        self.press(at_ms, at_ms + 100, x, y);
    }

    fn raw(&self, now_ms: u64) -> TouchSample {
        self.presses
            .iter()
            .find(|p| p.start_ms <= now_ms && now_ms < p.end_ms)
            .map_or(TouchSample::released(), |p| TouchSample::pressed_at(p.x, p.y))
    }
}

impl TouchSource for ScriptedTouch {
    fn sample(&mut self, now_ms: u64) -> TouchSample {
        if let Some(last) = self.last_accepted_ms {
            if now_ms.saturating_sub(last) < self.debounce_ms {
                return self.last;
            }
        }
        self.last = self.raw(now_ms);
        self.last_accepted_ms = Some(now_ms);
        self.last
    }
}
