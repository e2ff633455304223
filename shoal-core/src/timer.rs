/// A single-shot countdown.
///
/// Idle until `start`ed, then accumulates elapsed time on each `advance`
/// until it reaches the configured length, at which point `advance` reports
/// the expiry exactly once and the timer returns to idle. Starting a running
/// timer restarts the countdown.
#[derive(Debug, Clone)]
pub struct Timer {
    active: bool,
    length: f32,
    elapsed: f32,
}

impl Timer {
    pub fn new(length: f32) -> Self {
        Self {
            active: false,
            length,
            elapsed: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Return to idle without firing.
    pub fn stop(&mut self) {
        self.elapsed = 0.0;
        self.active = false;
    }

    /// Takes effect on the next `advance`, even mid-countdown.
    pub fn set_length(&mut self, length: f32) {
        self.length = length;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the countdown; returns `true` on the tick it expires.
    ///
    /// Has no effect while idle.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed += dt;
        if self.elapsed >= self.length {
            self.active = false;
            self.elapsed = 0.0;
            return true;
        }

        false
    }
}
