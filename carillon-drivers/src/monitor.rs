//! Stop-button edge detection.
//!
//! The button task polls the line at the debounce interval and feeds each
//! sample through an [`EdgeDetector`], so only the press itself triggers a
//! stop. Holding the button, or a latched stop keeping the motors off, never
//! produces repeat triggers.

/// Rising-edge detector over polled button samples.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    was_pressed: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Feeds one sample. Returns `true` on the released-to-pressed edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_press() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.update(false));
        assert!(edge.update(true));
        // Held down: no repeat.
        assert!(!edge.update(true));
        assert!(!edge.update(false));
        assert!(edge.update(true));
    }

    #[test]
    fn initial_pressed_sample_counts_as_an_edge() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true));
    }
}
