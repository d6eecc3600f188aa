// src/gesture.rs - Pinch classification and debounced filter cycling
use std::time::{Duration, Instant};

use crate::tracking::PixelPoint;

/// Maximum thumb-to-index distance, in pixels, that still counts as a pinch.
pub const PINCH_THRESHOLD_PX: f64 = 30.0;

/// Minimum time between two accepted pinch-triggered filter changes.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);

/// Returns true iff the thumb and index fingertips are strictly closer than
/// `threshold` pixels. Coordinates must already be scaled to pixel units.
pub fn is_pinch(thumb: PixelPoint, index: PixelPoint, threshold: f64) -> bool {
    let dx = (thumb.x - index.x) as f64;
    let dy = (thumb.y - index.y) as f64;
    dx.hypot(dy) < threshold
}

/// Debounced filter-cycling state machine.
///
/// The only state that survives across frames: the active filter index and
/// the time of the last accepted trigger. Callers feed it one observation
/// per frame on which a valid left/right hand pair (and therefore an ROI)
/// exists; ambiguous frames skip the machine entirely.
#[derive(Debug, Clone)]
pub struct FilterCycle {
    active: usize,
    filter_count: usize,
    last_trigger: Option<Instant>,
    debounce: Duration,
}

impl FilterCycle {
    pub fn new(filter_count: usize) -> Self {
        assert!(filter_count > 0, "filter bank must not be empty");
        Self {
            active: 0,
            filter_count,
            last_trigger: None,
            debounce: DEBOUNCE_INTERVAL,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Index of the currently active filter, always in `[0, filter_count)`.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Consume one frame's pinch observation. Returns true if the active
    /// filter advanced. A sustained pinch only fires once per debounce
    /// interval; the first pinch after startup always fires.
    pub fn on_frame(&mut self, pinch_detected: bool, now: Instant) -> bool {
        if !pinch_detected {
            return false;
        }
        let debounce_elapsed = match self.last_trigger {
            None => true,
            Some(last) => now.duration_since(last) > self.debounce,
        };
        if !debounce_elapsed {
            return false;
        }
        self.active = (self.active + 1) % self.filter_count;
        self.last_trigger = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y }
    }

    #[test]
    fn pinch_strictly_below_threshold() {
        assert!(is_pinch(pt(100, 100), pt(120, 100), 30.0));
        assert!(is_pinch(pt(0, 0), pt(0, 29), 30.0));
        assert!(!is_pinch(pt(100, 100), pt(160, 100), 30.0));
    }

    #[test]
    fn pinch_boundary_distance_is_not_a_pinch() {
        // d == t must be false
        assert!(!is_pinch(pt(0, 0), pt(30, 0), 30.0));
        assert!(!is_pinch(pt(10, 10), pt(13, 14), 5.0));
    }

    #[test]
    fn pinch_uses_euclidean_distance() {
        // 3-4-5 triangle: distance is exactly 5
        assert!(!is_pinch(pt(0, 0), pt(3, 4), 5.0));
        assert!(is_pinch(pt(0, 0), pt(3, 4), 5.1));
    }

    #[test]
    fn first_pinch_fires_immediately() {
        let mut cycle = FilterCycle::new(4);
        assert!(cycle.on_frame(true, Instant::now()));
        assert_eq!(cycle.active_index(), 1);
    }

    #[test]
    fn no_pinch_never_advances() {
        let mut cycle = FilterCycle::new(4);
        let t0 = Instant::now();
        for i in 0..10 {
            assert!(!cycle.on_frame(false, t0 + Duration::from_millis(i * 100)));
        }
        assert_eq!(cycle.active_index(), 0);
    }

    #[test]
    fn debounce_suppresses_rapid_retrigger() {
        let mut cycle = FilterCycle::new(4);
        let t0 = Instant::now();
        assert!(cycle.on_frame(true, t0));
        // 0.3s later: inside the interval, no transition
        assert!(!cycle.on_frame(true, t0 + Duration::from_millis(300)));
        assert_eq!(cycle.active_index(), 1);
    }

    #[test]
    fn debounce_allows_spaced_triggers() {
        let mut cycle = FilterCycle::new(4);
        let t0 = Instant::now();
        assert!(cycle.on_frame(true, t0));
        assert!(cycle.on_frame(true, t0 + Duration::from_millis(600)));
        assert_eq!(cycle.active_index(), 2);
    }

    #[test]
    fn sustained_pinch_advances_once_per_interval() {
        let mut cycle = FilterCycle::new(4);
        let t0 = Instant::now();
        let mut transitions = 0;
        // 30 frames at ~33ms, pinch held the whole time: just under a second
        for i in 0..30 {
            if cycle.on_frame(true, t0 + Duration::from_millis(i * 33)) {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 2);
        assert_eq!(cycle.active_index(), 2);
    }

    #[test]
    fn cycling_wraps_to_zero() {
        let mut cycle = FilterCycle::new(3);
        let t0 = Instant::now();
        assert!(cycle.on_frame(true, t0));
        assert!(cycle.on_frame(true, t0 + Duration::from_secs(1)));
        assert_eq!(cycle.active_index(), 2);
        assert!(cycle.on_frame(true, t0 + Duration::from_secs(2)));
        assert_eq!(cycle.active_index(), 0);
    }
}
