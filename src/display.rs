//! Animated display value with ease-out transitions and a highlight cue

use std::time::{Duration, Instant};

use crate::format::format_market_cap_usd;

/// How long a value transition runs.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(650);

/// How long the highlight cue stays lit after a retarget.
pub const BUMP_DURATION: Duration = Duration::from_millis(180);

#[derive(Debug, Clone, Copy)]
struct Transition {
    start: f64,
    target: f64,
    started_at: Instant,
}

/// Owns the rendered market-cap value and the at-most-one in-flight
/// interpolation toward a new target.
#[derive(Debug)]
pub struct DisplayAnimator {
    displayed: f64,
    transition: Option<Transition>,
    bumped_at: Option<Instant>,
}

impl DisplayAnimator {
    pub fn new() -> Self {
        Self {
            displayed: 0.0,
            transition: None,
            bumped_at: None,
        }
    }

    /// Begin animating toward `target`, replacing any transition already in
    /// flight. Non-finite targets are ignored. The bump cue restarts even
    /// when the target is unchanged, so repeated updates still pulse.
    pub fn set_target(&mut self, target: f64, now: Instant) {
        if !target.is_finite() {
            return;
        }
        self.transition = Some(Transition {
            start: self.displayed,
            target,
            started_at: now,
        });
        self.bumped_at = Some(now);
    }

    /// Advance the animation to `now`. Returns true while more frames are
    /// needed. On the converged final frame the displayed value equals the
    /// target exactly.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };
        let elapsed = now.saturating_duration_since(transition.started_at);
        let progress = (elapsed.as_secs_f64() / TRANSITION_DURATION.as_secs_f64()).min(1.0);
        if progress >= 1.0 {
            self.displayed = transition.target;
            self.transition = None;
            return false;
        }
        let eased = 1.0 - (1.0 - progress).powi(3);
        self.displayed = transition.start + (transition.target - transition.start) * eased;
        true
    }

    /// The value currently shown, possibly mid-transition.
    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether the highlight cue is still lit.
    pub fn bump_active(&self, now: Instant) -> bool {
        self.bumped_at
            .map(|at| now.saturating_duration_since(at) < BUMP_DURATION)
            .unwrap_or(false)
    }

    /// The formatted text for the current frame.
    pub fn text(&self) -> String {
        format_market_cap_usd(self.displayed)
    }
}

impl Default for DisplayAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_duration_lands_exactly_on_target() {
        let t0 = Instant::now();
        let mut animator = DisplayAnimator::new();
        animator.set_target(5000.0, t0);

        assert!(animator.tick(t0 + Duration::from_millis(100)));
        assert!(animator.displayed() > 0.0);
        assert!(animator.displayed() < 5000.0);

        assert!(!animator.tick(t0 + TRANSITION_DURATION));
        assert_eq!(animator.displayed(), 5000.0);
        assert_eq!(animator.text(), "$5,000");
        assert!(!animator.is_animating());
    }

    #[test]
    fn ease_out_is_front_loaded() {
        let t0 = Instant::now();
        let mut animator = DisplayAnimator::new();
        animator.set_target(1000.0, t0);

        // Halfway through, the cubic curve has covered 1 - 0.5^3 = 87.5%.
        animator.tick(t0 + TRANSITION_DURATION / 2);
        assert!((animator.displayed() - 875.0).abs() < 1e-6);
    }

    #[test]
    fn retarget_mid_flight_cancels_the_first_transition() {
        let t0 = Instant::now();
        let mut animator = DisplayAnimator::new();
        animator.set_target(1000.0, t0);
        animator.tick(t0 + Duration::from_millis(100));

        let retarget_at = t0 + Duration::from_millis(100);
        animator.set_target(200.0, retarget_at);
        assert!(!animator.tick(retarget_at + TRANSITION_DURATION));

        // Converges to the second target only, never an average of both.
        assert_eq!(animator.displayed(), 200.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn non_finite_target_is_a_silent_no_op() {
        let t0 = Instant::now();
        let mut animator = DisplayAnimator::new();
        animator.set_target(f64::NAN, t0);
        animator.set_target(f64::INFINITY, t0);

        assert!(!animator.is_animating());
        assert!(!animator.bump_active(t0));
        assert!(!animator.tick(t0 + Duration::from_millis(16)));
        assert_eq!(animator.displayed(), 0.0);
    }

    #[test]
    fn bump_restarts_on_every_retarget() {
        let t0 = Instant::now();
        let mut animator = DisplayAnimator::new();
        animator.set_target(10.0, t0);

        assert!(animator.bump_active(t0 + Duration::from_millis(100)));
        assert!(!animator.bump_active(t0 + Duration::from_millis(300)));

        // Same target again still pulses.
        let again = t0 + Duration::from_millis(300);
        animator.set_target(10.0, again);
        assert!(animator.bump_active(again + Duration::from_millis(100)));
    }
}
