/// A number counting from `from` to `to`, used for the predicted price reveal.
#[derive(Debug, Clone, Copy)]
pub struct CountUp {
    pub from: f64,
    pub to: f64,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl CountUp {
    pub fn new(from: f64, to: f64, start_time: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
        }
    }

    /// Progress in 0.0..=1.0 at `now`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Current value. Lands exactly on `to` once complete.
    pub fn value_at(&self, now: f64) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * quartic_ease_out(t)
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Quartic ease-out: fast start, decelerating to zero velocity.
fn quartic_ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(4)
}

#[cfg(test)]
mod tests {
    use super::{CountUp, quartic_ease_out};

    #[test]
    fn easing_endpoints() {
        assert_eq!(quartic_ease_out(0.0), 0.0);
        assert_eq!(quartic_ease_out(1.0), 1.0);
        assert!((quartic_ease_out(0.5) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn counts_from_zero_to_target() {
        let anim = CountUp::new(0.0, 4_500_000.0, 1_000.0, 1_000.0);
        assert_eq!(anim.value_at(1_000.0), 0.0);
        assert_eq!(anim.value_at(2_000.0), 4_500_000.0);
        assert_eq!(anim.value_at(9_999.0), 4_500_000.0);
        assert!(anim.is_done(2_000.0));
        assert!(!anim.is_done(1_999.0));
    }

    #[test]
    fn monotonic_over_duration() {
        let anim = CountUp::new(0.0, 100.0, 0.0, 1_000.0);
        let samples: Vec<f64> = (0..=20).map(|i| anim.value_at(i as f64 * 50.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let anim = CountUp::new(0.0, 42.0, 10.0, 0.0);
        assert_eq!(anim.value_at(10.0), 42.0);
    }
}
