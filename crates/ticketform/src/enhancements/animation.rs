//! Frame-driven opacity transitions

use chrono::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeAnimation {
    from: u8,
    to: u8,
    duration: Duration,
}

impl FadeAnimation {
    pub fn fade_out(duration: Duration) -> Self {
        Self { from: 100, to: 0, duration }
    }

    pub fn fade_in(duration: Duration) -> Self {
        Self { from: 0, to: 100, duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Opacity in `[0, 1]` after `elapsed`, linear over the duration
    pub fn opacity_at(&self, elapsed: Duration) -> f64 {
        let from = f64::from(self.from) / 100.0;
        let to = f64::from(self.to) / 100.0;
        if self.duration <= Duration::zero() || elapsed >= self.duration {
            return to;
        }
        if elapsed <= Duration::zero() {
            return from;
        }
        let progress = elapsed.num_milliseconds() as f64 / self.duration.num_milliseconds() as f64;
        from + (to - from) * progress
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_out() {
        let fade = FadeAnimation::fade_out(Duration::milliseconds(200));
        assert_eq!(fade.opacity_at(Duration::zero()), 1.0);
        assert_eq!(fade.opacity_at(Duration::milliseconds(100)), 0.5);
        assert_eq!(fade.opacity_at(Duration::milliseconds(250)), 0.0);
        assert!(!fade.is_finished(Duration::milliseconds(199)));
        assert!(fade.is_finished(Duration::milliseconds(200)));
    }

    #[test]
    fn test_fade_in_and_instant() {
        let fade = FadeAnimation::fade_in(Duration::milliseconds(400));
        assert_eq!(fade.opacity_at(Duration::milliseconds(100)), 0.25);
        assert_eq!(FadeAnimation::fade_out(Duration::zero()).opacity_at(Duration::zero()), 0.0);
    }
}
