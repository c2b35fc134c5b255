//! Loading screen: a ball sliding back and forth until the splash time is up.

use std::time::Duration;

use crate::config::SplashConfig;

pub struct SplashScreen {
    duration: Duration,
    travel_px: f32,
    period: Duration,
}

impl SplashScreen {
    pub fn new(config: &SplashConfig) -> Self {
        Self {
            duration: Duration::from_millis(config.duration_ms),
            travel_px: config.travel_px,
            period: Duration::from_millis(config.period_ms),
        }
    }

    /// Horizontal ball offset: a triangle wave from 0 out to `travel_px` and
    /// back, one leg per period.
    pub fn offset_x(&self, elapsed: Duration) -> f32 {
        let leg = self.period.as_secs_f32();
        if leg <= 0.0 {
            return 0.0;
        }
        let phase = (elapsed.as_secs_f32() % (leg * 2.0)) / leg;
        let t = if phase <= 1.0 { phase } else { 2.0 - phase };
        t * self.travel_px
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splash() -> SplashScreen {
        SplashScreen::new(&SplashConfig::default())
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn ball_travels_out_and_back() {
        let s = splash();
        assert_eq!(s.offset_x(ms(0)), 0.0);
        assert!((s.offset_x(ms(750)) - 50.0).abs() < 1e-3);
        assert!((s.offset_x(ms(1500)) - 100.0).abs() < 1e-3);
        assert!((s.offset_x(ms(2250)) - 50.0).abs() < 1e-3);
        assert!(s.offset_x(ms(3000)).abs() < 1e-3);
    }

    #[test]
    fn offset_stays_within_travel() {
        let s = splash();
        for t in (0..10_000).step_by(37) {
            let x = s.offset_x(ms(t));
            assert!((0.0..=100.0 + 1e-3).contains(&x));
        }
    }

    #[test]
    fn finishes_after_duration() {
        let s = splash();
        assert!(!s.is_finished(ms(2499)));
        assert!(s.is_finished(ms(2500)));
    }

    #[test]
    fn zero_period_keeps_ball_still() {
        let s = SplashScreen::new(&SplashConfig {
            period_ms: 0,
            ..SplashConfig::default()
        });
        assert_eq!(s.offset_x(ms(1234)), 0.0);
    }
}
