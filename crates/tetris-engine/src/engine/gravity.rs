use std::time::Duration;

use super::game_stats::MAX_LEVEL;

/// Time between automatic drops at `level`.
///
/// `(0.8 - (level - 1) * 0.007) ^ (level - 1)` seconds, halved when
/// `accelerated`, and never shorter than one tick.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tetris_engine::gravity_delay;
///
/// let tick = Duration::from_secs(1) / 60;
/// assert_eq!(gravity_delay(1, false, tick), Duration::from_secs(1));
/// assert_eq!(gravity_delay(1, true, tick), Duration::from_millis(500));
/// ```
#[must_use]
pub fn gravity_delay(level: u32, accelerated: bool, tick_interval: Duration) -> Duration {
    let steps = f64::from(level.clamp(1, MAX_LEVEL) - 1);
    let mut secs = (0.8 - steps * 0.007).powf(steps);
    if accelerated {
        secs /= 2.0;
    }
    Duration::from_secs_f64(secs).max(tick_interval)
}

/// Number of ticks at `tick_rate_hz` covering `delay`, rounded, at least one.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn delay_ticks(delay: Duration, tick_rate_hz: u32) -> u64 {
    let ticks = (delay.as_secs_f64() * f64::from(tick_rate_hz)).round() as u64;
    ticks.max(1)
}
