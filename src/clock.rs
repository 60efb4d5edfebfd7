use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CLOCK_SECONDS: f64 = 300.0;

/// Countdown clock owned by one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerClock {
    time_left: f64,
    active: bool,
}

impl PlayerClock {
    pub fn new(seconds: f64) -> Self {
        PlayerClock {
            time_left: seconds,
            active: false,
        }
    }

    pub fn time_left(&self) -> f64 {
        self.time_left
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Count down by `elapsed` if running. A clock that has already run out
    /// stays where it is.
    pub fn update(&mut self, elapsed: Duration) {
        if self.active && self.time_left > 0.0 {
            self.time_left -= elapsed.as_secs_f64();
        }
    }

    pub fn is_expired(&self) -> bool {
        self.time_left <= 0.0
    }

    /// Remaining time as `MM:SS`.
    pub fn format(&self) -> String {
        let total = self.time_left.max(0.0) as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

impl Default for PlayerClock {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SECONDS)
    }
}

/// Overall time spent in a game. Unaffected by pause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    elapsed: f64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.elapsed += elapsed.as_secs_f64();
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed as u64
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn format(&self) -> String {
        let total = self.elapsed_secs();
        let hours = total / 3600;
        let minutes = (total / 60) % 60;
        let seconds = total % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_clock_does_not_move() {
        let mut clock = PlayerClock::new(10.0);
        clock.update(Duration::from_secs(3));
        assert_eq!(clock.time_left(), 10.0);
    }

    #[test]
    fn test_active_clock_counts_down() {
        let mut clock = PlayerClock::new(10.0);
        clock.set_active(true);
        clock.update(Duration::from_millis(2500));
        assert!((clock.time_left() - 7.5).abs() < 1e-9);
        assert!(!clock.is_expired());
    }

    #[test]
    fn test_clock_expires_at_zero() {
        let mut clock = PlayerClock::new(1.0);
        clock.set_active(true);
        clock.update(Duration::from_secs(1));
        assert!(clock.is_expired());

        // Further updates leave an expired clock alone
        let left = clock.time_left();
        clock.update(Duration::from_secs(5));
        assert_eq!(clock.time_left(), left);
    }

    #[test]
    fn test_player_clock_format() {
        assert_eq!(PlayerClock::new(300.0).format(), "05:00");
        assert_eq!(PlayerClock::new(61.9).format(), "01:01");
        assert_eq!(PlayerClock::new(-2.0).format(), "00:00");
    }

    #[test]
    fn test_game_clock_format() {
        let mut clock = GameClock::new();
        assert_eq!(clock.format(), "00:00:00");

        clock.advance(Duration::from_secs(3 * 3600 + 25 * 60 + 7));
        assert_eq!(clock.format(), "03:25:07");
    }
}
