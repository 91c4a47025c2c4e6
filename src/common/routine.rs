//! Warn-then-fire routine: the timed loop shared by minion guns and spawners.
//!
//! ```text
//!   Stopped --restart--> Waiting(random whole secs) --> Warning(fixed secs) --> Fire
//!                              ^                                              |
//!                              +----------------------------------------------+
//! ```
//!
//! The routine owns its timers. `restart` and `stop` drop whatever wait is pending,
//! so a cancelled wait never fires late.

use std::time::Duration;

use bevy::prelude::*;

use super::rng::GameRng;

/// Range of whole seconds between shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireInterval {
    pub min_secs: u32,
    pub max_secs: u32,
    /// Whether `max_secs` itself can be drawn.
    pub max_inclusive: bool,
}

impl FireInterval {
    /// `min_secs..=max_secs`
    pub const fn new(min_secs: u32, max_secs: u32) -> Self {
        Self {
            min_secs,
            max_secs,
            max_inclusive: true,
        }
    }

    /// `min_secs..max_secs`
    pub const fn half_open(min_secs: u32, max_secs: u32) -> Self {
        Self {
            min_secs,
            max_secs,
            max_inclusive: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Stopped,
    Waiting(Timer),
    Warning(Timer),
}

/// What the owner should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineStep {
    Idle,
    /// The wait elapsed; warn the player that a shot is coming.
    Warn,
    /// The warning elapsed; launch now.
    Fire,
}

#[derive(Debug, Clone)]
pub struct WarnThenFire {
    interval: FireInterval,
    warning_secs: f32,
    phase: Phase,
}

impl WarnThenFire {
    pub fn new(interval: FireInterval, warning_secs: f32) -> Self {
        Self {
            interval,
            warning_secs: warning_secs.max(0.0),
            phase: Phase::Stopped,
        }
    }

    pub fn interval(&self) -> FireInterval {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Stopped)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.phase, Phase::Warning(_))
    }

    /// Start over from a fresh random wait, cancelling anything pending.
    pub fn restart(&mut self, rng: &mut GameRng) {
        self.phase = Phase::Waiting(self.wait_timer(rng));
    }

    /// Start over straight into the warning phase, skipping the random wait.
    pub fn restart_warned(&mut self) {
        self.phase = Phase::Warning(self.warning_timer());
    }

    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    /// Advance by `delta`. At most one phase change happens per tick.
    pub fn tick(&mut self, delta: Duration, rng: &mut GameRng) -> RoutineStep {
        let finished = match &mut self.phase {
            Phase::Stopped => return RoutineStep::Idle,
            Phase::Waiting(timer) | Phase::Warning(timer) => timer.tick(delta).is_finished(),
        };
        if !finished {
            return RoutineStep::Idle;
        }

        if matches!(self.phase, Phase::Waiting(_)) {
            self.phase = Phase::Warning(self.warning_timer());
            RoutineStep::Warn
        } else {
            self.phase = Phase::Waiting(self.wait_timer(rng));
            RoutineStep::Fire
        }
    }

    fn wait_timer(&self, rng: &mut GameRng) -> Timer {
        let FireInterval {
            min_secs,
            max_secs,
            max_inclusive,
        } = self.interval;
        let secs = if max_inclusive {
            rng.whole_secs(min_secs, max_secs)
        } else {
            rng.whole_secs_below(min_secs, max_secs)
        };
        Timer::from_seconds(secs, TimerMode::Once)
    }

    fn warning_timer(&self) -> Timer {
        Timer::from_seconds(self.warning_secs, TimerMode::Once)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn stopped_routine_never_fires() {
        let mut rng = GameRng::seeded(1);
        let mut routine = WarnThenFire::new(FireInterval::new(1, 1), 0.5);
        for _ in 0..10 {
            assert_eq!(routine.tick(secs(1.0), &mut rng), RoutineStep::Idle);
        }
        assert!(!routine.is_running());
    }

    #[test]
    fn waits_then_warns_then_fires_then_loops() {
        let mut rng = GameRng::seeded(7);
        let mut routine = WarnThenFire::new(FireInterval::new(2, 2), 0.5);
        routine.restart(&mut rng);

        assert_eq!(routine.tick(secs(1.0), &mut rng), RoutineStep::Idle);
        assert_eq!(routine.tick(secs(1.0), &mut rng), RoutineStep::Warn);
        assert!(routine.is_warning());
        assert_eq!(routine.tick(secs(0.25), &mut rng), RoutineStep::Idle);
        assert_eq!(routine.tick(secs(0.25), &mut rng), RoutineStep::Fire);

        // Back to a fresh two-second wait.
        assert!(!routine.is_warning());
        assert_eq!(routine.tick(secs(1.5), &mut rng), RoutineStep::Idle);
        assert_eq!(routine.tick(secs(0.5), &mut rng), RoutineStep::Warn);
    }

    #[test]
    fn restart_cancels_pending_warning() {
        let mut rng = GameRng::seeded(3);
        let mut routine = WarnThenFire::new(FireInterval::new(3, 3), 0.5);
        routine.restart_warned();
        assert!(routine.is_warning());

        routine.restart(&mut rng);
        // The half-second warning would have fired here; now we are in a 3 s wait.
        assert_eq!(routine.tick(secs(0.5), &mut rng), RoutineStep::Idle);
        assert!(!routine.is_warning());
    }

    #[test]
    fn stop_drops_the_pending_shot() {
        let mut rng = GameRng::seeded(3);
        let mut routine = WarnThenFire::new(FireInterval::new(1, 1), 0.0);
        routine.restart_warned();
        routine.stop();
        assert_eq!(routine.tick(secs(5.0), &mut rng), RoutineStep::Idle);
    }

    #[test]
    fn random_waits_stay_inside_the_interval() {
        let mut rng = GameRng::seeded(0xC0FFEE);
        for _ in 0..500 {
            let w = rng.whole_secs(2, 4);
            assert!((2.0..=4.0).contains(&w));
            assert_eq!(w.fract(), 0.0);
        }
        // Reversed bounds are tolerated.
        let w = rng.whole_secs(5, 1);
        assert!((1.0..=5.0).contains(&w));
    }

    #[test]
    fn half_open_waits_never_reach_the_upper_bound() {
        let mut rng = GameRng::seeded(0xBEEF);
        for _ in 0..500 {
            let w = rng.whole_secs_below(2, 4);
            assert!(w == 2.0 || w == 3.0, "drew {w}");
        }
        assert_eq!(rng.whole_secs_below(3, 3), 3.0);
    }

    #[test]
    fn half_open_interval_of_one_second_always_waits_the_minimum() {
        let mut rng = GameRng::seeded(11);
        let mut routine = WarnThenFire::new(FireInterval::half_open(2, 3), 0.0);
        for _ in 0..20 {
            routine.restart(&mut rng);
            assert_eq!(routine.tick(secs(1.5), &mut rng), RoutineStep::Idle);
            assert_eq!(routine.tick(secs(0.5), &mut rng), RoutineStep::Warn);
        }
    }
}
