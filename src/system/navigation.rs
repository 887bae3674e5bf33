//! Navigation decision policy
//!
//! The control state machine that arbitrates between emergency reversal
//! and clearest-path steering. Pure logic, evaluated once per distance
//! sample; hardware effects happen in the navigate task, which forwards
//! the commands this policy emits.
//!
//! # Transitions
//! - Any hazard (pending collision, or any sensor closer than the stop
//!   threshold) puts the robot into `Reversing`. Re-triggering while
//!   already reversing emits no new command, so repeated hazards do not
//!   jitter the motors.
//! - With no hazard, the robot steers toward whichever direction has
//!   strictly the greatest clearance. A tie emits nothing and the last
//!   command stays in effect - defined behavior, not an accident.
//! - A command is only emitted when the state actually changes.

use crate::system::distance::DistanceReading;
use crate::system::drive_command::Command;
use defmt::Format;

/// Hazard distance: anything closer triggers a reversal (mm)
pub const STOP_DISTANCE_MM: u32 = 120;

/// Cruise duty for the initial forward command
const CRUISE_DUTY: u16 = 5_000;

/// Per-wheel duty for steady forward driving
const FORWARD_DUTY: u16 = 3_000;

/// Outer/inner wheel duties while turning
const TURN_FAST_DUTY: u16 = 2_700;
const TURN_SLOW_DUTY: u16 = 1_300;

/// Per-wheel duties while backing away; slightly asymmetric so the
/// robot arcs out of dead ends instead of retracing its path
const REVERSE_LEFT_DUTY: u16 = 1_500;
const REVERSE_RIGHT_DUTY: u16 = 2_000;

/// Navigation state, one per active motor command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum NavState {
    Forward,
    TurnLeft,
    TurnRight,
    Reversing,
}

/// The robot's control state
///
/// Owns everything the decision loop mutates; the navigate task holds
/// the single instance.
pub struct NavPolicy {
    state: NavState,
}

impl NavPolicy {
    /// Starts in `Forward`, matching the initial cruise command
    pub fn new() -> Self {
        Self {
            state: NavState::Forward,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Command that starts the robot off at cruise speed
    pub fn initial_command() -> Command {
        Command::Forward {
            left: CRUISE_DUTY,
            right: CRUISE_DUTY,
        }
    }

    /// Evaluates one distance sample and returns the motor command to
    /// issue, if the state changed.
    ///
    /// `collision` reflects whether a bump event was pending for this
    /// cycle; the caller consumes the event atomically before calling.
    pub fn on_sample(&mut self, reading: &DistanceReading, collision: bool) -> Option<Command> {
        if collision || reading.min() < STOP_DISTANCE_MM {
            return self.transition(
                NavState::Reversing,
                Command::Backward {
                    left: REVERSE_LEFT_DUTY,
                    right: REVERSE_RIGHT_DUTY,
                },
            );
        }

        // steer toward the strictly greatest clearance; ties hold the
        // previous command
        let DistanceReading {
            right,
            center,
            left,
        } = *reading;
        if center > right && center > left {
            self.transition(
                NavState::Forward,
                Command::Forward {
                    left: FORWARD_DUTY,
                    right: FORWARD_DUTY,
                },
            )
        } else if right > center && right > left {
            self.transition(
                NavState::TurnRight,
                Command::TurnRight {
                    left: TURN_FAST_DUTY,
                    right: TURN_SLOW_DUTY,
                },
            )
        } else if left > center && left > right {
            self.transition(
                NavState::TurnLeft,
                Command::TurnLeft {
                    left: TURN_SLOW_DUTY,
                    right: TURN_FAST_DUTY,
                },
            )
        } else {
            None
        }
    }

    fn transition(&mut self, next: NavState, command: Command) -> Option<Command> {
        if self.state == next {
            return None;
        }
        self.state = next;
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(right: u32, center: u32, left: u32) -> DistanceReading {
        DistanceReading {
            right,
            center,
            left,
        }
    }

    #[test]
    fn close_obstacle_triggers_reversal() {
        let mut policy = NavPolicy::new();
        let command = policy.on_sample(&reading(200, 50, 200), false);
        assert_eq!(policy.state(), NavState::Reversing);
        assert!(matches!(command, Some(Command::Backward { .. })));
    }

    #[test]
    fn collision_triggers_reversal_even_with_clear_distances() {
        let mut policy = NavPolicy::new();
        let command = policy.on_sample(&reading(700, 700, 700), true);
        assert_eq!(policy.state(), NavState::Reversing);
        assert!(matches!(command, Some(Command::Backward { .. })));
    }

    #[test]
    fn hazard_while_reversing_issues_nothing() {
        let mut policy = NavPolicy::new();
        policy.on_sample(&reading(200, 50, 200), false);
        assert_eq!(policy.on_sample(&reading(200, 50, 200), false), None);
        assert_eq!(policy.on_sample(&reading(500, 500, 500), true), None);
        assert_eq!(policy.state(), NavState::Reversing);
    }

    #[test]
    fn steers_forward_when_center_is_strictly_clearest() {
        let mut policy = NavPolicy::new();
        // leave Forward first so the transition back is observable
        policy.on_sample(&reading(300, 200, 500), false);
        assert_eq!(policy.state(), NavState::TurnLeft);

        let command = policy.on_sample(&reading(300, 500, 100), false);
        assert_eq!(policy.state(), NavState::Forward);
        assert!(matches!(command, Some(Command::Forward { .. })));
    }

    #[test]
    fn steers_toward_the_clear_side() {
        let mut policy = NavPolicy::new();
        let command = policy.on_sample(&reading(600, 300, 200), false);
        assert_eq!(policy.state(), NavState::TurnRight);
        assert!(matches!(command, Some(Command::TurnRight { .. })));

        let command = policy.on_sample(&reading(200, 300, 600), false);
        assert_eq!(policy.state(), NavState::TurnLeft);
        assert!(matches!(command, Some(Command::TurnLeft { .. })));
    }

    #[test]
    fn tie_holds_previous_command_while_forward() {
        let mut policy = NavPolicy::new();
        assert_eq!(policy.on_sample(&reading(500, 500, 100), false), None);
        assert_eq!(policy.state(), NavState::Forward);
    }

    #[test]
    fn tie_holds_previous_command_while_turning() {
        let mut policy = NavPolicy::new();
        policy.on_sample(&reading(200, 300, 600), false);
        assert_eq!(policy.state(), NavState::TurnLeft);

        assert_eq!(policy.on_sample(&reading(500, 500, 100), false), None);
        assert_eq!(policy.state(), NavState::TurnLeft);
    }

    #[test]
    fn same_winner_does_not_reissue_the_command() {
        let mut policy = NavPolicy::new();
        policy.on_sample(&reading(600, 300, 200), false);
        assert_eq!(policy.on_sample(&reading(610, 300, 200), false), None);
    }

    #[test]
    fn recovers_to_steering_after_the_hazard_clears() {
        let mut policy = NavPolicy::new();
        policy.on_sample(&reading(200, 50, 200), false);
        assert_eq!(policy.state(), NavState::Reversing);

        let command = policy.on_sample(&reading(300, 500, 100), false);
        assert_eq!(policy.state(), NavState::Forward);
        assert!(matches!(command, Some(Command::Forward { .. })));
    }

    #[test]
    fn boundary_distance_is_not_a_hazard() {
        let mut policy = NavPolicy::new();
        // exactly at the threshold: strictly-less-than does not trigger
        let command = policy.on_sample(
            &reading(STOP_DISTANCE_MM, STOP_DISTANCE_MM, STOP_DISTANCE_MM),
            false,
        );
        assert_eq!(command, None);
        assert_eq!(policy.state(), NavState::Forward);
    }
}
