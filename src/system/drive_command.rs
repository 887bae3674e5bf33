//! Drive Command Module
//!
//! This module provides functionality for managing and signaling drive
//! commands in the robot system. It uses an embassy-sync Signal for
//! thread-safe communication across different parts of the system.
//! The signal also lets the collision monitor override an in-flight
//! command: a stop issued from the high-priority context replaces
//! whatever the navigation task last requested.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// PWM period for both wheels, in timer counts.
///
/// One tenth of the 100 ms motor time constant. Duty magnitudes in
/// [`Command`] must stay below this value.
pub const MOTOR_PWM_PERIOD: u16 = 15_000;

/// Signal for drive commands
///
/// A new command overwrites an unconsumed one, so the drive task always
/// acts on the most recent request.
static DRIVE: Signal<CriticalSectionRawMutex, Command> = Signal::new();

/// Sends a new drive command
///
/// Synchronous, callable from any context including the high-priority
/// collision executor.
pub fn update(command: Command) {
    DRIVE.signal(command);
}

/// Waits for a new drive command
pub async fn wait() -> Command {
    DRIVE.wait().await
}

/// Takes a pending drive command without waiting, if one is queued.
///
/// The drive task drains the signal after its internal settle delays:
/// a command arriving during such a delay (a collision stop above all)
/// must win over the one being applied.
pub fn try_take() -> Option<Command> {
    DRIVE.try_take()
}

/// Motion commands with independent per-wheel duty magnitudes
///
/// Duty values are PWM counts in `0..MOTOR_PWM_PERIOD`; the drive task
/// clamps anything above the period to full scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Command {
    /// Both wheels forward
    Forward { left: u16, right: u16 },
    /// Both wheels backward
    Backward { left: u16, right: u16 },
    /// Veer left (right wheel faster than left)
    TurnLeft { left: u16, right: u16 },
    /// Veer right (left wheel faster than right)
    TurnRight { left: u16, right: u16 },
    /// Brake both wheels immediately
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_command_wins_and_draining_clears_the_slot() {
        update(Command::Forward {
            left: 3000,
            right: 3000,
        });
        // an unconsumed command is overwritten, not queued behind
        update(Command::Stop);
        assert_eq!(try_take(), Some(Command::Stop));
        assert_eq!(try_take(), None);
    }
}
