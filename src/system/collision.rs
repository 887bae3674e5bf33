//! Collision event signaling
//!
//! Carries bump-switch hits from the collision monitor to the
//! navigation task. A signal holds at most one pending event; a second
//! hit before the first is handled overwrites it, which is fine - the
//! reaction (stop and reverse) is the same either way. `try_take` makes
//! the check-and-clear atomic, so an event can never be discarded
//! unobserved.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Pending collision event, written by the bump monitor only
static COLLISION: Signal<CriticalSectionRawMutex, CollisionEvent> = Signal::new();

/// Reports a collision, overwriting any still-pending event
pub fn report(event: CollisionEvent) {
    COLLISION.signal(event);
}

/// Takes the pending collision event, if any, clearing it
pub fn try_take() -> Option<CollisionEvent> {
    COLLISION.try_take()
}

/// A captured bump-switch hit
#[derive(Debug, Clone, Copy, Format)]
pub struct CollisionEvent {
    /// Positive-logic switch state at the moment of impact.
    /// Bit 0 is the rightmost switch, bit 5 the leftmost.
    pub bump_mask: u8,
}
