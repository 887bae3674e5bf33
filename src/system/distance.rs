//! Shared distance readings
//!
//! Publishes the filtered IR distances from the sampling task to the
//! rest of the system. A watch gives snapshot semantics: the sampling
//! task is the single writer, navigation and display each hold their
//! own receiver and wake when a new reading lands. Every publication is
//! also the "new sample ready" notification.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{DynReceiver, Watch};

/// Number of tasks consuming distance readings (navigation, display)
const CONSUMERS: usize = 2;

/// Latest filtered distances, single writer (sampling task)
static DISTANCES: Watch<CriticalSectionRawMutex, DistanceReading, CONSUMERS> = Watch::new();

/// Publishes a fresh reading and wakes all receivers
pub fn publish(reading: DistanceReading) {
    DISTANCES.sender().send(reading);
}

/// Claims a receiver for distance updates
///
/// Panics if more than [`CONSUMERS`] tasks try to subscribe.
pub fn receiver() -> DynReceiver<'static, DistanceReading> {
    DISTANCES.dyn_receiver().unwrap()
}

/// One filtered distance snapshot for all three sensors
#[derive(Debug, Clone, Copy, Format)]
pub struct DistanceReading {
    /// Right sensor distance (mm)
    pub right: u32,
    /// Center sensor distance (mm)
    pub center: u32,
    /// Left sensor distance (mm)
    pub left: u32,
}

impl DistanceReading {
    /// Smallest of the three distances
    pub fn min(&self) -> u32 {
        self.right.min(self.center).min(self.left)
    }
}
