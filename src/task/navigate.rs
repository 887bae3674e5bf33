//! Navigation task
//!
//! The robot's control loop. Waits for each fresh distance reading,
//! folds in any pending collision event, runs the decision policy and
//! forwards the motor command it emits. Collision handling is evaluated
//! before clearance steering on every cycle.

use crate::system::collision;
use crate::system::distance;
use crate::system::drive_command;
use crate::system::navigation::NavPolicy;
use defmt::info;

#[embassy_executor::task]
pub async fn navigate() {
    let mut receiver = distance::receiver();
    let mut policy = NavPolicy::new();

    // start off at cruise speed; the policy takes over from the first sample
    drive_command::update(NavPolicy::initial_command());
    info!("navigation started");

    loop {
        let reading = receiver.changed().await;

        // taking the event is atomic, so a collision landing after this
        // point stays pending for the next cycle instead of being lost
        let collision_event = collision::try_take();
        if let Some(event) = &collision_event {
            info!("handling collision, bump mask {:06b}", event.bump_mask);
        }

        if let Some(command) = policy.on_sample(&reading, collision_event.is_some()) {
            info!("nav -> {}: {}", policy.state(), command);
            drive_command::update(command);
        }
    }
}
