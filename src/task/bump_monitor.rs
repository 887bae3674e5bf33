//! Bump switch collision monitor
//!
//! Watches the six bump switches across the front of the robot and
//! reacts to physical contact. Runs on the high-priority interrupt
//! executor so a collision preempts sampling and navigation.
//!
//! The switches are wired active-low with internal pull-ups; a falling
//! edge is a hit. The handler body stays minimal: stop the motors,
//! capture the switch state, signal the event. Recovery (reversing out)
//! belongs to the navigation task.

use crate::system::collision::{self, CollisionEvent};
use crate::system::drive_command::{self, Command};
use crate::system::resources::BumpSwitchResources;
use defmt::info;
use embassy_futures::select::select_array;
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Timer};

/// Settle time before re-arming the edge waits, to ride out switch bounce
const REARM_DELAY: Duration = Duration::from_millis(50);

/// Reads all six switches as a positive-logic bitmask.
/// Bit 0 is the rightmost switch, bit 5 the leftmost.
fn read_mask(switches: &[Input<'static>; 6]) -> u8 {
    switches
        .iter()
        .enumerate()
        .fold(0, |mask, (bit, switch)| {
            mask | (u8::from(switch.is_low()) << bit)
        })
}

/// Collision monitoring task
#[embassy_executor::task]
pub async fn bump_monitor(r: BumpSwitchResources) {
    let mut switches = [
        Input::new(r.bump0_pin, Pull::Up),
        Input::new(r.bump1_pin, Pull::Up),
        Input::new(r.bump2_pin, Pull::Up),
        Input::new(r.bump3_pin, Pull::Up),
        Input::new(r.bump4_pin, Pull::Up),
        Input::new(r.bump5_pin, Pull::Up),
    ];

    loop {
        // wait for a falling edge on any switch; the futures drop here
        // so the switches can be read again below
        let edges = switches.each_mut().map(|switch| switch.wait_for_falling_edge());
        select_array(edges).await;

        // motors off before anything else
        drive_command::update(Command::Stop);

        let bump_mask = read_mask(&switches);
        collision::report(CollisionEvent { bump_mask });
        info!("collision, bump mask {:06b}", bump_mask);

        Timer::after(REARM_DELAY).await;
    }
}
