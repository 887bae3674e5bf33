//! Rover firmware entry point
//!
//! Initializes the system and spawns the control tasks. The bump
//! monitor runs on its own interrupt-mode executor at elevated
//! priority: a collision must preempt sampling, navigation and
//! rendering, which all run on the thread-mode executor.

#![no_std]
#![no_main]

use crate::task::{
    bump_monitor::bump_monitor, display_status::display_status, drive::drive, navigate::navigate,
    sample_ir::sample_ir,
};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use system::resources::{
    self, AssignedResources, BumpSwitchResources, IrSensorResources, LcdResources,
    MotorDriverResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// High-priority executor for collision handling
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Initialize the global ADC instance before spawning any tasks.
    // This initialization must happen here to ensure:
    // 1. The ADC is ready before the sampling task needs it
    // 2. We only initialize once, as multiple initializations could corrupt the hardware state
    // 3. No race conditions can occur since this happens before any tasks are spawned
    resources::init_adc(p.ADC);

    // Split the resources into separate groups for each task, for all the resources that we do not share between tasks.
    let r = split_resources!(p);

    // Collision handling gets its own executor ahead of everything else
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(bump_monitor(r.bump_switches)).unwrap();

    // Spawn drive first so it is ready to consume motor commands
    spawner.spawn(drive(r.motor_driver)).unwrap();
    spawner.spawn(navigate()).unwrap();
    spawner.spawn(sample_ir(r.ir_sensors)).unwrap();
    spawner.spawn(display_status(r.lcd)).unwrap();
}
