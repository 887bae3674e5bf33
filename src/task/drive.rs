//! Drive Task Module
//!
//! This module implements the drive control task that manages motor
//! operations. It consumes the motion commands issued by the navigation
//! and collision tasks and applies them to a TB6612FNG motor driver,
//! converting per-wheel duty counts to the driver's percent scale.

use crate::system::drive_command::{self, Command, MOTOR_PWM_PERIOD};
use crate::system::resources::MotorDriverResources;
use defmt::info;
use embassy_rp::gpio;
use embassy_rp::pwm;
use embassy_time::{Duration, Timer};
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

/// Converts a PWM duty count into the driver's 0-100 percent scale,
/// clamping at the period bound
fn duty_to_percent(duty: u16) -> u8 {
    let duty = duty.min(MOTOR_PWM_PERIOD);
    (u32::from(duty) * 100 / u32::from(MOTOR_PWM_PERIOD)) as u8
}

/// Signed target speeds for both wheels, percent scale
fn wheel_targets(command: Command) -> (i8, i8) {
    match command {
        Command::Forward { left, right } => {
            (duty_to_percent(left) as i8, duty_to_percent(right) as i8)
        }
        Command::Backward { left, right } => {
            (-(duty_to_percent(left) as i8), -(duty_to_percent(right) as i8))
        }
        // turns are differential: both wheels forward, one side faster
        Command::TurnLeft { left, right } | Command::TurnRight { left, right } => {
            (duty_to_percent(left) as i8, duty_to_percent(right) as i8)
        }
        Command::Stop => (0, 0),
    }
}

#[embassy_executor::task]
pub async fn drive(r: MotorDriverResources) {
    // Configure PWM for motor control
    // We use 10kHz frequency as cheaper DC motors often work better at lower frequencies
    let desired_freq_hz = 10_000;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    // Configure PWM
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // Initialize TB6612FNG motor driver pins
    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // motor A, here defined to be the left motor
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // motor B, here defined to be the right motor
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config.clone());
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    // Create motor driver controller instance
    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();

    loop {
        let mut command = drive_command::wait().await;

        // The settle delays below can hide a command that arrives while
        // they run. Drain the signal after each one so the newest
        // request wins - a collision stop above all.
        loop {
            let is_standby = control.current_standby().unwrap();

            // Wake up from standby if movement is requested
            if is_standby && command != Command::Stop {
                control.disable_standby().unwrap();
                Timer::after(Duration::from_millis(100)).await;
                if let Some(newer) = drive_command::try_take() {
                    command = newer;
                    continue;
                }
            }

            if command == Command::Stop {
                info!("drive stop");
                control.motor_a.drive(DriveCommand::Brake).unwrap();
                control.motor_b.drive(DriveCommand::Brake).unwrap();
                break;
            }

            let (left_target, right_target) = wheel_targets(command);
            let left_speed = control.motor_a.current_speed();
            let right_speed = control.motor_b.current_speed();

            // Brake briefly before a direction flip to spare the gearboxes,
            // as the original stop-then-reverse sequence did
            let flips =
                |current: i8, target: i8| current != 0 && target != 0 && (current < 0) != (target < 0);
            if flips(left_speed, left_target) || flips(right_speed, right_target) {
                info!("in conflicting motion, stopping first");
                control.motor_a.drive(DriveCommand::Brake).unwrap();
                control.motor_b.drive(DriveCommand::Brake).unwrap();
                Timer::after(Duration::from_millis(20)).await;
                if let Some(newer) = drive_command::try_take() {
                    command = newer;
                    continue;
                }
            }

            info!("drive L:{} R:{}", left_target, right_target);
            for (motor, target) in [
                (&mut control.motor_a, left_target),
                (&mut control.motor_b, right_target),
            ] {
                let drive = if target > 0 {
                    DriveCommand::Forward(target as u8)
                } else if target < 0 {
                    DriveCommand::Backward(-target as u8)
                } else {
                    DriveCommand::Stop
                };
                motor.drive(drive).unwrap();
            }
            break;
        }
    }
}
