//! Hardware Resource Management
//!
//! Manages and allocates hardware resources (pins, peripherals) to different
//! system components. This module ensures safe and organized access to the
//! robot's hardware by:
//! - Defining clear ownership of hardware resources
//! - Preventing conflicts in hardware access
//! - Providing safe concurrent access to shared resources (e.g., ADC)
//!
//! # Resource Groups
//! - IR Sensors: three Sharp analog range sensors on the ADC pins
//! - Bump Switches: six collision switches across the front of the robot
//! - Motor Control: dual motor driver pins and PWM channels
//! - LCD: SPI bus and control pins for the Nokia 5110 status display
//!
//! # Shared Resources
//! The ADC is shared and protected by a mutex to ensure safe concurrent
//! access. Tasks must acquire the mutex lock before performing ADC
//! operations and release it promptly after.

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::adc::{Adc, Async as AdcAsync};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, ADC};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

/// Global ADC (Analog-to-Digital Converter) instance protected by a mutex.
///
/// The mutex ensures safe concurrent access from multiple tasks that need to
/// read analog values. Only one task can access the ADC at a time, preventing
/// conflicts in hardware access.
static ADC: Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> = Mutex::new(None);

/// Initializes the ADC peripheral.
///
/// This should only be called once during system initialization in main.rs,
/// before any tasks are spawned.
pub fn init_adc(adc: ADC) {
    let adc = Adc::new(adc, Irqs, embassy_rp::adc::Config::default());
    critical_section::with(|_| {
        *ADC.try_lock().unwrap() = Some(adc);
    });
}

/// Returns a reference to the protected ADC instance.
///
/// The returned mutex ensures safe concurrent access to the ADC peripheral.
/// Tasks should acquire the mutex lock, perform their ADC operations,
/// and release the lock as quickly as possible.
pub fn get_adc() -> &'static Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> {
    &ADC
}

assign_resources! {
    /// Sharp GP2Y0A21YK0F IR range sensors - analog outputs
    ir_sensors: IrSensorResources {
        right_pin: PIN_26,
        center_pin: PIN_27,
        left_pin: PIN_28,
    },
    /// Bump switches, numbered right to left across the front,
    /// active-low with internal pull-ups
    bump_switches: BumpSwitchResources {
        bump0_pin: PIN_8,
        bump1_pin: PIN_9,
        bump2_pin: PIN_10,
        bump3_pin: PIN_11,
        bump4_pin: PIN_12,
        bump5_pin: PIN_13,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE2,
        left_pwm_pin: PIN_4,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE7,
        right_pwm_pin: PIN_15,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
    /// Nokia 5110 LCD on SPI0 plus data/command, reset and chip select
    lcd: LcdResources {
        spi: SPI0,
        clk_pin: PIN_2,
        mosi_pin: PIN_3,
        cs_pin: PIN_5,
        dc_pin: PIN_6,
        reset_pin: PIN_7,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});
