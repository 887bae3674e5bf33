//! IR distance filtering and calibration
//!
//! Software low-pass filter bank for the three Sharp GP2Y0A21YK0F range
//! sensors, plus the empirical calibration that turns a filtered ADC
//! sample into a distance in millimeters.
//!
//! # Filter operation
//! Each channel keeps a ring buffer and a running sum. Every update
//! writes the newest sample over the *two* oldest slots, so the newest
//! sample carries double weight compared to a plain sliding average.
//! The sum is adjusted incrementally, keeping the update O(1) no matter
//! how deep the filter is - it runs inside the 10 ms sampling budget.
//!
//! # Calibration
//! `distance = ((inv_slope / (adc + intercept)) - cal_const) * 10`
//! The constants come from a line of best fit over physical measurements
//! against raw samples. Useful output range is 100-800 mm; values outside
//! that range are left to the caller to interpret.

use defmt::Format;

/// Memory budget for all filter buffers combined, in bytes
const FILTER_MEMORY_BUDGET: usize = 4096;

/// Deepest filter that fits the budget across all channels
pub const MAX_FILTER_DEPTH: usize =
    FILTER_MEMORY_BUDGET / CHANNEL_COUNT / core::mem::size_of::<u32>();

/// Number of IR sensor channels on the robot
pub const CHANNEL_COUNT: usize = 3;

/// One IR sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Channel {
    Right,
    Center,
    Left,
}

impl Channel {
    /// All channels, in ADC scan order
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Right, Channel::Center, Channel::Left];

    fn index(self) -> usize {
        match self {
            Channel::Right => 0,
            Channel::Center => 1,
            Channel::Left => 2,
        }
    }
}

/// Calibration constants for the IR sensors
///
/// Derived offline by linear regression against physical measurements.
/// Any change to ADC precision needs all three recalculated.
#[derive(Debug, Clone, Copy)]
pub struct IrCalibration {
    /// 1/m value of the fitted line
    pub inv_slope: f32,
    /// b/m value of the fitted line
    pub intercept: f32,
    /// k value, adjust to tweak accuracy
    pub cal_const: f32,
}

impl IrCalibration {
    /// Constants fitted for the GP2Y0A21YK0F at 14-bit ADC precision
    pub const GP2Y0A21YK0F: IrCalibration = IrCalibration {
        inv_slope: 126_716.5,
        intercept: 575.6511,
        cal_const: 0.91,
    };

    /// Converts a filtered ADC sample into a distance in millimeters.
    ///
    /// Decimal values are truncated. Useful range of the result is
    /// 100-800 mm; no clamping is done here.
    pub fn convert(&self, filtered: u32) -> u32 {
        ((self.inv_slope / (filtered as f32 + self.intercept) - self.cal_const) * 10.0) as u32
    }
}

/// Low-pass filter state for a single channel
struct ChannelFilter {
    buffer: [u32; MAX_FILTER_DEPTH],
    rolling_sum: u32,
    cursor: usize,
}

/// Rolling-average filter bank for all IR channels
///
/// Buffers are pre-sized at compile time; only the first `len` slots of
/// each are in use. Invariant: `rolling_sum` equals the sum of those
/// slots at all times.
pub struct FilterBank {
    channels: [ChannelFilter; CHANNEL_COUNT],
    len: usize,
}

impl FilterBank {
    /// Creates a filter bank with one ring buffer per channel, each
    /// prefilled with that channel's initial sample so the running sum
    /// is correct from the first update.
    ///
    /// `requested_len` is capped at [`MAX_FILTER_DEPTH`]; a request that
    /// would not fit the memory budget shrinks to the largest depth that
    /// does. The effective depth is never below 2, since each update
    /// replaces two slots.
    pub fn new(requested_len: usize, initial_samples: [u32; CHANNEL_COUNT]) -> Self {
        let len = requested_len.clamp(2, MAX_FILTER_DEPTH);
        let channels = initial_samples.map(|sample| ChannelFilter {
            buffer: [sample; MAX_FILTER_DEPTH],
            rolling_sum: sample * len as u32,
            cursor: 0,
        });
        Self { channels, len }
    }

    /// Effective filter depth after applying the memory budget
    pub fn depth(&self) -> usize {
        self.len
    }

    /// Pushes a raw sample through the channel's filter and returns the
    /// buffer average (truncating division).
    ///
    /// The sample is written over the two oldest slots and the cursor
    /// advances by two, wrapping at the effective depth.
    pub fn update(&mut self, channel: Channel, raw: u32) -> u32 {
        let len = self.len;
        let current = &mut self.channels[channel.index()];
        let oldest = current.cursor;
        let second = (current.cursor + 1) % len;
        current.rolling_sum += 2 * raw;
        current.rolling_sum -= current.buffer[oldest];
        current.rolling_sum -= current.buffer[second];
        current.buffer[oldest] = raw;
        current.buffer[second] = raw;
        current.cursor = (current.cursor + 2) % len;
        current.rolling_sum / len as u32
    }

    #[cfg(test)]
    fn buffer_sum(&self, channel: Channel) -> u32 {
        self.channels[channel.index()].buffer[..self.len].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefill_makes_sum_correct_from_the_start() {
        let bank = FilterBank::new(8, [100, 200, 300]);
        assert_eq!(bank.buffer_sum(Channel::Right), 800);
        assert_eq!(bank.buffer_sum(Channel::Center), 1600);
        assert_eq!(bank.buffer_sum(Channel::Left), 2400);
    }

    #[test]
    fn rolling_sum_matches_buffer_after_every_update() {
        let mut bank = FilterBank::new(7, [500, 500, 500]);
        let samples = [817, 4, 9999, 0, 12345, 61, 61, 16383, 2, 700, 700, 3];
        for &s in &samples {
            bank.update(Channel::Center, s);
            assert_eq!(
                bank.channels[Channel::Center.index()].rolling_sum,
                bank.buffer_sum(Channel::Center)
            );
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut bank = FilterBank::new(4, [100, 100, 100]);
        bank.update(Channel::Right, 9000);
        assert_eq!(bank.buffer_sum(Channel::Center), 400);
        assert_eq!(bank.buffer_sum(Channel::Left), 400);
    }

    #[test]
    fn constant_input_converges_within_half_depth_updates() {
        let len = 16;
        let mut bank = FilterBank::new(len, [0, 0, 0]);
        let mut out = 0;
        for _ in 0..len / 2 {
            out = bank.update(Channel::Left, 4242);
        }
        // two slots change per update, so len/2 updates fill the buffer
        assert_eq!(out, 4242);
    }

    #[test]
    fn newest_sample_is_double_weighted() {
        let mut bank = FilterBank::new(4, [0, 0, 0]);
        // one update of a 4-deep buffer leaves [100, 100, 0, 0]
        assert_eq!(bank.update(Channel::Right, 100), 50);
    }

    #[test]
    fn oversized_request_shrinks_to_budget() {
        let bank = FilterBank::new(MAX_FILTER_DEPTH * 4, [1, 1, 1]);
        assert_eq!(bank.depth(), MAX_FILTER_DEPTH);
    }

    #[test]
    fn undersized_request_is_raised_to_two_slots() {
        let bank = FilterBank::new(0, [1, 1, 1]);
        assert_eq!(bank.depth(), 2);
    }

    #[test]
    fn convert_is_monotonically_decreasing_over_the_sensor_range() {
        // ADC values spanning the 100-800 mm useful range; the stride is
        // wide enough that truncation cannot flatten a step
        let cal = IrCalibration::GP2Y0A21YK0F;
        let mut previous = cal.convert(900);
        for adc in (1300..11100).step_by(400) {
            let distance = cal.convert(adc);
            assert!(
                distance < previous,
                "distance must shrink as the ADC value grows"
            );
            previous = distance;
        }
    }

    #[test]
    fn convert_matches_known_calibration_points() {
        let cal = IrCalibration::GP2Y0A21YK0F;
        // ((126716.5 / (1000 + 575.6511)) - 0.91) * 10, truncated
        assert_eq!(cal.convert(1000), 795);
    }

    #[test]
    fn close_objects_convert_below_the_reversal_threshold() {
        use crate::system::navigation::STOP_DISTANCE_MM;

        let cal = IrCalibration::GP2Y0A21YK0F;
        // a saturated 12-bit ADC reading, scaled to the 14-bit range
        // the constants were fitted for - the closest possible object
        // must register as a hazard
        let saturated = 4095 << 2;
        assert!(cal.convert(saturated) < STOP_DISTANCE_MM);
        // without the scaling the hazard would be unreachable
        assert!(cal.convert(4095) > STOP_DISTANCE_MM);
    }
}
