//! Periodic IR sampling
//!
//! Acquires one raw ADC sample per IR channel every sampling period,
//! runs each through the low-pass filter bank, converts the results to
//! millimeter distances and publishes a fresh snapshot. Each
//! publication is the "sample ready" event the navigation and display
//! tasks wake on.
//!
//! A hardware-fault timeout bounds the ADC wait: a wedged conversion
//! costs one dropped sample cycle and an error log instead of hanging
//! the robot.

use crate::system::distance::{self, DistanceReading};
use crate::system::filter::{Channel, FilterBank, IrCalibration, CHANNEL_COUNT};
use crate::system::resources::{get_adc, IrSensorResources};
use defmt::{error, info, warn, Format};
use embassy_rp::adc::Channel as AdcChannel;
use embassy_rp::gpio::Pull;
use embassy_time::{with_timeout, Duration, Instant, Ticker, Timer};

/// Time between sensor acquisitions
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(10);

/// Filter depth to request; deeper is smoother but slower to react
const FILTER_DEPTH: usize = 64;

/// Bound on a single ADC conversion before declaring a hardware fault
const ADC_TIMEOUT: Duration = Duration::from_millis(2);

/// The on-chip ADC is 12-bit but the calibration constants are fitted
/// for 14-bit samples; raw readings are scaled up to match before they
/// enter the filter. Without this, no reading could ever convert to a
/// distance below the reversal threshold.
const ADC_SCALE_SHIFT: u32 = 2;

/// Why a sample cycle produced no reading
#[derive(Debug, Clone, Copy, Format)]
enum SampleError {
    /// Conversion hardware reported an error
    Conversion,
    /// Conversion did not finish within [`ADC_TIMEOUT`]
    HardwareFault,
}

/// Reads all three channels in sensor scan order (right, center, left).
///
/// Holds the ADC lock only for the duration of the reads.
async fn sample_all(
    channels: &mut [AdcChannel<'static>; CHANNEL_COUNT],
) -> Result<[u32; CHANNEL_COUNT], SampleError> {
    let mut adc_guard = get_adc().lock().await;
    let adc = adc_guard.as_mut().unwrap();

    let mut raw = [0u32; CHANNEL_COUNT];
    for (value, channel) in raw.iter_mut().zip(channels.iter_mut()) {
        match with_timeout(ADC_TIMEOUT, adc.read(channel)).await {
            Ok(Ok(sample)) => *value = u32::from(sample) << ADC_SCALE_SHIFT,
            Ok(Err(_)) => return Err(SampleError::Conversion),
            Err(_) => return Err(SampleError::HardwareFault),
        }
    }
    Ok(raw)
}

/// Sampling task: filters raw IR data into distances on a fixed cadence
#[embassy_executor::task]
pub async fn sample_ir(r: IrSensorResources) {
    let mut channels = [
        AdcChannel::new_pin(r.right_pin, Pull::None),
        AdcChannel::new_pin(r.center_pin, Pull::None),
        AdcChannel::new_pin(r.left_pin, Pull::None),
    ];

    // let the sensors power up before trusting their output
    Timer::after(Duration::from_millis(100)).await;

    // prefill the filters with the first good sample set so the rolling
    // sums are valid from the very first update
    let initial = loop {
        match sample_all(&mut channels).await {
            Ok(raw) => break raw,
            Err(e) => {
                error!("initial IR sample failed: {}", e);
                Timer::after(SAMPLE_PERIOD).await;
            }
        }
    };
    let mut bank = FilterBank::new(FILTER_DEPTH, initial);
    let calibration = IrCalibration::GP2Y0A21YK0F;
    info!("IR sampling started, filter depth {}", bank.depth());

    let mut ticker = Ticker::every(SAMPLE_PERIOD);
    loop {
        ticker.next().await;
        let started = Instant::now();

        let raw = match sample_all(&mut channels).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("IR sample cycle dropped: {}", e);
                continue;
            }
        };

        let mut mm = [0u32; CHANNEL_COUNT];
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            mm[i] = calibration.convert(bank.update(channel, raw[i]));
        }
        distance::publish(DistanceReading {
            right: mm[0],
            center: mm[1],
            left: mm[2],
        });

        if started.elapsed() > SAMPLE_PERIOD {
            warn!("sample cycle overran the sampling period, samples dropped");
        }
    }
}
