//! Status display rendering
//!
//! Renders the three filtered distances on the Nokia 5110 LCD. Updates
//! are decimated to every 60th sample (about 600 ms at the 10 ms
//! sampling period) so the display never competes with the control
//! loop. Rendering is pure output: any display failure is logged and
//! dropped, never propagated.

use crate::system::display::{DisplayError, Lcd};
use crate::system::distance::{self, DistanceReading};
use crate::system::resources::LcdResources;
use defmt::{info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};

/// Render every Nth distance sample
const DISPLAY_DECIMATION: u32 = 60;

/// Pixel column where the distance values start
const DATA_X: u8 = 45;

/// Pixel width reserved for a distance value (up to four digits)
const DATA_WIDTH: u8 = 20;

/// Text rows for the right, center and left readouts
const DATA_ROWS: [u8; 3] = [0, 2, 4];

/// Gate for the debug readout; the robot drives fine without it
const DEBUG_MODE: bool = true;

/// Draws the static labels once at startup
fn draw_labels(lcd: &mut Lcd) -> Result<(), DisplayError> {
    for (row, label) in [(0, "Right: "), (2, "Center: "), (4, "Left: ")] {
        lcd.set_cursor(5, row)?;
        lcd.write_str(label)?;
        lcd.set_cursor(65, row)?;
        lcd.write_str(" mm")?;
    }
    Ok(())
}

/// Clears the value regions and writes the current distances
fn draw_distances(lcd: &mut Lcd, reading: &DistanceReading) -> Result<(), DisplayError> {
    let values = [reading.right, reading.center, reading.left];
    for (row, value) in DATA_ROWS.into_iter().zip(values) {
        lcd.clear_region(DATA_X, DATA_X + DATA_WIDTH, row, row)?;
        lcd.set_cursor(DATA_X, row)?;
        lcd.write_uint(value)?;
    }
    Ok(())
}

/// Display task: throttled debug readout of the IR distances
#[embassy_executor::task]
pub async fn display_status(r: LcdResources) {
    let mut config = spi::Config::default();
    config.frequency = 4_000_000; // PCD8544 tops out at 4 MHz

    let spi = Spi::new_blocking_txonly(r.spi, r.clk_pin, r.mosi_pin, config);
    let dc = Output::new(r.dc_pin, Level::Low);
    let reset = Output::new(r.reset_pin, Level::High);
    let cs = Output::new(r.cs_pin, Level::High);
    let mut lcd = Lcd::new(spi, dc, reset, cs);

    if let Err(e) = lcd.init().await {
        warn!("LCD init failed: {}, display disabled", e);
        return;
    }
    if let Err(e) = draw_labels(&mut lcd) {
        warn!("LCD label draw failed: {}", e);
    }
    info!("status display started");

    let mut receiver = distance::receiver();
    let mut sample_count = 0u32;
    loop {
        let reading = receiver.changed().await;
        sample_count += 1;
        if sample_count < DISPLAY_DECIMATION || !DEBUG_MODE {
            continue;
        }
        sample_count = 0;

        if let Err(e) = draw_distances(&mut lcd, &reading) {
            warn!("distance render failed: {}", e);
        }
    }
}
