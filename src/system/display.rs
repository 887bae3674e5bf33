//! Nokia 5110 LCD driver
//!
//! Device driver for the PCD8544-based 84x48 LCD on the rear of the
//! robot, used to display debug data. Communication is 4-wire SPI plus
//! a data/command select pin and a reset pin. Text is addressed as 6
//! rows of 8-pixel-high characters across 84 pixel columns.
//!
//! All positioning and region operations validate their coordinates
//! before any bus traffic and report [`DisplayError::OutOfBounds`] on
//! bad input - a display problem is never allowed to take down the
//! control loop.

use defmt::Format;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, Timer};

/// Character width in pixels
const CHAR_WIDTH: usize = 5;

/// Rightmost addressable pixel column
pub const MAX_COLUMN: u8 = 83;

/// Bottom text row
pub const MAX_ROW: u8 = 5;

// PCD8544 configuration commands
const FUNC_EXT: u8 = 0x21; // active chip, horizontal addressing, extended instructions
const TEMP_COEFF0: u8 = 0x04;
const BIAS_1_48: u8 = 0x13; // mux rate 1:48
const CONTRAST_LVL: u8 = 0xB7; // valid range 0xA0..=0xCF
const FUNC_BASIC: u8 = 0x20;
const DISP_NORM: u8 = 0x0C;
const SET_X_ADDR: u8 = 0x80;
const SET_Y_ADDR: u8 = 0x40;

/// Display operation failures, reported to the caller and never fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum DisplayError {
    /// Coordinates outside the 84x6 text grid, or an inverted region
    OutOfBounds,
    /// SPI transfer failed
    Bus,
}

/// Checks a cursor position against the text grid
fn cursor_in_bounds(column: u8, row: u8) -> bool {
    column <= MAX_COLUMN && row <= MAX_ROW
}

/// Checks a clear region: both corners in bounds and not inverted.
/// End coordinates are inclusive.
fn region_in_bounds(x_start: u8, x_end: u8, y_start: u8, y_end: u8) -> bool {
    cursor_in_bounds(x_start, y_start)
        && cursor_in_bounds(x_end, y_end)
        && x_start <= x_end
        && y_start <= y_end
}

/// PCD8544 LCD over blocking SPI
pub struct Lcd {
    spi: Spi<'static, SPI0, Blocking>,
    dc: Output<'static>,
    reset: Output<'static>,
    cs: Output<'static>,
}

impl Lcd {
    pub fn new(
        spi: Spi<'static, SPI0, Blocking>,
        dc: Output<'static>,
        reset: Output<'static>,
        cs: Output<'static>,
    ) -> Self {
        Self {
            spi,
            dc,
            reset,
            cs,
        }
    }

    /// Applies the power-on reset pulse and configures the controller.
    ///
    /// The datasheet wants the reset pulse within 30 ms of power-on, so
    /// call this before anything else. Leaves the cursor at the origin
    /// with a cleared screen.
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.reset.set_low();
        Timer::after(Duration::from_millis(1)).await;
        self.reset.set_high();

        self.send_command(FUNC_EXT)?;
        self.send_command(TEMP_COEFF0)?;
        self.send_command(BIAS_1_48)?;
        self.send_command(CONTRAST_LVL)?;
        self.send_command(FUNC_BASIC)?;
        self.send_command(DISP_NORM)?;
        self.set_cursor(0, 0)?;
        self.clear_all()
    }

    /// Moves the cursor to a pixel column and text row
    pub fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), DisplayError> {
        if !cursor_in_bounds(column, row) {
            return Err(DisplayError::OutOfBounds);
        }
        self.send_command(SET_X_ADDR | column)?;
        self.send_command(SET_Y_ADDR | row)
    }

    /// Draws one character at the cursor, advancing it by five columns
    pub fn write_char(&mut self, chr: char) -> Result<(), DisplayError> {
        // anything outside the table renders as '?'
        let glyph = match chr {
            ' '..='\x7f' => &ASCII[chr as usize - 0x20],
            _ => &ASCII['?' as usize - 0x20],
        };
        self.send_data(glyph)
    }

    /// Draws a string at the cursor
    pub fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for chr in text.chars() {
            self.write_char(chr)?;
        }
        Ok(())
    }

    /// Draws an unsigned integer as decimal text at the cursor
    pub fn write_uint(&mut self, mut num: u32) -> Result<(), DisplayError> {
        // u32 is at most ten digits; fill from the back
        let mut digits = [0u8; 10];
        let mut start = digits.len();
        loop {
            start -= 1;
            digits[start] = b'0' + (num % 10) as u8;
            num /= 10;
            if num == 0 {
                break;
            }
        }
        for &digit in &digits[start..] {
            self.write_char(digit as char)?;
        }
        Ok(())
    }

    /// Clears the whole screen
    pub fn clear_all(&mut self) -> Result<(), DisplayError> {
        self.set_cursor(0, 0)?;
        for _ in 0..=MAX_ROW {
            for _ in 0..=MAX_COLUMN {
                self.send_data(&[0x00])?;
            }
        }
        Ok(())
    }

    /// Clears a rectangular section of the screen.
    ///
    /// Coordinates are inclusive: pixel columns `x_start..=x_end` on
    /// text rows `y_start..=y_end`. Invalid or inverted regions are
    /// rejected before any bus traffic.
    pub fn clear_region(
        &mut self,
        x_start: u8,
        x_end: u8,
        y_start: u8,
        y_end: u8,
    ) -> Result<(), DisplayError> {
        if !region_in_bounds(x_start, x_end, y_start, y_end) {
            return Err(DisplayError::OutOfBounds);
        }
        for row in y_start..=y_end {
            self.set_cursor(x_start, row)?;
            for _ in x_start..=x_end {
                self.send_data(&[0x00])?;
            }
        }
        Ok(())
    }

    fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.dc.set_low();
        self.transfer(&[cmd])
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high();
        self.transfer(data)
    }

    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low();
        let result = self.spi.blocking_write(bytes);
        self.cs.set_high();
        result.map_err(|_| DisplayError::Bus)
    }
}

/// 5x8 pixel font, indexed by ASCII value minus 0x20
static ASCII: [[u8; CHAR_WIDTH]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // 20 space
    [0x00, 0x00, 0x5f, 0x00, 0x00], // 21 !
    [0x00, 0x07, 0x00, 0x07, 0x00], // 22 "
    [0x14, 0x7f, 0x14, 0x7f, 0x14], // 23 #
    [0x24, 0x2a, 0x7f, 0x2a, 0x12], // 24 $
    [0x23, 0x13, 0x08, 0x64, 0x62], // 25 %
    [0x36, 0x49, 0x55, 0x22, 0x50], // 26 &
    [0x00, 0x05, 0x03, 0x00, 0x00], // 27 '
    [0x00, 0x1c, 0x22, 0x41, 0x00], // 28 (
    [0x00, 0x41, 0x22, 0x1c, 0x00], // 29 )
    [0x14, 0x08, 0x3e, 0x08, 0x14], // 2a *
    [0x08, 0x08, 0x3e, 0x08, 0x08], // 2b +
    [0x00, 0x50, 0x30, 0x00, 0x00], // 2c ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // 2d -
    [0x00, 0x60, 0x60, 0x00, 0x00], // 2e .
    [0x20, 0x10, 0x08, 0x04, 0x02], // 2f /
    [0x3e, 0x51, 0x49, 0x45, 0x3e], // 30 0
    [0x00, 0x42, 0x7f, 0x40, 0x00], // 31 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 32 2
    [0x21, 0x41, 0x45, 0x4b, 0x31], // 33 3
    [0x18, 0x14, 0x12, 0x7f, 0x10], // 34 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 35 5
    [0x3c, 0x4a, 0x49, 0x49, 0x30], // 36 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 37 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 38 8
    [0x06, 0x49, 0x49, 0x29, 0x1e], // 39 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // 3a :
    [0x00, 0x56, 0x36, 0x00, 0x00], // 3b ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // 3c <
    [0x14, 0x14, 0x14, 0x14, 0x14], // 3d =
    [0x00, 0x41, 0x22, 0x14, 0x08], // 3e >
    [0x02, 0x01, 0x51, 0x09, 0x06], // 3f ?
    [0x32, 0x49, 0x79, 0x41, 0x3e], // 40 @
    [0x7e, 0x11, 0x11, 0x11, 0x7e], // 41 A
    [0x7f, 0x49, 0x49, 0x49, 0x36], // 42 B
    [0x3e, 0x41, 0x41, 0x41, 0x22], // 43 C
    [0x7f, 0x41, 0x41, 0x22, 0x1c], // 44 D
    [0x7f, 0x49, 0x49, 0x49, 0x41], // 45 E
    [0x7f, 0x09, 0x09, 0x09, 0x01], // 46 F
    [0x3e, 0x41, 0x49, 0x49, 0x7a], // 47 G
    [0x7f, 0x08, 0x08, 0x08, 0x7f], // 48 H
    [0x00, 0x41, 0x7f, 0x41, 0x00], // 49 I
    [0x20, 0x40, 0x41, 0x3f, 0x01], // 4a J
    [0x7f, 0x08, 0x14, 0x22, 0x41], // 4b K
    [0x7f, 0x40, 0x40, 0x40, 0x40], // 4c L
    [0x7f, 0x02, 0x0c, 0x02, 0x7f], // 4d M
    [0x7f, 0x04, 0x08, 0x10, 0x7f], // 4e N
    [0x3e, 0x41, 0x41, 0x41, 0x3e], // 4f O
    [0x7f, 0x09, 0x09, 0x09, 0x06], // 50 P
    [0x3e, 0x41, 0x51, 0x21, 0x5e], // 51 Q
    [0x7f, 0x09, 0x19, 0x29, 0x46], // 52 R
    [0x46, 0x49, 0x49, 0x49, 0x31], // 53 S
    [0x01, 0x01, 0x7f, 0x01, 0x01], // 54 T
    [0x3f, 0x40, 0x40, 0x40, 0x3f], // 55 U
    [0x1f, 0x20, 0x40, 0x20, 0x1f], // 56 V
    [0x3f, 0x40, 0x38, 0x40, 0x3f], // 57 W
    [0x63, 0x14, 0x08, 0x14, 0x63], // 58 X
    [0x07, 0x08, 0x70, 0x08, 0x07], // 59 Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // 5a Z
    [0x00, 0x7f, 0x41, 0x41, 0x00], // 5b [
    [0x02, 0x04, 0x08, 0x10, 0x20], // 5c backslash
    [0x00, 0x41, 0x41, 0x7f, 0x00], // 5d ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // 5e ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // 5f _
    [0x00, 0x01, 0x02, 0x04, 0x00], // 60 `
    [0x20, 0x54, 0x54, 0x54, 0x78], // 61 a
    [0x7f, 0x48, 0x44, 0x44, 0x38], // 62 b
    [0x38, 0x44, 0x44, 0x44, 0x20], // 63 c
    [0x38, 0x44, 0x44, 0x48, 0x7f], // 64 d
    [0x38, 0x54, 0x54, 0x54, 0x18], // 65 e
    [0x08, 0x7e, 0x09, 0x01, 0x02], // 66 f
    [0x0c, 0x52, 0x52, 0x52, 0x3e], // 67 g
    [0x7f, 0x08, 0x04, 0x04, 0x78], // 68 h
    [0x00, 0x44, 0x7d, 0x40, 0x00], // 69 i
    [0x20, 0x40, 0x44, 0x3d, 0x00], // 6a j
    [0x7f, 0x10, 0x28, 0x44, 0x00], // 6b k
    [0x00, 0x41, 0x7f, 0x40, 0x00], // 6c l
    [0x7c, 0x04, 0x18, 0x04, 0x78], // 6d m
    [0x7c, 0x08, 0x04, 0x04, 0x78], // 6e n
    [0x38, 0x44, 0x44, 0x44, 0x38], // 6f o
    [0x7c, 0x14, 0x14, 0x14, 0x08], // 70 p
    [0x08, 0x14, 0x14, 0x18, 0x7c], // 71 q
    [0x7c, 0x08, 0x04, 0x04, 0x08], // 72 r
    [0x48, 0x54, 0x54, 0x54, 0x20], // 73 s
    [0x04, 0x3f, 0x44, 0x40, 0x20], // 74 t
    [0x3c, 0x40, 0x40, 0x20, 0x7c], // 75 u
    [0x1c, 0x20, 0x40, 0x20, 0x1c], // 76 v
    [0x3c, 0x40, 0x30, 0x40, 0x3c], // 77 w
    [0x44, 0x28, 0x10, 0x28, 0x44], // 78 x
    [0x0c, 0x50, 0x50, 0x50, 0x3c], // 79 y
    [0x44, 0x64, 0x54, 0x4c, 0x44], // 7a z
    [0x00, 0x08, 0x36, 0x41, 0x00], // 7b {
    [0x00, 0x00, 0x7f, 0x00, 0x00], // 7c |
    [0x00, 0x41, 0x36, 0x08, 0x00], // 7d }
    [0x10, 0x08, 0x08, 0x10, 0x08], // 7e ~
    [0x1f, 0x24, 0x7c, 0x24, 0x1f], // 7f
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_bounds_cover_the_full_grid() {
        assert!(cursor_in_bounds(0, 0));
        assert!(cursor_in_bounds(MAX_COLUMN, MAX_ROW));
        assert!(!cursor_in_bounds(MAX_COLUMN + 1, 0));
        assert!(!cursor_in_bounds(0, MAX_ROW + 1));
    }

    #[test]
    fn region_rejects_out_of_range_corners() {
        assert!(!region_in_bounds(0, 84, 0, 0));
        assert!(!region_in_bounds(84, 84, 0, 0));
        assert!(!region_in_bounds(0, 0, 0, 6));
        assert!(!region_in_bounds(0, 0, 6, 6));
    }

    #[test]
    fn region_rejects_inverted_spans() {
        assert!(!region_in_bounds(20, 10, 0, 0));
        assert!(!region_in_bounds(0, 0, 4, 2));
    }

    #[test]
    fn region_accepts_single_cells_and_the_whole_screen() {
        assert!(region_in_bounds(45, 45, 2, 2));
        assert!(region_in_bounds(0, MAX_COLUMN, 0, MAX_ROW));
    }
}
