//! SSD1306 OLED Display Driver
//!
//! Driver for 128x32 SSD1306-based OLED displays via I2C.
//! Drawing goes to an in-memory frame buffer through `embedded-graphics`;
//! `present` streams the buffer to the panel.

use core::convert::Infallible;

use echorange_core::traits::{DisplayError, RangeDisplay};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal_async::i2c::I2c;

/// SSD1306 I2C address (typically 0x3C or 0x3D)
const SSD1306_ADDR: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 32;
const PAGES: usize = HEIGHT / 8;

/// Control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
    initialized: bool,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2c,
{
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            buffer: [[0; WIDTH]; PAGES],
            initialized: false,
        }
    }

    /// Initialize the display
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        // Initialization sequence for a 128x32 panel
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            (HEIGHT - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x00,                  // Horizontal addressing
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            0x02, // Sequential COM config for 32 rows
            cmd::SET_CONTRAST,
            0x8F,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::RESUME_FROM_RAM,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c).await?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Send a command to the display
    async fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(SSD1306_ADDR, &[CONTROL_COMMAND, cmd]).await
    }

    /// Flush the frame buffer to the display
    pub async fn flush(&mut self) -> Result<(), I2C::Error> {
        for c in [
            cmd::SET_COLUMN_ADDR,
            0,
            (WIDTH - 1) as u8,
            cmd::SET_PAGE_ADDR,
            0,
            (PAGES - 1) as u8,
        ] {
            self.command(c).await?;
        }

        for page in 0..PAGES {
            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&self.buffer[page]);
            self.i2c.write(SSD1306_ADDR, &data).await?;
        }

        Ok(())
    }

    fn set_pixel(&mut self, point: Point, on: bool) {
        if point.x < 0 || point.y < 0 {
            return;
        }
        let (x, y) = (point.x as usize, point.y as usize);
        if x >= WIDTH || y >= HEIGHT {
            return;
        }

        let mask = 1 << (y % 8);
        let byte = &mut self.buffer[y / 8][x];
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

/// Drawing into the frame buffer cannot fail
fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

impl<I2C: I2c> DrawTarget for Ssd1306<I2C> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color.is_on());
        }
        Ok(())
    }
}

impl<I2C: I2c> OriginDimensions for Ssd1306<I2C> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<I2C: I2c> RangeDisplay for Ssd1306<I2C> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, scale: u8, text: &str) -> Result<(), DisplayError> {
        let origin = Point::new(x, y);
        if !self.bounding_box().contains(origin) {
            return Err(DisplayError::InvalidCoordinates);
        }

        let font = if scale >= 2 { &FONT_10X20 } else { &FONT_6X10 };
        let style = MonoTextStyle::new(font, BinaryColor::On);
        infallible(Text::with_baseline(text, origin, style, Baseline::Top).draw(self));
        Ok(())
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), DisplayError> {
        infallible(
            Line::new(Point::new(x0, y0), Point::new(x1, y1))
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
                .draw(self),
        );
        Ok(())
    }

    async fn present(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.flush().await.map_err(|_| DisplayError::Communication)
    }

    fn width(&self) -> u16 {
        WIDTH as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};
    use heapless::Vec;

    /// Records commands and data pages written over I2C
    #[derive(Default)]
    struct MockI2c {
        commands: Vec<u8, 64>,
        pages: Vec<Vec<u8, WIDTH>, PAGES>,
        fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            assert_eq!(address, SSD1306_ADDR);
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    match bytes.split_first() {
                        Some((&CONTROL_COMMAND, rest)) => {
                            let _ = self.commands.extend_from_slice(rest);
                        }
                        Some((&CONTROL_DATA, rest)) => {
                            let _ = self.pages.push(Vec::from_slice(rest).unwrap());
                        }
                        _ => panic!("unexpected control byte"),
                    }
                }
            }
            Ok(())
        }
    }

    fn ready_display() -> Ssd1306<MockI2c> {
        let mut display = Ssd1306::new(MockI2c::default());
        block_on(display.init()).unwrap();
        display
    }

    #[test]
    fn test_init_turns_display_on() {
        let display = ready_display();
        assert!(display.initialized);
        assert_eq!(display.i2c.commands.first(), Some(&cmd::DISPLAY_OFF));
        assert_eq!(display.i2c.commands.last(), Some(&cmd::DISPLAY_ON));
    }

    #[test]
    fn test_present_requires_init() {
        let mut display = Ssd1306::new(MockI2c::default());
        assert_eq!(block_on(display.present()), Err(DisplayError::NotInitialized));
    }

    #[test]
    fn test_horizontal_line_sets_one_bit_row() {
        let mut display = ready_display();
        display.draw_line(0, 27, 63, 27).unwrap();

        // Row 27 lives in page 3, bit 3
        for x in 0..WIDTH {
            let expected = if x <= 63 { 0x08 } else { 0x00 };
            assert_eq!(display.buffer[3][x], expected, "column {x}");
        }
        assert!(display.buffer[..3].iter().all(|page| page.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_line_clipped_to_panel() {
        let mut display = ready_display();
        display.draw_line(-10, 5, 400, 5).unwrap();
        assert!(display.buffer[0].iter().all(|&b| b == 0x20));
    }

    #[test]
    fn test_text_lands_in_top_rows() {
        let mut display = ready_display();
        display.draw_text(0, 0, 1, "Failure").unwrap();

        // 6x10 font touches pages 0 and 1 only
        assert!(display.buffer[0].iter().any(|&b| b != 0));
        assert!(display.buffer[2].iter().all(|&b| b == 0));
        assert!(display.buffer[3].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_text_outside_panel_rejected() {
        let mut display = ready_display();
        assert_eq!(
            display.draw_text(200, 0, 1, "x"),
            Err(DisplayError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut display = ready_display();
        display.draw_text(0, 0, 2, "Distance").unwrap();
        RangeDisplay::clear(&mut display).unwrap();
        assert!(display.buffer.iter().all(|page| page.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_present_streams_all_pages() {
        let mut display = ready_display();
        display.draw_line(0, 27, 9, 27).unwrap();
        block_on(display.present()).unwrap();

        assert_eq!(display.i2c.pages.len(), PAGES);
        assert_eq!(display.i2c.pages[3][..10], [0x08; 10]);
        assert_eq!(display.i2c.pages[3][10], 0);
    }

    #[test]
    fn test_bus_failure_reported() {
        let mut display = ready_display();
        display.i2c.fail = true;
        assert_eq!(block_on(display.present()), Err(DisplayError::Communication));
    }
}
