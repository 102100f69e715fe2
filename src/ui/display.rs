//! SSD1306 OLED tuner screen.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::config::OLED_I2C_ADDR;
use crate::error::Error;
use crate::tuner::FrequencyDisplay;
use crate::ui::input_logic::TuningMode;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Build the SSD1306 driver. The panel is not touched until `init()`.
pub fn new<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new_custom_address(i2c, OLED_I2C_ADDR);
    Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode()
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Tuner screen on top of the SSD1306.
pub struct TunerPanel<I2C> {
    display: Display<I2C>,
    ready: bool,
    blink_on: bool,
}

impl<I2C> TunerPanel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            display: new(i2c),
            ready: false,
            blink_on: false,
        }
    }

    /// Initialise the controller and clear the screen.
    ///
    /// Drawing calls retry this until it succeeds, so a panel that was
    /// missing at boot starts working once it answers.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.ready {
            return Ok(());
        }
        self.display.init().map_err(|_| Error::Display)?;
        self.display.clear_buffer();
        self.display.flush().map_err(|_| Error::Display)?;
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// One-shot boot screen listing which peripherals answered.
    pub fn draw_boot_status(&mut self, radio_ok: bool) -> Result<(), Error> {
        self.init()?;
        self.display.clear_buffer();

        let _ = Text::new("fmtuner", Point::new(0, 10), text_style()).draw(&mut self.display);
        let _ = Text::new("OLED  : OK", Point::new(0, 28), text_style()).draw(&mut self.display);
        let radio = if radio_ok { "RADIO : OK" } else { "RADIO : FAIL" };
        let _ = Text::new(radio, Point::new(0, 40), text_style()).draw(&mut self.display);

        self.display.flush().map_err(|_| Error::Display)
    }
}

impl<I2C> FrequencyDisplay for TunerPanel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn draw(&mut self, mhz: f32, mode: TuningMode) -> Result<(), Error> {
        self.init()?;
        self.display.clear_buffer();
        self.blink_on = false;

        let mut line: heapless::String<16> = heapless::String::new();
        let _ = write!(line, "Mode: {}", mode.label());
        let _ = Text::new(line.as_str(), Point::new(0, 10), text_style()).draw(&mut self.display);

        line.clear();
        let _ = write!(line, "FM: {:.1}", mhz);
        let _ = Text::new(line.as_str(), Point::new(30, 36), text_style()).draw(&mut self.display);

        self.display.flush().map_err(|_| Error::Display)
    }

    /// Blank screen with a blinking "z" in the bottom-right corner.
    fn draw_idle_indicator(&mut self) -> Result<(), Error> {
        self.init()?;
        self.display.clear_buffer();
        self.blink_on = !self.blink_on;

        if self.blink_on {
            let _ = Text::new("z", Point::new(121, 62), text_style()).draw(&mut self.display);
        }

        self.display.flush().map_err(|_| Error::Display)
    }
}
