//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The backpack maps one I2C byte onto the LCD pins:
//! `P0=RS P1=RW P2=EN P3=backlight P4..P7=D4..D7`. Everything goes through
//! the controller's 4-bit interface, high nibble first.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{debug, info};

use super::{CharacterDisplay, DisplayConnector, DisplayError, MAX_COLS};
use crate::bus::BusAddress;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start of each row.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Degree sign in the A00 character ROM.
const ROM_DEGREE: u8 = 0xDF;

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: BusAddress,
    cols: u8,
    rows: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    /// Run the 4-bit initialization sequence and clear the screen.
    pub async fn init(
        i2c: I,
        delay: D,
        address: BusAddress,
        rows: u8,
        cols: u8,
    ) -> Result<Self, DisplayError> {
        if rows == 0
            || usize::from(rows) > ROW_OFFSETS.len()
            || cols == 0
            || usize::from(cols) > MAX_COLS
        {
            return Err(DisplayError::Geometry { cols, rows });
        }

        let mut lcd = Self {
            i2c,
            delay,
            address,
            cols,
            rows,
        };
        lcd.reset().await.map_err(|_| DisplayError::NotResponding {
            address,
            operation: "init",
        })?;

        info!("LCD {}x{} ready at {}", cols, rows, address);
        Ok(lcd)
    }

    async fn reset(&mut self) -> Result<(), I::Error> {
        self.delay.delay_ms(50).await;
        self.expander_write(BACKLIGHT).await?;

        // Force 8-bit mode three times, then switch to 4-bit.
        self.write_nibble(0x03, 0).await?;
        self.delay.delay_us(4_500).await;
        self.write_nibble(0x03, 0).await?;
        self.delay.delay_us(150).await;
        self.write_nibble(0x03, 0).await?;
        self.write_nibble(0x02, 0).await?;

        self.command(CMD_FUNCTION_4BIT_2LINE).await?;
        self.command(CMD_DISPLAY_OFF).await?;
        self.command(CMD_CLEAR).await?;
        self.delay.delay_ms(2).await;
        self.command(CMD_ENTRY_MODE_INCREMENT).await?;
        self.command(CMD_DISPLAY_ON).await
    }

    async fn expander_write(&mut self, byte: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address.get(), &[byte]).await
    }

    async fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let byte = (nibble << 4) | mode | BACKLIGHT;
        self.expander_write(byte | EN).await?;
        self.delay.delay_us(1).await;
        self.expander_write(byte).await?;
        self.delay.delay_us(50).await;
        Ok(())
    }

    async fn send(&mut self, value: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(value >> 4, mode).await?;
        self.write_nibble(value & 0x0F, mode).await
    }

    async fn command(&mut self, command: u8) -> Result<(), I::Error> {
        self.send(command, 0).await
    }

    fn rom_code(ch: char) -> u8 {
        match ch {
            '°' => ROM_DEGREE,
            ' '..='}' => ch as u8,
            _ => b'?',
        }
    }
}

impl<I: I2c, D: DelayNs> CharacterDisplay for Lcd1602<I, D> {
    type Error = I::Error;

    async fn clear(&mut self) -> Result<(), I::Error> {
        self.command(CMD_CLEAR).await?;
        self.delay.delay_ms(2).await;
        Ok(())
    }

    async fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), I::Error> {
        let row = row.min(self.rows - 1);
        let col = col.min(self.cols - 1);
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + col))
            .await
    }

    async fn write_text(&mut self, text: &str) -> Result<(), I::Error> {
        debug!("LCD <- {:?}", text);
        for ch in text.chars() {
            self.send(Self::rom_code(ch), RS).await?;
        }
        Ok(())
    }
}

/// Attaches [`Lcd1602`] displays through a bus handle.
pub struct Lcd1602Connector<I, D> {
    i2c: I,
    delay: D,
}

impl<I, D> Lcd1602Connector<I, D> {
    pub const fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }
}

impl<I, D> DisplayConnector for Lcd1602Connector<I, D>
where
    I: I2c + Clone,
    D: DelayNs + Clone,
{
    type Display = Lcd1602<I, D>;

    async fn attach(
        &mut self,
        address: BusAddress,
        rows: u8,
        cols: u8,
    ) -> Result<Lcd1602<I, D>, DisplayError> {
        Lcd1602::init(self.i2c.clone(), self.delay.clone(), address, rows, cols).await
    }
}
