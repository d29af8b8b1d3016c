/*
 *  display/drivers/hd44780.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 character LCD behind a PCF8574 I2C backpack
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

// PCF8574 pin mapping: P0=RS P1=RW P2=EN P3=backlight P4..P7=D4..D7
const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row (20x4 layout, 16x2 uses the first two)
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// HD44780 display driver
///
/// Writes are staged in a shadow buffer and pushed on `flush`. Only rows whose
/// content differs from what is already on the glass are rewritten, so the
/// manager's clear-then-write-every-row cycle never flickers the panel.
pub struct Hd44780Driver<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    capabilities: DisplayCapabilities,
    /// Rows as they should look after the next flush
    staged: Vec<String>,
    /// Rows as last written to the controller, None = unknown
    on_glass: Vec<Option<String>>,
}

impl<I, D> Hd44780Driver<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Wrap an I2C bus; the controller is not touched until `init`
    pub fn new(i2c: I, delay: D, address: u8, columns: usize, rows: usize) -> Result<Self, DisplayError> {
        if rows == 0 || rows > ROW_OFFSETS.len() {
            return Err(DisplayError::InvalidConfiguration(
                format!("HD44780 supports 1-{} rows, got {}", ROW_OFFSETS.len(), rows)
            ));
        }
        if columns == 0 || columns > 40 {
            return Err(DisplayError::InvalidConfiguration(
                format!("HD44780 supports 1-40 columns, got {}", columns)
            ));
        }

        let capabilities = DisplayCapabilities::new("hd44780", columns, rows);

        Ok(Self {
            i2c,
            delay,
            address,
            capabilities,
            staged: vec![" ".repeat(columns); rows],
            on_glass: vec![None; rows],
        })
    }

    /// Release the bus
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn expander_write(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[byte | BACKLIGHT])
            .map_err(|e| DisplayError::I2cError(format!("write to 0x{:02X} failed: {:?}", self.address, e)))
    }

    fn pulse_enable(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.expander_write(byte | EN)?;
        self.delay.delay_us(1);
        self.expander_write(byte & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write4(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.expander_write(byte)?;
        self.pulse_enable(byte)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.write4((value & 0xF0) | mode)?;
        self.write4(((value << 4) & 0xF0) | mode)
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.send(cmd, 0)
    }

    fn write_row(&mut self, row: usize, text: &str) -> Result<(), DisplayError> {
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[row])?;
        for b in text.bytes() {
            self.send(b, RS)?;
        }
        Ok(())
    }
}

/// Replace anything the HD44780 character ROM can't show with a space
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
        .collect()
}

impl<I, D> DisplayDriver for Hd44780Driver<I, D>
where
    I: I2c + Send,
    D: DelayNs + Send,
{
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // power-on wait, then the 8-bit -> 4-bit reset dance from the datasheet
        self.delay.delay_ms(50);
        self.expander_write(0)
            .map_err(|e| DisplayError::InitializationFailed(format!("no LCD at 0x{:02X}: {}", self.address, e)))?;
        self.write4(0x30)?;
        self.delay.delay_us(4500);
        self.write4(0x30)?;
        self.delay.delay_us(4500);
        self.write4(0x30)?;
        self.delay.delay_us(150);
        self.write4(0x20)?;

        self.command(CMD_FUNCTION_SET_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_OFF)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.command(CMD_ENTRY_MODE_INCREMENT)?;
        self.command(CMD_DISPLAY_ON)?;

        let blank = " ".repeat(self.capabilities.columns);
        self.on_glass = vec![Some(blank.clone()); self.capabilities.rows];
        self.staged = vec![blank; self.capabilities.rows];
        info!("HD44780 {}x{} ready at 0x{:02X}",
            self.capabilities.columns, self.capabilities.rows, self.address);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let blank = " ".repeat(self.capabilities.columns);
        self.staged.iter_mut().for_each(|row| *row = blank.clone());
        Ok(())
    }

    fn display_text(&mut self, text: &str, line: usize) -> Result<(), DisplayError> {
        let rows = self.capabilities.rows;
        if line == 0 || line > rows {
            return Err(DisplayError::InvalidLine { line, rows });
        }
        let columns = self.capabilities.columns;
        let clean: String = sanitize(text).chars().take(columns).collect();
        self.staged[line - 1] = format!("{:<width$}", clean, width = columns);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        for row in 0..self.capabilities.rows {
            if self.on_glass[row].as_deref() == Some(self.staged[row].as_str()) {
                continue;
            }
            let text = self.staged[row].clone();
            if let Err(e) = self.write_row(row, &text) {
                self.on_glass[row] = None;
                return Err(e);
            }
            debug!("LCD row {}: '{}'", row + 1, text);
            self.on_glass[row] = Some(text);
        }
        Ok(())
    }
}

#[cfg(feature = "driver-hd44780")]
impl Hd44780Driver<linux_embedded_hal::I2cdev, linux_embedded_hal::Delay> {
    /// Create a new HD44780 driver on a Linux I2C bus
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - backpack address (typically 0x27 or 0x3F)
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        columns: usize,
        rows: usize,
    ) -> Result<Self, DisplayError> {
        info!("Initializing HD44780 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = linux_embedded_hal::I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;

        Self::new(i2c, linux_embedded_hal::Delay, address, columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        bytes: Vec<u8>,
        addresses: Vec<u8>,
    }

    impl ErrorType for RecordingBus {
        type Error = core::convert::Infallible;
    }

    impl I2c for RecordingBus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let Operation::Write(data) = op {
                    self.addresses.push(address);
                    self.bytes.extend_from_slice(data);
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Rebuild the bytes the controller latched: each nibble is clocked on the
    /// falling edge of EN, so take the high nibble of every "EN high" frame.
    fn latched_nibbles(bytes: &[u8]) -> Vec<(bool, u8)> {
        bytes
            .iter()
            .filter(|b| *b & EN != 0)
            .map(|b| (b & RS != 0, b >> 4))
            .collect()
    }

    fn pair(nibbles: &[(bool, u8)]) -> Vec<(bool, u8)> {
        nibbles
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0].0, (pair[0].1 << 4) | pair[1].1))
            .collect()
    }

    fn latched_bytes(bytes: &[u8]) -> Vec<(bool, u8)> {
        pair(&latched_nibbles(bytes))
    }

    fn ready_driver(columns: usize, rows: usize) -> Hd44780Driver<RecordingBus, NoDelay> {
        let mut lcd = Hd44780Driver::new(RecordingBus::default(), NoDelay, 0x27, columns, rows).unwrap();
        lcd.init().unwrap();
        lcd
    }

    #[test]
    fn test_rejects_unsupported_geometry() {
        assert!(Hd44780Driver::new(RecordingBus::default(), NoDelay, 0x27, 16, 5).is_err());
        assert!(Hd44780Driver::new(RecordingBus::default(), NoDelay, 0x27, 0, 2).is_err());
    }

    #[test]
    fn test_init_sequence() {
        let lcd = ready_driver(16, 2);
        let (bus, _) = lcd.release();

        assert!(bus.addresses.iter().all(|a| *a == 0x27));
        // backlight stays on for every frame
        assert!(bus.bytes.iter().all(|b| b & BACKLIGHT != 0));

        let nibbles = latched_nibbles(&bus.bytes);
        assert_eq!(&nibbles[..4], &[(false, 0x3), (false, 0x3), (false, 0x3), (false, 0x2)]);

        let commands: Vec<u8> = pair(&nibbles[4..]).into_iter().map(|(_, b)| b).collect();
        assert_eq!(commands, vec![
            CMD_FUNCTION_SET_4BIT_2LINE,
            CMD_DISPLAY_OFF,
            CMD_CLEAR,
            CMD_ENTRY_MODE_INCREMENT,
            CMD_DISPLAY_ON,
        ]);
    }

    #[test]
    fn test_flush_writes_row_with_address() {
        let mut lcd = ready_driver(16, 2);
        let init_len = lcd.i2c.bytes.len();

        lcd.clear().unwrap();
        lcd.display_text("Hi", 2).unwrap();
        lcd.flush().unwrap();

        let written = latched_bytes(&lcd.i2c.bytes[init_len..]);
        assert_eq!(written[0], (false, CMD_SET_DDRAM | 0x40));
        let text: String = written[1..].iter().map(|(rs, b)| {
            assert!(*rs);
            *b as char
        }).collect();
        assert_eq!(text, "Hi              ");
    }

    #[test]
    fn test_unchanged_rows_are_skipped() {
        let mut lcd = ready_driver(16, 2);

        lcd.display_text("Classic Rock", 1).unwrap();
        lcd.flush().unwrap();
        let after_first = lcd.i2c.bytes.len();

        // same frame again, as the manager does every tick
        lcd.clear().unwrap();
        lcd.display_text("Classic Rock", 1).unwrap();
        lcd.display_text("", 2).unwrap();
        lcd.flush().unwrap();
        assert_eq!(lcd.i2c.bytes.len(), after_first);
    }

    #[test]
    fn test_sanitize_replaces_unprintable() {
        assert_eq!(sanitize("Caf\u{e9}\tBar\n"), "Caf  Bar ");
        assert_eq!(sanitize("plain ~text~"), "plain ~text~");
    }

    #[test]
    fn test_row_four_address() {
        let mut lcd = ready_driver(20, 4);
        let init_len = lcd.i2c.bytes.len();
        lcd.display_text("x", 4).unwrap();
        lcd.flush().unwrap();
        let written = latched_bytes(&lcd.i2c.bytes[init_len..]);
        assert_eq!(written[0], (false, CMD_SET_DDRAM | 0x54));
        assert!(lcd.display_text("x", 5).is_err());
    }
}
