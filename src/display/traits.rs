/*
 *  display/traits.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for character display abstraction
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

use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Driver name, for logging
    pub name: String,

    /// Character columns
    pub columns: usize,

    /// Character rows
    pub rows: usize,
}

impl DisplayCapabilities {
    pub fn new(name: &str, columns: usize, rows: usize) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows,
        }
    }
}

/// Minimal character-grid abstraction - all display drivers must implement this trait
///
/// Any new physical display is integrated solely by implementing this trait.
/// Writes may be buffered: a driver is free to stage `clear` and `display_text`
/// and only touch the hardware in `flush`. The display manager always calls
/// `clear`, writes every row, then `flush`es, once per render tick.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (columns, rows)
    fn dimensions(&self) -> (usize, usize) {
        let caps = self.capabilities();
        (caps.columns, caps.rows)
    }

    /// Initialize the display hardware
    ///
    /// Together with construction this is the only step allowed to fail on a
    /// healthy device; a failure here triggers the software fallback.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write text to a 1-indexed row
    ///
    /// Callers pad/truncate to the display width. Drivers must still never
    /// write past their last column.
    fn display_text(&mut self, text: &str, line: usize) -> Result<(), DisplayError>;

    /// Push staged writes to the hardware
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
