/*
 *  constants.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Defaults shared by the display, radio and collaborator modules
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

//! This module contains global constants used across the display and radio modules.

/// Character columns of the stock 16x2 LCD.
pub const DISPLAY_COLUMNS: usize = 16;
/// Character rows of the stock 16x2 LCD.
pub const DISPLAY_ROWS: usize = 2;

/// Default PCF8574 backpack address.
pub const LCD_I2C_ADDRESS: u8 = 0x27;
pub const LCD_I2C_BUS: &str = "/dev/i2c-1";

/// Render tick period.
pub const RENDER_INTERVAL_MS: u64 = 200;
/// Marquee advances one character every N render ticks (~400ms per char).
pub const SCROLL_EVERY_TICKS: u32 = 2;
/// Gap appended to scrolling text before it wraps around.
pub const MARQUEE_SEPARATOR: &str = "   ";

/// Minimum gap between two accepted presses of the same button.
pub const DEBOUNCE_MS: u64 = 250;

pub const VOLUME_STEP: u8 = 5;
pub const VOLUME_MAX: u8 = 100;
/// Volume applied when the radio powers on, keeps it from blasting.
pub const STARTUP_VOLUME: u8 = 15;

pub const VOLUME_SCREEN_MS: u64 = 2000;
pub const CHANNEL_SCREEN_MS: u64 = 2000;
pub const ERROR_SCREEN_MS: u64 = 5000;
pub const RADIO_OFF_SCREEN_MS: u64 = 2000;
pub const GOODBYE_SCREEN_MS: u64 = 1500;

/// A roster that arrives this soon after a refused power press turns the radio on.
pub const ROSTER_RETRY_MS: u64 = 10_000;

/// Button queue depth between the interrupt side and the controller task.
pub const BUTTON_QUEUE_DEPTH: usize = 32;

pub const API_BASE_URL: &str = "http://localhost:5000";
pub const API_TIMEOUT_MS: u64 = 5000;
pub const API_CONNECT_TIMEOUT_MS: u64 = 2000;
pub const SONG_POLL_SECS: u64 = 10;
/// Consecutive poll failures before the user is told about it.
pub const POLL_FAILURE_THRESHOLD: u32 = 3;
pub const POLL_BACKOFF_MAX_SECS: u64 = 60;

pub const STATE_FILE: &str = "last_channel.txt";

// GPIO assignments, BCM numbering
pub const GPIO_POWER: u8 = 25;
pub const GPIO_VOLUME_UP: u8 = 23;
pub const GPIO_VOLUME_DOWN: u8 = 24;
pub const GPIO_CHANNEL_UP: u8 = 14;
pub const GPIO_CHANNEL_DOWN: u8 = 15;

pub const RADIO_OFF_MARQUEE: &str = "Radio Off  -  ";
pub const LOADING_TEXT: &str = "Loading...";
