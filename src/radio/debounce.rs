/*
 *  radio/debounce.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per button debounce
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

use crate::radio::Button;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Drops presses of a button that come within `window` of its last accepted press
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_accepted: HashMap<Button, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
        }
    }

    /// True if the press counts; the window restarts only on accepted presses
    pub fn accept(&mut self, button: Button, now: Instant) -> bool {
        match self.last_accepted.get(&button) {
            Some(last) if now.saturating_duration_since(*last) < self.window => false,
            _ => {
                self.last_accepted.insert(button, now);
                true
            }
        }
    }
}
