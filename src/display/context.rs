/*
 *  display/context.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display context - the read-only snapshot screens render from
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

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Radio power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Power {
    #[default]
    Off,
    On,
}

impl Power {
    pub fn is_on(self) -> bool {
        self == Power::On
    }

    pub fn toggled(self) -> Self {
        match self {
            Power::Off => Power::On,
            Power::On => Power::Off,
        }
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Power::Off => write!(f, "OFF"),
            Power::On => write!(f, "ON"),
        }
    }
}

/// Everything a screen may show
///
/// Written only by the radio controller and published over a watch channel;
/// the render task takes a clone per tick and stamps the wall clock into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayContext {
    pub power: Power,
    pub channel_index: usize,
    pub channel_name: String,
    /// "Artist - Title" of the song on the current channel, once known
    pub current_song: Option<String>,
    pub volume_percent: u8,
    /// Last collaborator failure still in effect
    pub error_message: Option<String>,
    /// HH:MM:SS, stamped by the render task
    pub clock: String,
}

impl DisplayContext {
    pub fn stamp_clock(&mut self) {
        self.clock = Local::now().format("%H:%M:%S").to_string();
    }

    pub fn with_clock(mut self, clock: &str) -> Self {
        self.clock = clock.to_string();
        self
    }
}
