/*
 *  radio/mod.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Radio control - buttons, events and the state they drive
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

use crate::api::{Channel, SongInfo};
use crate::constants::{VOLUME_MAX, VOLUME_STEP};
use crate::display::Power;

pub mod controller;
pub mod debounce;

pub use controller::{RadioController, RadioSettings};
pub use debounce::Debouncer;

/// The five physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Power,
    VolumeUp,
    VolumeDown,
    ChannelUp,
    ChannelDown,
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Button::Power => "power",
            Button::VolumeUp => "volume up",
            Button::VolumeDown => "volume down",
            Button::ChannelUp => "channel up",
            Button::ChannelDown => "channel down",
        };
        write!(f, "{}", name)
    }
}

/// Everything the controller reacts to, in arrival order
#[derive(Debug, Clone)]
pub enum RadioEvent {
    Pressed(Button),
    ChannelsLoaded(Vec<Channel>),
    SongUpdated { channel_index: usize, song: SongInfo },
    /// A collaborator (API, player) keeps failing
    CollaboratorFailed(String),
    CollaboratorRecovered,
    Shutdown,
}

/// Power, channel and volume as the user sees them
#[derive(Debug, Clone, PartialEq)]
pub struct RadioState {
    pub power: Power,
    pub channel_index: usize,
    pub volume_percent: u8,
    pub channels: Vec<Channel>,
    /// "Artist - Title" on the current channel
    pub current_song: Option<String>,
    /// A roster response arrived, even if it was empty
    pub roster_loaded: bool,
}

impl RadioState {
    pub fn new(channel_index: usize, volume_percent: u8) -> Self {
        Self {
            power: Power::Off,
            channel_index,
            volume_percent: volume_percent.min(VOLUME_MAX),
            channels: Vec::new(),
            current_song: None,
            roster_loaded: false,
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channels
            .get(self.channel_index)
            .map(|c| c.name.as_str())
            .unwrap_or("Radio")
    }

    /// Step the channel cyclically; None with an empty roster
    pub fn step_channel(&mut self, forward: bool) -> Option<usize> {
        let n = self.channels.len();
        if n == 0 {
            return None;
        }
        let i = self.channel_index % n;
        self.channel_index = if forward { (i + 1) % n } else { (i + n - 1) % n };
        Some(self.channel_index)
    }

    /// Step the volume by one notch, clamped to 0..=100
    pub fn step_volume(&mut self, up: bool) -> u8 {
        self.volume_percent = if up {
            self.volume_percent.saturating_add(VOLUME_STEP).min(VOLUME_MAX)
        } else {
            self.volume_percent.saturating_sub(VOLUME_STEP)
        };
        self.volume_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<Channel> {
        names.iter().map(|n| Channel::new(n)).collect()
    }

    #[test]
    fn test_channel_wraps_both_ways() {
        let mut state = RadioState::new(2, 50);
        state.channels = roster(&["A", "B", "C"]);
        assert_eq!(state.step_channel(true), Some(0));
        assert_eq!(state.step_channel(false), Some(2));
        assert_eq!(state.channel_name(), "C");
    }

    #[test]
    fn test_channel_noop_without_roster() {
        let mut state = RadioState::new(0, 50);
        assert_eq!(state.step_channel(true), None);
        assert_eq!(state.channel_name(), "Radio");
    }

    #[test]
    fn test_volume_clamps() {
        let mut state = RadioState::new(0, 98);
        assert_eq!(state.step_volume(true), 100);
        assert_eq!(state.step_volume(true), 100);

        let mut state = RadioState::new(0, 2);
        assert_eq!(state.step_volume(false), 0);
        assert_eq!(state.step_volume(false), 0);
    }
}
