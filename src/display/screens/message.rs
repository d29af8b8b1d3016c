/*
 *  display/screens/message.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Short-lived information screens: volume, channel and plain messages
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

use crate::constants::SCROLL_EVERY_TICKS;
use crate::display::context::DisplayContext;
use crate::display::marquee::{center, Marquee};
use crate::display::screens::{titled, Frame, Screen, ScreenKind};

/// "Volume" over the new percentage
#[derive(Debug, Clone)]
pub struct VolumeScreen {
    percent: u8,
}

impl VolumeScreen {
    pub fn new(percent: u8) -> Self {
        Self { percent }
    }
}

impl Screen for VolumeScreen {
    fn name(&self) -> &str {
        "volume"
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Volume
    }

    fn render(&mut self, dims: (usize, usize), _ctx: &DisplayContext) -> Frame {
        Frame::keep(titled(dims, "Volume", &format!("{}%", self.percent)))
    }
}

/// "Channel" over the channel name; long names scroll
#[derive(Debug, Clone)]
pub struct ChannelScreen {
    channel: String,
    marquee: Marquee,
}

impl ChannelScreen {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            marquee: Marquee::new(SCROLL_EVERY_TICKS),
        }
    }
}

impl Screen for ChannelScreen {
    fn name(&self) -> &str {
        "channel"
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Channel
    }

    fn render(&mut self, dims: (usize, usize), _ctx: &DisplayContext) -> Frame {
        let (width, rows) = dims;
        if rows < 2 {
            return Frame::keep(titled(dims, "Channel", &self.channel));
        }
        let name = self.marquee.render(&self.channel, width);
        Frame::keep(vec![center("Channel", width), name])
    }
}

/// Static centered text, e.g. "Radio OFF" or "Goodbye!"
#[derive(Debug, Clone)]
pub struct MessageScreen {
    name: String,
    lines: Vec<String>,
}

impl MessageScreen {
    pub fn new(name: &str, lines: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn radio_off() -> Self {
        Self::new("radio_off", &["Radio OFF"])
    }

    pub fn goodbye() -> Self {
        Self::new("goodbye", &["Goodbye!"])
    }

    pub fn screen_cleared() -> Self {
        Self::new("screen_cleared", &["Screen Cleared"])
    }
}

impl Screen for MessageScreen {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Custom(self.name.clone())
    }

    fn render(&mut self, dims: (usize, usize), _ctx: &DisplayContext) -> Frame {
        let (width, _) = dims;
        Frame::keep(self.lines.iter().map(|l| center(l, width)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::screens::Transition;

    #[test]
    fn test_volume_screen() {
        let mut screen = VolumeScreen::new(45);
        let frame = screen.render((16, 2), &DisplayContext::default());
        assert_eq!(frame.lines[0].trim(), "Volume");
        assert_eq!(frame.lines[1].trim(), "45%");
        assert_eq!(frame.transition, Transition::Continue);
        assert_eq!(screen.kind(), ScreenKind::Volume);
    }

    #[test]
    fn test_channel_screen_scrolls_long_names() {
        let mut screen = ChannelScreen::new("Late Night Jazz Lounge");
        let ctx = DisplayContext::default();
        let first = screen.render((16, 2), &ctx);
        assert_eq!(first.lines[1], "Late Night Jazz ");
        let mut last = first.clone();
        for _ in 0..SCROLL_EVERY_TICKS {
            last = screen.render((16, 2), &ctx);
        }
        assert_eq!(last.lines[1], "ate Night Jazz L");
        assert_eq!(last.lines[0].trim(), "Channel");
    }

    #[test]
    fn test_message_screen_kind() {
        let mut screen = MessageScreen::goodbye();
        assert_eq!(screen.kind(), ScreenKind::Custom("goodbye".into()));
        let frame = screen.render((16, 2), &DisplayContext::default());
        assert_eq!(frame.lines, vec!["    Goodbye!    ".to_string()]);
    }
}
