/*
 *  display/screens/radio.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Default radio screen - channel and scrolling now playing, or the idle clock
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

use crate::constants::{LOADING_TEXT, RADIO_OFF_MARQUEE, SCROLL_EVERY_TICKS};
use crate::display::context::DisplayContext;
use crate::display::marquee::{center, Marquee};
use crate::display::screens::{Frame, Screen, ScreenKind};

/// The permanent screen
///
/// While the radio is on: channel name centered on the first row and the
/// current song scrolling underneath. Displays with three or more rows split
/// "Artist - Title" over two rows, a fourth row carries the clock.
/// While off: the clock over a scrolling "Radio Off" banner.
#[derive(Debug, Clone)]
pub struct RadioScreen {
    song: Marquee,
    title: Marquee,
    off: Marquee,
}

impl Default for RadioScreen {
    fn default() -> Self {
        Self::new(SCROLL_EVERY_TICKS, 0)
    }
}

impl RadioScreen {
    pub fn new(step_every: u32, hold_ticks: u32) -> Self {
        Self {
            song: Marquee::new(step_every).with_hold(hold_ticks),
            title: Marquee::new(step_every).with_hold(hold_ticks),
            off: Marquee::new(step_every).with_separator(""),
        }
    }

    fn render_on(&mut self, width: usize, rows: usize, ctx: &DisplayContext) -> Vec<String> {
        let song = ctx
            .current_song
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(LOADING_TEXT);

        if rows == 1 {
            return vec![self.song.render(song, width)];
        }

        let mut lines = vec![center(ctx.channel_name.trim(), width)];
        if rows == 2 {
            lines.push(self.song.render(song, width));
            return lines;
        }

        match song.split_once(" - ") {
            Some((artist, title)) => {
                lines.push(self.song.render(artist, width));
                lines.push(self.title.render(title, width));
            }
            None => {
                lines.push(self.song.render(song, width));
                lines.push(String::new());
            }
        }
        if rows >= 4 {
            lines.push(center(&ctx.clock, width));
        }
        lines
    }

    fn render_off(&mut self, width: usize, rows: usize, ctx: &DisplayContext) -> Vec<String> {
        // repeat the banner so it is always wider than the row and wraps seamlessly
        let repeats = width / RADIO_OFF_MARQUEE.chars().count() + 2;
        let banner = RADIO_OFF_MARQUEE.repeat(repeats);

        if rows == 1 {
            return vec![self.off.render(&banner, width)];
        }
        vec![center(&ctx.clock, width), self.off.render(&banner, width)]
    }
}

impl Screen for RadioScreen {
    fn name(&self) -> &str {
        "radio"
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Default
    }

    fn render(&mut self, dims: (usize, usize), ctx: &DisplayContext) -> Frame {
        let (width, rows) = dims;
        let lines = if ctx.power.is_on() {
            self.render_on(width, rows, ctx)
        } else {
            self.render_off(width, rows, ctx)
        };
        Frame::keep(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::context::Power;

    fn on_ctx(song: Option<&str>) -> DisplayContext {
        DisplayContext {
            power: Power::On,
            channel_name: "Jazz".into(),
            current_song: song.map(String::from),
            clock: "12:34:56".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_on_shows_channel_and_song() {
        let mut screen = RadioScreen::new(1, 0);
        let frame = screen.render((16, 2), &on_ctx(Some("Miles Davis - So What")));
        assert_eq!(frame.lines[0], "      Jazz      ");
        assert_eq!(frame.lines[1], "Miles Davis - So");

        let frame = screen.render((16, 2), &on_ctx(Some("Miles Davis - So What")));
        assert_eq!(frame.lines[1], "iles Davis - So ");
    }

    #[test]
    fn test_on_without_song_shows_loading() {
        let mut screen = RadioScreen::default();
        let frame = screen.render((16, 2), &on_ctx(None));
        assert_eq!(frame.lines[1].trim(), LOADING_TEXT);
    }

    #[test]
    fn test_off_shows_clock_and_scrolling_banner() {
        let mut screen = RadioScreen::new(1, 0);
        let ctx = DisplayContext {
            clock: "07:05:00".into(),
            ..Default::default()
        };
        let first = screen.render((16, 2), &ctx);
        assert_eq!(first.lines[0], "    07:05:00    ");
        assert_eq!(first.lines[1], "Radio Off  -  Ra");

        let second = screen.render((16, 2), &ctx);
        assert_eq!(second.lines[1], "adio Off  -  Rad");
    }

    #[test]
    fn test_off_banner_wraps_seamlessly() {
        let mut screen = RadioScreen::new(1, 0);
        let ctx = DisplayContext::default();
        let period = RADIO_OFF_MARQUEE.chars().count();
        let frames: Vec<String> = (0..=period)
            .map(|_| screen.render((16, 2), &ctx).lines[1].clone())
            .collect();
        assert_eq!(frames[0], frames[period]);
    }

    #[test]
    fn test_four_rows_split_song_and_show_clock() {
        let mut screen = RadioScreen::new(1, 0);
        let frame = screen.render((20, 4), &on_ctx(Some("Miles Davis - So What")));
        assert_eq!(frame.lines.len(), 4);
        assert_eq!(frame.lines[1].trim(), "Miles Davis");
        assert_eq!(frame.lines[2].trim(), "So What");
        assert_eq!(frame.lines[3].trim(), "12:34:56");
    }
}
