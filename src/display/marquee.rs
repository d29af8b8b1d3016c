/*
 *  display/marquee.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee engine - fixed width layout and circular horizontal scroll
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

use crate::constants::MARQUEE_SEPARATOR;

/// Center `text` in exactly `width` characters, truncating if it is wider
pub fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Left justify `text` in exactly `width` characters, truncating if it is wider
pub fn left(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    let len = clipped.chars().count();
    format!("{}{}", clipped, " ".repeat(width - len))
}

/// Scroll state for one line of text
///
/// Text wider than the line is treated as a circular buffer of
/// `text + separator`; the visible window starts at `offset` and wraps around
/// the end of the buffer. The offset moves one character every `step_every`
/// ticks, so scroll speed is independent of the render rate.
#[derive(Debug, Clone)]
pub struct Marquee {
    text: String,
    buffer: Vec<char>,
    separator: String,
    offset: usize,
    step_every: u32,
    tick: u32,
    hold_ticks: u32,
    hold: u32,
}

impl Marquee {
    pub fn new(step_every: u32) -> Self {
        Self {
            text: String::new(),
            buffer: Vec::new(),
            separator: MARQUEE_SEPARATOR.to_string(),
            offset: 0,
            step_every: step_every.max(1),
            tick: 0,
            hold_ticks: 0,
            hold: 0,
        }
    }

    /// Pause for `ticks` render ticks at the start of each new text
    pub fn with_hold(mut self, ticks: u32) -> Self {
        self.hold_ticks = ticks;
        self.hold = ticks;
        self
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self.rebuild();
        self
    }

    /// Replace the source text; scroll state only resets if it actually changed
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.rebuild();
        self.offset = 0;
        self.tick = 0;
        self.hold = self.hold_ticks;
        true
    }

    fn rebuild(&mut self) {
        self.buffer = self.text.chars().chain(self.separator.chars()).collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the circular buffer (text + separator) in characters
    pub fn cycle_len(&self) -> usize {
        self.buffer.len()
    }

    fn fits(&self, width: usize) -> bool {
        self.text.chars().count() <= width
    }

    /// Visible content for the current offset, exactly `width` characters
    pub fn window(&self, width: usize) -> String {
        if self.fits(width) {
            return center(&self.text, width);
        }
        let len = self.buffer.len();
        (0..width)
            .map(|i| self.buffer[(self.offset + i) % len])
            .collect()
    }

    /// Move the scroll position on by one render tick
    pub fn advance(&mut self, width: usize) {
        if self.fits(width) {
            self.offset = 0;
            return;
        }
        if self.hold > 0 {
            self.hold -= 1;
            return;
        }
        self.tick += 1;
        if self.tick >= self.step_every {
            self.tick = 0;
            self.offset = (self.offset + 1) % self.buffer.len();
        }
    }

    /// Set the text, return the current window and advance for the next tick
    pub fn render(&mut self, text: &str, width: usize) -> String {
        self.set_text(text);
        let line = self.window(width);
        self.advance(width);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_window(text: &str, width: usize, k: usize) -> String {
        let buffer: Vec<char> = format!("{}{}", text, MARQUEE_SEPARATOR).chars().collect();
        let start = k % buffer.len();
        (0..width).map(|i| buffer[(start + i) % buffer.len()]).collect()
    }

    #[test]
    fn test_center_and_left() {
        assert_eq!(center("Volume", 16), "     Volume     ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("much too long for it", 8), "much too");
        assert_eq!(left("ab", 4), "ab  ");
        assert_eq!(left("abcdef", 4), "abcd");
        assert_eq!(center("", 0), "");
    }

    #[test]
    fn test_short_text_is_centered_and_static() {
        let mut m = Marquee::new(1);
        for _ in 0..10 {
            let line = m.render("Jazz FM", 16);
            assert_eq!(line.chars().count(), 16);
            assert_eq!(line, "    Jazz FM     ");
            assert_eq!(m.offset(), 0);
        }
    }

    #[test]
    fn test_window_follows_circular_buffer() {
        let text = "Led Zeppelin - Stairway to Heaven";
        let width = 16;
        let mut m = Marquee::new(1);
        let cycle = text.chars().count() + MARQUEE_SEPARATOR.len();

        for k in 0..(cycle * 2 + 3) {
            assert_eq!(m.render(text, width), expected_window(text, width, k), "tick {}", k);
        }
        assert_eq!(m.cycle_len(), cycle);
    }

    #[test]
    fn test_periodicity() {
        let text = "The Beatles - Here Comes The Sun";
        let mut m = Marquee::new(1);
        let frames: Vec<String> = (0..=m_cycle(text)).map(|_| m.render(text, 16)).collect();
        assert_eq!(frames[0], frames[m_cycle(text)]);
        assert_ne!(frames[0], frames[1]);
    }

    fn m_cycle(text: &str) -> usize {
        text.chars().count() + MARQUEE_SEPARATOR.len()
    }

    #[test]
    fn test_step_every_slows_scroll() {
        let text = "a fairly long song title here";
        let mut m = Marquee::new(3);
        let offsets: Vec<usize> = (0..7).map(|_| { m.render(text, 10); m.offset() }).collect();
        assert_eq!(offsets, vec![0, 0, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_new_text_resets_offset() {
        let mut m = Marquee::new(1);
        for _ in 0..5 {
            m.render("first song that scrolls along", 10);
        }
        assert_eq!(m.offset(), 5);

        // same text keeps going
        m.render("first song that scrolls along", 10);
        assert_eq!(m.offset(), 6);

        let line = m.render("second song that also scrolls", 10);
        assert_eq!(line, "second son");
        assert_eq!(m.offset(), 1);
    }

    #[test]
    fn test_hold_pauses_before_scrolling() {
        let mut m = Marquee::new(1).with_hold(2);
        let lines: Vec<String> = (0..4).map(|_| m.render("0123456789abc", 5)).collect();
        assert_eq!(lines, vec!["01234", "01234", "01234", "12345"]);
    }

    #[test]
    fn test_unicode_counts_chars() {
        let mut m = Marquee::new(1);
        assert_eq!(m.render("Björk", 8), " Björk  ");
        let line = m.render("Sigur Rós - Hoppípolla", 8);
        assert_eq!(line.chars().count(), 8);
    }
}
