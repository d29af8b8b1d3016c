/*
 *  display/screens/mod.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen contract and the built-in screens
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

use crate::display::context::DisplayContext;
use crate::display::marquee::center;

pub mod error;
pub mod message;
pub mod radio;

pub use error::ErrorScreen;
pub use message::{ChannelScreen, MessageScreen, VolumeScreen};
pub use radio::RadioScreen;

/// What a screen is, independent of its content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Default,
    Volume,
    Channel,
    Error,
    Custom(String),
}

impl std::fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenKind::Default => write!(f, "default"),
            ScreenKind::Volume => write!(f, "volume"),
            ScreenKind::Channel => write!(f, "channel"),
            ScreenKind::Error => write!(f, "error"),
            ScreenKind::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// What the display manager does with a screen after it rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep showing this screen (until its TTL, if any, runs out)
    Continue,
    /// Drop this override now and fall back to the default screen
    Revert,
}

/// One rendered frame
///
/// `lines` may hold fewer or more rows than the display and lines of any
/// width; the manager pads and truncates to the exact grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
    pub transition: Transition,
}

impl Frame {
    pub fn keep(lines: Vec<String>) -> Self {
        Self { lines, transition: Transition::Continue }
    }

    pub fn revert(lines: Vec<String>) -> Self {
        Self { lines, transition: Transition::Revert }
    }
}

/// A renderable unit producing a character grid from a context snapshot
///
/// Screens keep their own render state (scroll offsets), so `render` takes
/// `&mut self`. `dims` is (columns, rows) of the active driver.
pub trait Screen: Send {
    fn name(&self) -> &str;

    fn kind(&self) -> ScreenKind;

    fn render(&mut self, dims: (usize, usize), ctx: &DisplayContext) -> Frame;
}

pub type BoxedScreen = Box<dyn Screen>;

/// Title on the first row, body on the second; a single row display gets both joined
pub(crate) fn titled(dims: (usize, usize), title: &str, body: &str) -> Vec<String> {
    let (width, rows) = dims;
    if rows < 2 {
        return vec![center(&format!("{} {}", title, body), width)];
    }
    vec![center(title, width), center(body, width)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_layout() {
        assert_eq!(
            titled((16, 2), "Volume", "45%"),
            vec!["     Volume     ".to_string(), "      45%       ".to_string()]
        );
        assert_eq!(titled((10, 1), "Volume", "45%"), vec!["Volume 45%".to_string()]);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ScreenKind::Custom("goodbye".into()).to_string(), "custom:goodbye");
        assert_eq!(ScreenKind::Error.to_string(), "error");
    }
}
