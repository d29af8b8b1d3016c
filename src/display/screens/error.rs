/*
 *  display/screens/error.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error screen
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

/// "Error:" over the message
///
/// A screen raised for a collaborator failure follows the context: once
/// `error_message` no longer carries its message the failure has cleared and
/// the screen asks to be reverted.
#[derive(Debug, Clone)]
pub struct ErrorScreen {
    message: String,
    follows_context: bool,
    marquee: Marquee,
}

impl ErrorScreen {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            follows_context: false,
            marquee: Marquee::new(SCROLL_EVERY_TICKS),
        }
    }

    /// Error screen that is dismissed when the failure recovers
    pub fn for_failure(message: &str) -> Self {
        Self {
            follows_context: true,
            ..Self::new(message)
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Screen for ErrorScreen {
    fn name(&self) -> &str {
        "error"
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Error
    }

    fn render(&mut self, dims: (usize, usize), ctx: &DisplayContext) -> Frame {
        let (width, rows) = dims;
        let lines = if rows < 2 {
            titled(dims, "Error:", &self.message)
        } else {
            vec![center("Error:", width), self.marquee.render(&self.message, width)]
        };

        if self.follows_context && ctx.error_message.as_deref() != Some(self.message.as_str()) {
            return Frame::revert(lines);
        }
        Frame::keep(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::screens::Transition;

    #[test]
    fn test_plain_error_continues() {
        let mut screen = ErrorScreen::new("Playback failed");
        let frame = screen.render((16, 2), &DisplayContext::default());
        assert_eq!(frame.lines[0].trim(), "Error:");
        assert_eq!(frame.lines[1], "Playback failed ");
        assert_eq!(frame.transition, Transition::Continue);
    }

    #[test]
    fn test_failure_screen_reverts_on_recovery() {
        let mut screen = ErrorScreen::for_failure("API unreachable");
        let mut ctx = DisplayContext {
            error_message: Some("API unreachable".into()),
            ..Default::default()
        };
        assert_eq!(screen.render((16, 2), &ctx).transition, Transition::Continue);

        ctx.error_message = None;
        assert_eq!(screen.render((16, 2), &ctx).transition, Transition::Revert);
    }

    #[test]
    fn test_failure_screen_reverts_when_superseded() {
        let mut screen = ErrorScreen::for_failure("API unreachable");
        let ctx = DisplayContext {
            error_message: Some("Roster unavailable".into()),
            ..Default::default()
        };
        assert_eq!(screen.render((16, 2), &ctx).transition, Transition::Revert);
    }
}
