/*
 *  display/mod.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - character display drivers, screens and the render tick
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;

// Display drivers
pub mod drivers;

// Text layout and scrolling
pub mod marquee;

// What screens render from, and the screens themselves
pub mod context;
pub mod screens;

// Display manager
pub mod manager;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, DisplayDriver};
pub use error::{DisplayError, DisplayFactoryError};
pub use factory::{BoxedDriver, DisplayDriverFactory};
pub use drivers::MockDriver;
pub use marquee::Marquee;
pub use context::{DisplayContext, Power};
pub use screens::{
    BoxedScreen, ChannelScreen, ErrorScreen, Frame, MessageScreen, RadioScreen, Screen, ScreenKind,
    Transition, VolumeScreen,
};
pub use manager::{ActiveScreen, DisplayCommand, DisplayManager, DisplayState};
