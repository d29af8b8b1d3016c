/*
 *  lib.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Crate root - radio panel building blocks
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

pub mod api;
pub mod buttons;
pub mod config;
pub mod constants;
pub mod deutils;
pub mod display;
pub mod persist;
pub mod player;
pub mod poller;
pub mod radio;

pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}
