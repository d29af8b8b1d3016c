/*
 *  buttons.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button sources - GPIO interrupts and the keyboard, both feeding the event queue
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

use crate::config::GpioConfig;
use crate::radio::{Button, RadioEvent};

use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::error::TrySendError;

#[derive(Debug, Error)]
pub enum ButtonError {
    #[cfg(feature = "gpio")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
    #[error("GPIO support not built in (enable the gpio feature)")]
    Unsupported,
}

/// Non-blocking handle into the controller's bounded event queue
///
/// Safe to call from interrupt callbacks: a full queue drops the press.
#[derive(Debug, Clone)]
pub struct ButtonSender {
    tx: mpsc::Sender<RadioEvent>,
}

impl ButtonSender {
    pub fn new(tx: mpsc::Sender<RadioEvent>) -> Self {
        Self { tx }
    }

    pub fn press(&self, button: Button) -> bool {
        match self.tx.try_send(RadioEvent::Pressed(button)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Button queue full, {} press dropped", button);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Controller gone, {} press dropped", button);
                false
            }
        }
    }
}

/// BCM pin of every button
pub fn pin_map(cfg: &GpioConfig) -> [(u8, Button); 5] {
    [
        (cfg.power_pin(), Button::Power),
        (cfg.volume_up_pin(), Button::VolumeUp),
        (cfg.volume_down_pin(), Button::VolumeDown),
        (cfg.channel_up_pin(), Button::ChannelUp),
        (cfg.channel_down_pin(), Button::ChannelDown),
    ]
}

/// Keyboard stand-in for the buttons
pub fn key_to_button(key: char) -> Option<Button> {
    match key.to_ascii_lowercase() {
        'p' => Some(Button::Power),
        '+' | '=' => Some(Button::VolumeUp),
        '-' => Some(Button::VolumeDown),
        'n' | ']' => Some(Button::ChannelUp),
        'b' | '[' => Some(Button::ChannelDown),
        _ => None,
    }
}

/// Buttons wired to GPIO inputs with pull-ups, pressed on the falling edge
///
/// Interrupts stay armed for as long as this value lives.
#[cfg(feature = "gpio")]
pub struct GpioButtons {
    _pins: Vec<rppal::gpio::InputPin>,
}

#[cfg(feature = "gpio")]
impl GpioButtons {
    pub fn start(cfg: &GpioConfig, sender: ButtonSender) -> Result<Self, ButtonError> {
        use rppal::gpio::{Gpio, Level, Trigger};

        let gpio = Gpio::new()?;
        let mut pins = Vec::with_capacity(5);
        for (pin, button) in pin_map(cfg) {
            let mut input = gpio.get(pin)?.into_input_pullup();
            let sender = sender.clone();
            input.set_async_interrupt(Trigger::FallingEdge, move |_level: Level| {
                sender.press(button);
            })?;
            info!("GPIO{} -> {}", pin, button);
            pins.push(input);
        }
        Ok(Self { _pins: pins })
    }
}

#[cfg(not(feature = "gpio"))]
pub struct GpioButtons;

#[cfg(not(feature = "gpio"))]
impl GpioButtons {
    pub fn start(_cfg: &GpioConfig, _sender: ButtonSender) -> Result<Self, ButtonError> {
        Err(ButtonError::Unsupported)
    }
}

/// Read button keys from stdin, one or more per line, until shutdown or EOF
pub async fn run_keyboard(sender: ButtonSender, mut shutdown: watch::Receiver<bool>) {
    info!("Keyboard buttons: p power, +/- volume, n/b channel (then Enter)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        for button in line.chars().filter_map(key_to_button) {
                            sender.press(button);
                        }
                    }
                    Ok(None) => {
                        debug!("stdin closed, keyboard buttons off");
                        break;
                    }
                    Err(e) => {
                        warn!("Reading stdin: {}", e);
                        break;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(key_to_button('p'), Some(Button::Power));
        assert_eq!(key_to_button('P'), Some(Button::Power));
        assert_eq!(key_to_button('='), Some(Button::VolumeUp));
        assert_eq!(key_to_button('-'), Some(Button::VolumeDown));
        assert_eq!(key_to_button(']'), Some(Button::ChannelUp));
        assert_eq!(key_to_button('b'), Some(Button::ChannelDown));
        assert_eq!(key_to_button('x'), None);
    }

    #[test]
    fn test_default_pins() {
        let pins = pin_map(&GpioConfig::default());
        assert_eq!(pins[0], (25, Button::Power));
        assert_eq!(pins[3], (14, Button::ChannelUp));
    }

    #[test]
    fn test_full_queue_drops_press() {
        let (tx, mut rx) = mpsc::channel(2);
        let sender = ButtonSender::new(tx);
        assert!(sender.press(Button::Power));
        assert!(sender.press(Button::VolumeUp));
        assert!(!sender.press(Button::VolumeDown));

        assert!(matches!(rx.try_recv(), Ok(RadioEvent::Pressed(Button::Power))));
        assert!(matches!(rx.try_recv(), Ok(RadioEvent::Pressed(Button::VolumeUp))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_queue_drops_press() {
        let (tx, rx) = mpsc::channel(2);
        drop(rx);
        assert!(!ButtonSender::new(tx).press(Button::Power));
    }
}
